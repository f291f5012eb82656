//! Tool trait and registry: the closed set of local handlers the model can call.
//!
//! Tool calls come from the model and are treated as untrusted input: the
//! registry parses the JSON argument string, validates it against the tool's
//! declared schema, and only then invokes the handler. Every failure on the
//! way degrades to a sentinel string so one bad call never aborts a turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::completion::ToolDefinition;
use crate::error::ToolError;
use crate::message::MessageToolCall;

/// Result content for a tool name that is not registered.
pub const UNKNOWN_FUNCTION: &str = "Unknown function.";

/// A request to execute a tool, as produced by the completion client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Call ID (matches the model's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Raw JSON-encoded argument string
    pub arguments: String,
}

impl From<&MessageToolCall> for ToolInvocation {
    fn from(tc: &MessageToolCall) -> Self {
        Self {
            id: tc.id.clone(),
            name: tc.name.clone(),
            arguments: tc.arguments.clone(),
        }
    }
}

/// The core Tool trait.
///
/// Each tool declares its parameter schema once and handles already
/// validated arguments, returning the text that goes back to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "write_to_memory").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with validated arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools, kept in registration order.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// All tool definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Parse, validate, and execute an invocation, surfacing every failure.
    pub async fn execute(&self, call: &ToolInvocation) -> std::result::Result<String, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        let arguments = parse_arguments(&call.arguments)?;
        validate_arguments(&tool.parameters_schema(), &arguments)?;

        debug!(tool = %call.name, call_id = %call.id, "Executing tool");
        tool.execute(arguments).await
    }

    /// Execute an invocation, converting every failure to result content.
    ///
    /// Unknown names yield [`UNKNOWN_FUNCTION`]; schema violations and
    /// handler failures yield a short diagnostic the model can react to.
    pub async fn dispatch(&self, call: &ToolInvocation) -> String {
        match self.execute(call).await {
            Ok(output) => output,
            Err(ToolError::NotFound(name)) => {
                warn!(tool = %name, call_id = %call.id, "Model requested an unknown tool");
                UNKNOWN_FUNCTION.to_string()
            }
            Err(ToolError::InvalidArguments(reason)) => {
                warn!(tool = %call.name, call_id = %call.id, %reason, "Rejected tool arguments");
                format!("Invalid arguments for {}: {reason}", call.name)
            }
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool execution failed");
                format!("Error: {e}")
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

/// Parse the model's argument string. An empty string means no arguments.
fn parse_arguments(raw: &str) -> std::result::Result<serde_json::Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
}

/// Check `arguments` against a JSON-schema-like parameter description.
///
/// Supports the subset the tools declare: an object with typed
/// `properties`, a `required` list, and optional `additionalProperties: false`.
pub fn validate_arguments(
    schema: &serde_json::Value,
    arguments: &serde_json::Value,
) -> std::result::Result<(), ToolError> {
    let args = arguments
        .as_object()
        .ok_or_else(|| ToolError::InvalidArguments("arguments must be a JSON object".into()))?;

    let properties = schema.get("properties").and_then(|p| p.as_object());

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for key in required.iter().filter_map(|k| k.as_str()) {
            match args.get(key) {
                None | Some(serde_json::Value::Null) => {
                    return Err(ToolError::InvalidArguments(format!(
                        "missing required argument '{key}'"
                    )));
                }
                Some(_) => {}
            }
        }
    }

    let closed = schema.get("additionalProperties") == Some(&serde_json::Value::Bool(false));

    for (key, value) in args {
        let Some(spec) = properties.and_then(|p| p.get(key)) else {
            if closed {
                return Err(ToolError::InvalidArguments(format!(
                    "unexpected argument '{key}'"
                )));
            }
            continue;
        };

        let Some(expected) = spec.get("type").and_then(|t| t.as_str()) else {
            continue;
        };

        let matches = match expected {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        };

        if !matches {
            return Err(ToolError::InvalidArguments(format!(
                "argument '{key}' must be of type {expected}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<String, ToolError> {
            Ok(arguments["text"].as_str().unwrap_or("").to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str { "fail" }
        fn description(&self) -> &str { "Always fails" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _arguments: serde_json::Value) -> std::result::Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "fail".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    fn call(name: &str, arguments: &str) -> ToolInvocation {
        ToolInvocation {
            id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert!(registry.get("Echo").is_none());
    }

    #[test]
    fn registry_replaces_same_name_and_keeps_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(FailingTool));
        registry.register(Box::new(EchoTool));
        assert_eq!(registry.names(), vec!["echo", "fail"]);
        assert_eq!(registry.definitions()[0].name, "echo");
    }

    #[tokio::test]
    async fn dispatch_executes_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let out = registry.dispatch(&call("echo", r#"{"text":"hello world"}"#)).await;
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_returns_sentinel() {
        let registry = ToolRegistry::new();
        let out = registry.dispatch(&call("nonexistent", "{}")).await;
        assert_eq!(out, UNKNOWN_FUNCTION);
    }

    #[tokio::test]
    async fn execute_unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let err = registry.execute(&call("nonexistent", "{}")).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn dispatch_rejects_malformed_json() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let out = registry.dispatch(&call("echo", "{not json")).await;
        assert!(out.starts_with("Invalid arguments for echo"), "{out}");
    }

    #[tokio::test]
    async fn dispatch_rejects_missing_required() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let out = registry.dispatch(&call("echo", "{}")).await;
        assert!(out.contains("missing required argument 'text'"), "{out}");
    }

    #[tokio::test]
    async fn dispatch_converts_handler_failure() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FailingTool));
        let out = registry.dispatch(&call("fail", "")).await;
        assert!(out.starts_with("Error:"));
        assert!(out.contains("disk on fire"));
    }

    #[test]
    fn validate_rejects_non_object() {
        let schema = serde_json::json!({"type": "object", "properties": {}});
        let err = validate_arguments(&schema, &serde_json::json!(["a"])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn validate_checks_property_types() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        });
        assert!(validate_arguments(&schema, &serde_json::json!({"query": "rust"})).is_ok());
        assert!(validate_arguments(&schema, &serde_json::json!({"query": 42})).is_err());
        assert!(validate_arguments(&schema, &serde_json::json!({"query": null})).is_err());
    }

    #[test]
    fn validate_honours_closed_schemas() {
        let open = serde_json::json!({"type": "object", "properties": {}});
        let closed = serde_json::json!({"type": "object", "properties": {}, "additionalProperties": false});
        let args = serde_json::json!({"extra": true});
        assert!(validate_arguments(&open, &args).is_ok());
        assert!(validate_arguments(&closed, &args).is_err());
    }
}
