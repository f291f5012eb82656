//! Completion client trait: the abstraction over the language-model endpoint.
//!
//! The agent loop makes two shapes of call:
//! - a tool-enabled call (transcript + tool declarations, tool choice `auto`),
//!   answered either by plain text or by one or more tool invocations;
//! - a tool-free call (transcript only), always answered by plain text.
//!
//! The client never selects tools itself. Whatever tool calls come back are
//! untrusted model output and are validated before dispatch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::CompletionError;
use crate::message::Message;

/// How the model may use the declared tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides whether to call tools.
    #[default]
    Auto,
    /// No tool calls; used for the final-answer pass.
    None,
}

/// A single request to the completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model identifier (e.g., "openai/gpt-4.1-nano")
    pub model: String,

    /// The full transcript, in order
    pub messages: Vec<Message>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Tools the model may call (empty for the tool-free pass)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Tool-choice policy
    #[serde(default)]
    pub tool_choice: ToolChoice,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    1.0
}

impl CompletionRequest {
    /// A tool-enabled request with tool choice `auto`.
    pub fn with_tools(model: impl Into<String>, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            top_p: default_top_p(),
            tools,
            tool_choice: ToolChoice::Auto,
        }
    }

    /// A tool-free request used for the final answer.
    pub fn tool_free(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            top_p: default_top_p(),
            tools: Vec::new(),
            tool_choice: ToolChoice::None,
        }
    }

    /// Override the sampling parameters.
    pub fn sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    pub fn is_tool_free(&self) -> bool {
        self.tools.is_empty() || self.tool_choice == ToolChoice::None
    }
}

/// A tool declaration sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name (unique within a registry)
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated assistant message, possibly carrying tool calls
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

impl CompletionResponse {
    pub fn wants_tools(&self) -> bool {
        !self.message.tool_calls.is_empty()
    }
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The Completion Client trait.
///
/// The production implementation talks to an OpenAI-compatible endpoint;
/// tests script responses. Every call is awaited to completion before the
/// agent loop moves on.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// A human-readable name for this client (e.g., "github-models").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_enabled_request_defaults() {
        let req = CompletionRequest::with_tools(
            "gpt-4.1-nano",
            vec![Message::user("hi")],
            vec![ToolDefinition {
                name: "read_from_memory".into(),
                description: "Read everything saved in memory.".into(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }],
        );
        assert_eq!(req.tool_choice, ToolChoice::Auto);
        assert!(!req.is_tool_free());
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!((req.top_p - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn tool_free_request_has_no_tools() {
        let req = CompletionRequest::tool_free("m", vec![]).sampling(0.2, 0.9);
        assert!(req.is_tool_free());
        assert!(req.tools.is_empty());
        assert!((req.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn tool_choice_serializes_lowercase() {
        let json = serde_json::to_string(&ToolChoice::Auto).unwrap();
        assert_eq!(json, "\"auto\"");
    }
}
