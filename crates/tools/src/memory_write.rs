//! Memory write tool: append one fact to the memory store.

use std::sync::Arc;

use async_trait::async_trait;
use mnemo_core::error::ToolError;
use mnemo_core::memory::MemoryStore;
use mnemo_core::tool::Tool;

/// `write_to_memory`: stores the fact as a single line. Line breaks in the
/// content become spaces, and the `Saved: ...` confirmation shows the text
/// as stored.
pub struct WriteToMemoryTool {
    memory: Arc<dyn MemoryStore>,
}

impl WriteToMemoryTool {
    pub fn new(memory: Arc<dyn MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for WriteToMemoryTool {
    fn name(&self) -> &str {
        "write_to_memory"
    }

    fn description(&self) -> &str {
        "Store important user info to memory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "Text to save."
                }
            },
            "required": ["content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        self.memory
            .append(content)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}
