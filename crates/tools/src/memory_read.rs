//! Memory read tool: return the whole memory log.

use std::sync::Arc;

use async_trait::async_trait;
use mnemo_core::error::ToolError;
use mnemo_core::memory::MemoryStore;
use mnemo_core::tool::Tool;

pub struct ReadFromMemoryTool {
    memory: Arc<dyn MemoryStore>,
}

impl ReadFromMemoryTool {
    pub fn new(memory: Arc<dyn MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for ReadFromMemoryTool {
    fn name(&self) -> &str {
        "read_from_memory"
    }

    fn description(&self) -> &str {
        "Read everything saved in memory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        self.memory
            .read_all()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}
