//! Message and Transcript domain types.
//!
//! These are the value objects exchanged with the completion endpoint:
//! user input becomes a `Message`, the agent loop appends it to the
//! `Transcript`, and the whole transcript is the model's context window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata key marking the turns produced by the memory priming phase.
pub const PRIMING_METADATA_KEY: &str = "priming";

/// The role of a message sender in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
    /// Tool execution result
    Tool,
}

/// A single turn in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Optional metadata (priming marker, model info, etc.)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    fn with_role(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content.into())
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into())
    }

    /// Create an assistant message carrying tool calls.
    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<MessageToolCall>) -> Self {
        let mut msg = Self::with_role(Role::Assistant, content.into());
        msg.tool_calls = tool_calls;
        msg
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content.into());
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Tag this message as produced by memory priming.
    pub fn mark_priming(mut self) -> Self {
        self.metadata
            .insert(PRIMING_METADATA_KEY.into(), serde_json::Value::Bool(true));
        self
    }

    /// Whether this message was injected by memory priming rather than the model.
    pub fn is_priming(&self) -> bool {
        self.metadata
            .get(PRIMING_METADATA_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string, exactly as the model produced them
    pub arguments: String,
}

/// The ordered, append-only conversation history of one session.
///
/// Order is significant: it is the model's context window. The transcript
/// is owned by a single agent loop and is never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcript that starts with a system prompt.
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Roll back to an earlier length, discarding everything appended since.
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    /// Number of user turns in the transcript.
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    /// Whether `id` is already used by a tool call in this transcript.
    pub fn has_tool_call_id(&self, id: &str) -> bool {
        self.messages
            .iter()
            .flat_map(|m| m.tool_calls.iter())
            .any(|tc| tc.id == id)
    }

    /// Drop the oldest whole turns so at most `max_turns` user turns remain.
    ///
    /// A turn starts at a user message and runs up to the next one, so tool
    /// call / tool result pairs are never split. Messages before the first
    /// user message (the system prompt) are always kept. Returns the number
    /// of messages removed.
    pub fn retain_last_turns(&mut self, max_turns: usize) -> usize {
        let user_positions: Vec<usize> = self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == Role::User)
            .map(|(i, _)| i)
            .collect();

        if user_positions.len() <= max_turns {
            return 0;
        }

        let first_user = user_positions[0];
        let keep_from = if max_turns == 0 {
            self.messages.len()
        } else {
            user_positions[user_positions.len() - max_turns]
        };

        self.messages.drain(first_user..keep_from);
        keep_from - first_user
    }
}
