//! # mnemo core
//!
//! Domain types, traits, and error definitions for the mnemo assistant.
//! Every collaborator of the agent loop (completion endpoint, memory store,
//! tools) is defined here as a trait; implementations live in their own
//! crates so the loop can be exercised with test doubles.

pub mod completion;
pub mod error;
pub mod memory;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use completion::{CompletionClient, CompletionRequest, CompletionResponse, ToolChoice, ToolDefinition, Usage};
pub use error::{CompletionError, Error, StorageError, ToolError};
pub use memory::{MEMORY_EMPTY, MemoryStore};
pub use message::{Message, MessageToolCall, Role, Transcript};
pub use tool::{Tool, ToolInvocation, ToolRegistry, UNKNOWN_FUNCTION, validate_arguments};
