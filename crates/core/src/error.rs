//! Error types for the mnemo domain.
//!
//! Each collaborator of the agent loop has its own error enum. Only the
//! session boundary turns these into user-visible diagnostics; tool-level
//! failures are converted to result strings before they get that far.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for a single agent turn.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures talking to the language-model completion endpoint.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by endpoint, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Completion client not configured: {0}")]
    NotConfigured(String),
}

/// Failures of the memory store other than "nothing stored yet".
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// Failures dispatching a model-requested tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}
