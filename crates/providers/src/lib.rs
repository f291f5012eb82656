//! Completion client implementations for mnemo.
//!
//! All clients implement the `mnemo_core::CompletionClient` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatClient;
