//! # mnemo agent
//!
//! The memory-primed turn loop. Every user turn reads the memory store
//! into the transcript before the model is queried, so facts persisted in
//! earlier sessions are always in context.
//!
//! ```text
//! AwaitingInput → MemoryPriming → ModelQuery → [ToolDispatch] → FinalAnswer → AwaitingInput
//!       └──────── exit / quit / bye ────────→ Exit
//! ```

pub mod loop_runner;
pub mod session;

pub use loop_runner::{AgentLoop, AgentOptions, AgentState, DEFAULT_SYSTEM_PROMPT};
pub use session::{Session, is_exit_command};
