//! Memory store implementations for mnemo.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileMemory;
pub use in_memory::InMemoryStore;

/// Timestamp format used at the start of every memory line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The text actually stored for `content`: line breaks become spaces so
/// that one append always adds exactly one line.
pub fn single_line(content: &str) -> String {
    content
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Render one memory line: `[YYYY-MM-DD HH:MM:SS] content`.
pub fn format_record(timestamp: &chrono::DateTime<chrono::Local>, content: &str) -> String {
    format!("[{}] {}", timestamp.format(TIMESTAMP_FORMAT), single_line(content))
}

/// Confirmation returned by `append`, naming the text as stored.
pub(crate) fn saved(content: &str) -> String {
    format!("Saved: {}", single_line(content))
}
