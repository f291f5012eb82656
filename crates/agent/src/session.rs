//! Interactive console session: `You:` / `AI:` prompts over any line reader.
//!
//! Reads one line at a time, hands it to the [`AgentLoop`], and prints the
//! answer. A failed turn prints `Error: <diagnostic>` and the session keeps
//! going; only an exit keyword or end of input ends it.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::loop_runner::AgentLoop;

const GOODBYE: &str = "Goodbye!";

/// Whether `input` ends the session (`exit`, `quit`, `bye`, any case).
pub fn is_exit_command(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "exit" | "quit" | "bye"
    )
}

/// A console session driving one agent loop.
pub struct Session {
    agent: AgentLoop,
    banner: Option<String>,
}

impl Session {
    pub fn new(agent: AgentLoop) -> Self {
        Self { agent, banner: None }
    }

    /// Text printed once before the first prompt.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    pub fn agent(&self) -> &AgentLoop {
        &self.agent
    }

    /// Run until an exit keyword or end of input.
    ///
    /// Blank lines are skipped without a turn. Only I/O errors on the
    /// reader or writer end the session early.
    pub async fn run<R, W>(&mut self, reader: R, writer: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if let Some(banner) = &self.banner {
            writer.write_all(format!("{banner}\n\n").as_bytes()).await?;
        }

        let mut lines = reader.lines();
        loop {
            writer.write_all(b"You: ").await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                info!("Input closed");
                writer.write_all(format!("\nAI: {GOODBYE}\n").as_bytes()).await?;
                break;
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if is_exit_command(input) {
                writer.write_all(format!("AI: {GOODBYE}\n").as_bytes()).await?;
                break;
            }

            match self.agent.respond(input).await {
                Ok(answer) => {
                    writer.write_all(format!("AI: {answer}\n").as_bytes()).await?;
                }
                Err(e) => {
                    error!(error = %e, "Turn failed");
                    writer.write_all(format!("Error: {e}\n").as_bytes()).await?;
                }
            }
        }

        self.agent.finish();
        writer.flush().await
    }
}
