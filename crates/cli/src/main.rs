//! mnemo CLI: the main entry point.
//!
//! Starts an interactive chat. Facts the assistant learns are kept in an
//! append-only memory file and primed into every turn.

use std::path::PathBuf;

use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(
    name = "mnemo",
    about = "mnemo: a console assistant that remembers what you tell it",
    version,
    author
)]
struct Cli {
    /// Config file (defaults to ~/.mnemo/config.toml)
    #[arg(short, long, env = "MNEMO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the chat on stdout
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    commands::chat::run(cli.config).await
}
