//! Interactive chat session.

use std::path::PathBuf;
use std::sync::Arc;

use mnemo_agent::{AgentLoop, AgentOptions, Session};
use mnemo_config::AppConfig;
use mnemo_core::completion::CompletionClient;
use mnemo_core::memory::MemoryStore;
use mnemo_memory::FileMemory;
use mnemo_providers::OpenAiCompatClient;
use tokio::io::BufReader;
use tracing::info;

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &config_path {
        Some(path) => AppConfig::load_with_overrides(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;

    // Fail early with setup instructions when no API key is set
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in a .env file):");
        eprintln!("    AIKEY=...            (endpoint token)");
        eprintln!("    MNEMO_API_KEY=...    (generic)");
        eprintln!("    OPENAI_API_KEY=...   (for OpenAI direct)");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let client: Arc<dyn CompletionClient> = Arc::new(OpenAiCompatClient::from_config(&config)?);
    let memory: Arc<dyn MemoryStore> = Arc::new(FileMemory::new(&config.memory.file));
    let (knowledge, search) = mnemo_tools::network_collaborators(&config.tools);
    let tools = Arc::new(mnemo_tools::default_registry(
        memory.clone(),
        knowledge,
        search,
        &config.tools,
    ));

    info!(
        endpoint = %config.endpoint,
        model = %config.model,
        memory_file = %config.memory.file.display(),
        tools = tools.len(),
        "Starting chat session"
    );

    let agent = AgentLoop::new(AgentOptions::from_config(&config), client, tools, memory);
    let mut session = Session::new(agent).with_banner(format!(
        "Say something or ask about {}.\nType 'exit' to quit.",
        config.tools.domain_topic
    ));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    session.run(stdin, &mut stdout).await?;
    Ok(())
}
