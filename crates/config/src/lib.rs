//! Configuration loading and validation for mnemo.
//!
//! Loads `~/.mnemo/config.toml` (or an explicit path), then applies a local
//! `.env` file and environment variable overrides. Everything is validated
//! once at startup and handed to the agent as plain values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Timeout for a single completion request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_endpoint() -> String {
    "https://models.github.ai/inference".into()
}
fn default_model() -> String {
    "openai/gpt-4.1-nano".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    1.0
}
fn default_request_timeout() -> u64 {
    120
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("memory", &self.memory)
            .field("agent", &self.agent)
            .field("tools", &self.tools)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path of the append-only memory log
    #[serde(default = "default_memory_file")]
    pub file: PathBuf,
}

fn default_memory_file() -> PathBuf {
    PathBuf::from("memory.txt")
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            file: default_memory_file(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Keep only the last N user turns in the transcript (unset = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,

    /// Replace the built-in system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Topic looked up by `get_domain_info`
    #[serde(default = "default_domain_topic")]
    pub domain_topic: String,

    /// Description of `get_domain_info` sent to the model
    #[serde(default = "default_domain_description")]
    pub domain_description: String,

    /// Maximum web search results (at most 3)
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,

    /// Timeout for knowledge and search lookups
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_domain_topic() -> String {
    "Kuršėnai".into()
}
fn default_domain_description() -> String {
    "Get a brief summary about Kuršėnai, Lithuania.".into()
}
fn default_search_max_results() -> usize {
    3
}
fn default_http_timeout() -> u64 {
    15
}

/// Upper bound on web search results.
pub const MAX_SEARCH_RESULTS: usize = 3;

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            domain_topic: default_domain_topic(),
            domain_description: default_domain_description(),
            search_max_results: default_search_max_results(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.mnemo/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply `.env` and environment overrides.
    ///
    /// API key precedence: config file, `MNEMO_API_KEY`, `AIKEY`, `OPENAI_API_KEY`.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        // A missing .env is the normal case
        if let Ok(env_path) = dotenv::dotenv() {
            tracing::debug!(path = %env_path.display(), "Loaded .env file");
        }

        let mut config = Self::load_from(path)?;

        if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            config.api_key = api_key_from(|var| std::env::var(var).ok());
        }

        if let Ok(endpoint) = std::env::var("MNEMO_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("MNEMO_MODEL") {
            config.model = model;
        }

        if let Ok(file) = std::env::var("MNEMO_MEMORY_FILE") {
            config.memory.file = PathBuf::from(file);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".mnemo")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ConfigError::ValidationError(
                "top_p must be between 0.0 and 1.0".into(),
            ));
        }

        if self.request_timeout_secs == 0 || self.tools.http_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than zero".into(),
            ));
        }

        if self.agent.history_window == Some(0) {
            return Err(ConfigError::ValidationError(
                "agent.history_window must be at least 1 when set".into(),
            ));
        }

        if !(1..=MAX_SEARCH_RESULTS).contains(&self.tools.search_max_results) {
            return Err(ConfigError::ValidationError(format!(
                "tools.search_max_results must be between 1 and {MAX_SEARCH_RESULTS}"
            )));
        }

        if self.tools.domain_topic.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tools.domain_topic must not be empty".into(),
            ));
        }

        if self.endpoint.trim().is_empty() || self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "endpoint and model must be set".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            request_timeout_secs: default_request_timeout(),
            memory: MemoryConfig::default(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Environment variables consulted for the API key, highest precedence first.
const API_KEY_VARS: [&str; 3] = ["MNEMO_API_KEY", "AIKEY", "OPENAI_API_KEY"];

/// First non-blank API key among [`API_KEY_VARS`].
fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .find_map(|var| lookup(*var).filter(|k| !k.trim().is_empty()))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
