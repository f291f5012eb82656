//! Built-in tool implementations for mnemo.
//!
//! The tool set is closed: two memory tools backed by a [`MemoryStore`],
//! a fixed-topic knowledge lookup, and a web search. Network collaborators
//! sit behind [`KnowledgeSource`] and [`SearchBackend`] so the tools can be
//! tested without network access.

pub mod domain_info;
pub mod memory_read;
pub mod memory_write;
pub mod web_search;

use std::sync::Arc;
use std::time::Duration;

use mnemo_config::ToolsConfig;
use mnemo_core::memory::MemoryStore;
use mnemo_core::tool::ToolRegistry;
use tracing::warn;

pub use domain_info::{GetDomainInfoTool, KnowledgeSource, WikipediaSource};
pub use memory_read::ReadFromMemoryTool;
pub use memory_write::WriteToMemoryTool;
pub use web_search::{DuckDuckGoSearch, SearchBackend, SearchHit, SearchWebTool};

const USER_AGENT: &str = concat!("mnemo/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the network-backed collaborators.
pub(crate) fn http_client(timeout: Duration, user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Create the tool registry the assistant runs with.
///
/// Registration order is the order the model sees the tools in:
/// `write_to_memory`, `read_from_memory`, `get_domain_info`, `search_web`.
pub fn default_registry(
    memory: Arc<dyn MemoryStore>,
    knowledge: Arc<dyn KnowledgeSource>,
    search: Arc<dyn SearchBackend>,
    config: &ToolsConfig,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WriteToMemoryTool::new(memory.clone())));
    registry.register(Box::new(ReadFromMemoryTool::new(memory)));
    registry.register(Box::new(GetDomainInfoTool::new(
        knowledge,
        config.domain_topic.clone(),
        config.domain_description.clone(),
    )));
    registry.register(Box::new(SearchWebTool::new(search, config.search_max_results)));
    registry
}

/// Build the production network collaborators from configuration.
pub fn network_collaborators(
    config: &ToolsConfig,
) -> (Arc<dyn KnowledgeSource>, Arc<dyn SearchBackend>) {
    let timeout = Duration::from_secs(config.http_timeout_secs);
    (
        Arc::new(WikipediaSource::new(timeout)),
        Arc::new(DuckDuckGoSearch::new(timeout)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mnemo_core::error::ToolError;
    use mnemo_core::tool::{ToolInvocation, UNKNOWN_FUNCTION};
    use mnemo_memory::InMemoryStore;

    struct NoKnowledge;

    #[async_trait]
    impl KnowledgeSource for NoKnowledge {
        fn name(&self) -> &str {
            "none"
        }
        async fn summary(&self, _topic: &str) -> Result<Option<String>, ToolError> {
            Ok(None)
        }
    }

    struct NoSearch;

    #[async_trait]
    impl SearchBackend for NoSearch {
        fn name(&self) -> &str {
            "none"
        }
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, ToolError> {
            Ok(Vec::new())
        }
    }

    fn registry() -> ToolRegistry {
        default_registry(
            Arc::new(InMemoryStore::new()),
            Arc::new(NoKnowledge),
            Arc::new(NoSearch),
            &ToolsConfig::default(),
        )
    }

    #[test]
    fn default_registry_order() {
        let reg = registry();
        assert_eq!(
            reg.names(),
            vec!["write_to_memory", "read_from_memory", "get_domain_info", "search_web"]
        );
    }

    #[test]
    fn definitions_are_object_schemas() {
        for def in registry().definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert!(!def.description.is_empty());
        }
    }

    #[tokio::test]
    async fn write_then_read_through_registry() {
        let reg = registry();
        let saved = reg
            .dispatch(&ToolInvocation {
                id: "call_1".into(),
                name: "write_to_memory".into(),
                arguments: r#"{"content":"User name: Jonas"}"#.into(),
            })
            .await;
        assert_eq!(saved, "Saved: User name: Jonas");

        let log = reg
            .dispatch(&ToolInvocation {
                id: "call_2".into(),
                name: "read_from_memory".into(),
                arguments: "{}".into(),
            })
            .await;
        assert!(log.ends_with("] User name: Jonas"));
    }

    #[tokio::test]
    async fn unknown_tool_is_sentinel() {
        let out = registry()
            .dispatch(&ToolInvocation {
                id: "call_x".into(),
                name: "launch_rockets".into(),
                arguments: "{}".into(),
            })
            .await;
        assert_eq!(out, UNKNOWN_FUNCTION);
    }

    #[tokio::test]
    async fn missing_content_is_rejected_before_handler() {
        let memory = Arc::new(InMemoryStore::new());
        let reg = default_registry(
            memory.clone(),
            Arc::new(NoKnowledge),
            Arc::new(NoSearch),
            &ToolsConfig::default(),
        );
        let out = reg
            .dispatch(&ToolInvocation {
                id: "call_1".into(),
                name: "write_to_memory".into(),
                arguments: "{}".into(),
            })
            .await;
        assert!(out.starts_with("Invalid arguments for write_to_memory"));
        assert!(memory.is_empty().await);
    }
}
