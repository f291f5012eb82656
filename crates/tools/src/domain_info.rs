//! Knowledge lookup tool: a short encyclopedia summary of one fixed topic.
//!
//! The topic is fixed at construction; the model calls the tool without
//! arguments. Any lookup failure, including a page without an extract,
//! degrades to a "could not find" sentence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mnemo_core::error::ToolError;
use mnemo_core::tool::Tool;
use tracing::{debug, warn};

/// Source of short topic summaries.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    fn name(&self) -> &str;

    /// The introductory summary for `topic`, or `None` if there is none.
    async fn summary(&self, topic: &str) -> Result<Option<String>, ToolError>;
}

/// Summaries from the Wikipedia MediaWiki API (intro extracts, plain text).
pub struct WikipediaSource {
    client: reqwest::Client,
    api_url: String,
}

impl WikipediaSource {
    pub const DEFAULT_API_URL: &'static str = "https://en.wikipedia.org/w/api.php";

    pub fn new(timeout: Duration) -> Self {
        Self::with_api_url(Self::DEFAULT_API_URL, timeout)
    }

    pub fn with_api_url(api_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: crate::http_client(timeout, crate::USER_AGENT),
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn summary(&self, topic: &str) -> Result<Option<String>, ToolError> {
        let failed = |reason: String| ToolError::ExecutionFailed {
            tool_name: "get_domain_info".into(),
            reason,
        };

        debug!(topic, "Querying Wikipedia");
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", topic),
            ])
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| failed(e.to_string()))?;

        Ok(first_extract(&body))
    }
}

/// Pull the first non-empty `extract` out of a `query.pages` response.
fn first_extract(body: &serde_json::Value) -> Option<String> {
    body["query"]["pages"]
        .as_object()?
        .values()
        .filter_map(|page| page["extract"].as_str())
        .map(str::trim)
        .find(|extract| !extract.is_empty())
        .map(str::to_string)
}

/// `get_domain_info`: summary of the configured topic.
pub struct GetDomainInfoTool {
    source: Arc<dyn KnowledgeSource>,
    topic: String,
    description: String,
}

impl GetDomainInfoTool {
    pub fn new(
        source: Arc<dyn KnowledgeSource>,
        topic: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source,
            topic: topic.into(),
            description: description.into(),
        }
    }

    fn not_found(&self) -> String {
        format!("Could not find information about {}.", self.topic)
    }
}

#[async_trait]
impl Tool for GetDomainInfoTool {
    fn name(&self) -> &str {
        "get_domain_info"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        match self.source.summary(&self.topic).await {
            Ok(Some(summary)) => Ok(summary),
            Ok(None) => Ok(self.not_found()),
            Err(e) => {
                warn!(source = self.source.name(), topic = %self.topic, error = %e, "Knowledge lookup failed");
                Ok(self.not_found())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Result<Option<String>, ()>);

    #[async_trait]
    impl KnowledgeSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn summary(&self, _topic: &str) -> Result<Option<String>, ToolError> {
            self.0.clone().map_err(|_| ToolError::ExecutionFailed {
                tool_name: "get_domain_info".into(),
                reason: "offline".into(),
            })
        }
    }

    fn tool(result: Result<Option<String>, ()>) -> GetDomainInfoTool {
        GetDomainInfoTool::new(
            Arc::new(FixedSource(result)),
            "Kuršėnai",
            "Get a brief summary about Kuršėnai, Lithuania.",
        )
    }

    #[tokio::test]
    async fn returns_summary() {
        let out = tool(Ok(Some("Kuršėnai is a city in Lithuania.".into())))
            .execute(serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(out, "Kuršėnai is a city in Lithuania.");
    }

    #[tokio::test]
    async fn missing_summary_falls_back() {
        let out = tool(Ok(None)).execute(serde_json::json!({})).await.unwrap();
        assert_eq!(out, "Could not find information about Kuršėnai.");
    }

    #[tokio::test]
    async fn lookup_failure_falls_back() {
        let out = tool(Err(())).execute(serde_json::json!({})).await.unwrap();
        assert_eq!(out, "Could not find information about Kuršėnai.");
    }

    #[test]
    fn extract_from_pages_map() {
        let body = serde_json::json!({
            "batchcomplete": "",
            "query": {
                "pages": {
                    "123": {"pageid": 123, "title": "Kuršėnai", "extract": "Kuršėnai is a city.\n"}
                }
            }
        });
        assert_eq!(first_extract(&body).as_deref(), Some("Kuršėnai is a city."));
    }

    #[test]
    fn missing_page_has_no_extract() {
        let body = serde_json::json!({
            "query": {"pages": {"-1": {"ns": 0, "title": "Nowhere", "missing": ""}}}
        });
        assert_eq!(first_extract(&body), None);
        assert_eq!(first_extract(&serde_json::json!({})), None);
    }
}
