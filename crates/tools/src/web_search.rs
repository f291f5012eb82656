//! Web search tool: top results as "title: link" bullets.
//!
//! The production backend scrapes the DuckDuckGo HTML endpoint, which
//! needs no API key. Results are capped at a small fixed count.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mnemo_config::MAX_SEARCH_RESULTS;
use mnemo_core::error::ToolError;
use mnemo_core::tool::Tool;
use scraper::{Html, Selector};
use tracing::{info, warn};

/// Result content when a search yields nothing.
pub const NO_RESULTS: &str = "No results found.";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

/// A web search collaborator.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// At most `limit` results for `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ToolError>;
}

/// DuckDuckGo HTML search.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub const DEFAULT_BASE_URL: &'static str = "https://html.duckduckgo.com";

    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: crate::http_client(timeout, BROWSER_USER_AGENT),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ToolError> {
        let failed = |reason: String| ToolError::ExecutionFailed {
            tool_name: "search_web".into(),
            reason,
        };

        let url = format!("{}/html/?q={}", self.base_url, urlencoding::encode(query));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let html = response.text().await.map_err(|e| failed(e.to_string()))?;
        parse_duckduckgo_results(&html, limit)
    }
}

fn selector(css: &str) -> Result<Selector, ToolError> {
    Selector::parse(css).map_err(|_| ToolError::ExecutionFailed {
        tool_name: "search_web".into(),
        reason: format!("invalid selector '{css}'"),
    })
}

/// Extract organic results from a DuckDuckGo HTML page.
fn parse_duckduckgo_results(html: &str, limit: usize) -> Result<Vec<SearchHit>, ToolError> {
    let document = Html::parse_document(html);
    let result_selector = selector(".result")?;
    let title_selector = selector(".result__a")?;

    let mut hits = Vec::new();
    for result_el in document.select(&result_selector) {
        if hits.len() >= limit {
            break;
        }
        // sponsored entries
        if result_el.value().classes().any(|c| c == "result--ad") {
            continue;
        }
        let Some(anchor) = result_el.select(&title_selector).next() else {
            continue;
        };

        let title = anchor
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let link = anchor.value().attr("href").map(unwrap_redirect).unwrap_or_default();

        if !title.is_empty() && !link.is_empty() {
            hits.push(SearchHit { title, link });
        }
    }

    Ok(hits)
}

/// DuckDuckGo wraps target URLs as `//duckduckgo.com/l/?uddg=<encoded>&...`.
fn unwrap_redirect(href: &str) -> String {
    href.split("uddg=")
        .nth(1)
        .map(|rest| rest.split('&').next().unwrap_or(rest))
        .and_then(|encoded| urlencoding::decode(encoded).ok())
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|| href.to_string())
}

/// Render hits as the tool's result text.
fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    let lines: Vec<String> = hits
        .iter()
        .map(|h| format!("- {}: {}", h.title, h.link))
        .collect();
    format!("Top web results:\n{}", lines.join("\n"))
}

/// `search_web`: query the backend and list the top results.
pub struct SearchWebTool {
    backend: Arc<dyn SearchBackend>,
    max_results: usize,
}

impl SearchWebTool {
    pub fn new(backend: Arc<dyn SearchBackend>, max_results: usize) -> Self {
        Self {
            backend,
            max_results: max_results.clamp(1, MAX_SEARCH_RESULTS),
        }
    }
}

#[async_trait]
impl Tool for SearchWebTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web when memory or known information is not sufficient."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        info!(backend = self.backend.name(), query, "Web search");
        match self.backend.search(query, self.max_results).await {
            Ok(mut hits) => {
                hits.truncate(self.max_results);
                Ok(format_hits(&hits))
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Web search failed");
                Ok(NO_RESULTS.to_string())
            }
        }
    }
}
