//! services/api/src/adapters/page.rs
//!
//! Fetches a web page and reduces it to its visible text. Implements the
//! `PageFetcher` port.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Node};
use sentiment_chain_core::ports::{PageFetcher, PortError, PortResult};
use std::time::Duration;
use tracing::info;

/// Outbound page fetches give up after this long.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// An adapter that implements `PageFetcher` with a plain HTTP GET.
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> PortResult<String> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| PortError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PortError::InvalidInput(format!(
                "Unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let text = visible_text(&body);
        info!(url, chars = text.chars().count(), "Fetched page text");
        Ok(text)
    }
}

/// Joins every trimmed, non-empty text node outside hidden elements with single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
                });
                let trimmed = text.trim();
                (!hidden && !trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
