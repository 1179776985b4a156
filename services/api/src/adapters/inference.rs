//! services/api/src/adapters/inference.rs
//!
//! This module contains the adapter for hosted text-classification models.
//! It implements the `TextClassifier` port from the `core` crate against a
//! Hugging Face style inference endpoint (`POST {base}/models/{model}`).

use async_trait::async_trait;
use reqwest::Client;
use sentiment_chain_core::domain::{ClassScores, LabelScore};
use sentiment_chain_core::ports::{PortError, PortResult, TextClassifier};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Inputs are truncated to this many tokens by the inference backend.
pub const MAX_TOKENS: usize = 128;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    parameters: ClassifyParameters,
    options: ClassifyOptions,
}

#[derive(Serialize)]
struct ClassifyParameters {
    function_to_apply: &'static str,
    top_k: Option<usize>,
    truncation: bool,
    max_length: usize,
}

#[derive(Serialize)]
struct ClassifyOptions {
    wait_for_model: bool,
}

/// The endpoint answers either `[[{label, score}]]` or `[{label, score}]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Batched(Vec<Vec<LabelScore>>),
    Single(Vec<LabelScore>),
    Error { error: String },
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextClassifier` over a hosted inference API.
#[derive(Clone)]
pub struct HostedClassifierAdapter {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    model: String,
}

impl HostedClassifierAdapter {
    /// Creates a new `HostedClassifierAdapter` for `model`.
    pub fn new(client: Client, base_url: &str, model: &str, api_token: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/models/{}", base_url.trim_end_matches('/'), model),
            api_token,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs one classification to confirm the model answers. Called once at startup.
    pub async fn probe(&self) -> PortResult<()> {
        let scores = self.classify("Startup check.").await?;
        if scores.top().is_none() {
            return Err(PortError::Unavailable(format!(
                "Model '{}' returned an empty distribution",
                self.model
            )));
        }
        info!(model = %self.model, classes = scores.0.len(), "Classifier is reachable");
        Ok(())
    }
}

//=========================================================================================
// `TextClassifier` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextClassifier for HostedClassifierAdapter {
    async fn classify(&self, text: &str) -> PortResult<ClassScores> {
        let body = ClassifyRequest {
            inputs: text,
            parameters: ClassifyParameters {
                function_to_apply: "softmax",
                top_k: None,
                truncation: true,
                max_length: MAX_TOKENS,
            },
            options: ClassifyOptions {
                wait_for_model: true,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unavailable(format!("{}: {}", self.model, e)))?;
        let status = response.status();
        let payload: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(format!("{} ({}): {}", self.model, status, e)))?;

        let scores = match payload {
            ClassifyResponse::Error { error } => {
                return Err(PortError::Upstream(format!("{} ({}): {}", self.model, status, error)))
            }
            _ if !status.is_success() => {
                return Err(PortError::Upstream(format!("{} returned {}", self.model, status)))
            }
            ClassifyResponse::Batched(mut batches) => {
                if batches.is_empty() {
                    Vec::new()
                } else {
                    batches.swap_remove(0)
                }
            }
            ClassifyResponse::Single(scores) => scores,
        };

        debug!(model = %self.model, classes = scores.len(), "Classified sentence");
        Ok(ClassScores(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn classify_parses_batched_distribution() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/org/sentiment"))
            .and(header("authorization", "Bearer hf-token"))
            .and(body_partial_json(json!({
                "inputs": "I love it",
                "parameters": {"function_to_apply": "softmax", "truncation": true, "max_length": 128}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
                {"label": "positive", "score": 0.91},
                {"label": "neutral", "score": 0.07},
                {"label": "negative", "score": 0.02}
            ]])))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = HostedClassifierAdapter::new(
            Client::new(),
            &format!("{}/", server.uri()),
            "org/sentiment",
            Some("hf-token".to_string()),
        );
        let scores = adapter.classify("I love it").await.unwrap();
        assert_eq!(scores.0.len(), 3);
        assert_eq!(scores.top().unwrap().label, "positive");
    }

    #[tokio::test]
    async fn classify_accepts_flat_distribution() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/tox"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"label": "toxic", "score": 0.8},
                {"label": "non-toxic", "score": 0.2}
            ])))
            .mount(&server)
            .await;

        let adapter = HostedClassifierAdapter::new(Client::new(), &server.uri(), "tox", None);
        let scores = adapter.classify("whatever").await.unwrap();
        assert_eq!(scores.top().unwrap().label, "toxic");
    }

    #[tokio::test]
    async fn error_payload_becomes_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"error": "Model is loading"})),
            )
            .mount(&server)
            .await;

        let adapter = HostedClassifierAdapter::new(Client::new(), &server.uri(), "m", None);
        let err = adapter.classify("x").await.unwrap_err();
        assert!(matches!(err, PortError::Upstream(ref msg) if msg.contains("Model is loading")));
        assert!(adapter.probe().await.is_err());
    }

    #[tokio::test]
    async fn probe_succeeds_against_live_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([[{"label": "neutral", "score": 1.0}]])),
            )
            .mount(&server)
            .await;

        let adapter = HostedClassifierAdapter::new(Client::new(), &server.uri(), "m", None);
        assert!(adapter.probe().await.is_ok());
        assert_eq!(adapter.model(), "m");
    }
}
