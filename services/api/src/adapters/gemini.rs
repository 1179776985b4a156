//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for the chat backend.
//! It implements the `ChatService` port from the `core` crate using the Gemini
//! `generateContent` REST endpoint.

use async_trait::async_trait;
use reqwest::Client;
use sentiment_chain_core::ports::{ChatService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const BLOCK_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl Candidate {
    fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatService` using a Gemini model.
#[derive(Clone)]
pub struct GeminiChatAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiChatAdapter {
    /// Creates a new `GeminiChatAdapter` for `model`.
    pub fn new(client: Client, base_url: &str, model: &str, api_key: String) -> Self {
        info!(model, "Gemini chat configured");
        Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key,
        }
    }
}

//=========================================================================================
// `ChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatService for GeminiChatAdapter {
    async fn generate(&self, prompt: &str) -> PortResult<Option<String>> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: BLOCK_THRESHOLD,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PortError::Upstream(format!(
                "Gemini returned {}: {}",
                status, detail
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        // Only the first candidate is used; it carries no text when it was filtered.
        match payload.candidates.first() {
            Some(candidate) => {
                let text = candidate.text();
                if text.is_none() {
                    warn!(
                        finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
                        "Gemini candidate carried no text"
                    );
                }
                Ok(text)
            }
            None => {
                warn!(feedback = ?payload.prompt_feedback, "Gemini returned no candidates");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> GeminiChatAdapter {
        GeminiChatAdapter::new(
            Client::new(),
            &server.uri(),
            "gemini-2.0-flash",
            "g-key".to_string(),
        )
    }

    #[tokio::test]
    async fn generate_sends_prompt_and_safety_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Why?"}]}],
                "safetySettings": [
                    {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Because "}, {"text": "reasons."}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = adapter(&server).generate("Why?").await.unwrap();
        assert_eq!(reply.as_deref(), Some("Because reasons."));
    }

    #[tokio::test]
    async fn blocked_prompt_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        assert_eq!(adapter(&server).generate("bad").await.unwrap(), None);
    }

    #[tokio::test]
    async fn filtered_candidate_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        assert_eq!(adapter(&server).generate("bad").await.unwrap(), None);
    }

    #[tokio::test]
    async fn http_failure_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = adapter(&server).generate("hi").await.unwrap_err();
        assert!(matches!(err, PortError::Upstream(ref msg) if msg.contains("API key not valid")));
    }
}
