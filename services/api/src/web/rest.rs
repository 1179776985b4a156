//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, HttpError};
use crate::web::csv_input::read_text_column;
use crate::web::session::SessionUser;
use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::{IntoResponse, Json, Response},
    Extension,
};
use chrono::Utc;
use sentiment_chain_core::domain::{AnalysisRequest, AnalysisResult, ChatTurn, SentenceResult, Sentiment};
use sentiment_chain_core::ports::PortError;
use sentiment_chain_core::prompt::{build_chat_prompt, FALLBACK_REPLY};
use sentiment_chain_core::Analyzer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

/// Only this many characters of a fetched page are analyzed.
pub const URL_SNIPPET_CHARS: usize = 512;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_handler,
        chat_handler,
        health_handler,
    ),
    components(
        schemas(
            AnalyzeRequest, CsvAnalysisResponse, AnalysisResult, SentenceResult, Sentiment,
            ChatRequest, ChatResponse, HealthResponse, ErrorBody
        )
    ),
    tags(
        (name = "SentimentChain API", description = "Sentiment and toxicity analysis with a follow-up chat.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// JSON body of `/api/analyze`. Exactly one of the fields should be set.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub text: Option<String>,
    pub url: Option<String>,
}

/// The response for a CSV upload: one analysis per row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CsvAnalysisResponse {
    pub analysis: Vec<AnalysisResult>,
}

/// JSON body of `/api/chat`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(rename = "originalText")]
    pub original_text: Option<String>,
    #[serde(rename = "analysisResults")]
    #[schema(value_type = Option<Object>)]
    pub analysis_results: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    pub ipfs_cid: Option<String>,
    pub ipfs_url: Option<String>,
}

/// Which features are enabled in this process.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub sentiment: bool,
    pub toxicity: bool,
    pub chat: bool,
    pub archive: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Analyze text, a web page, or a CSV file.
///
/// Accepts either a multipart/form-data request with a `file` part (CSV with a
/// `text` column) or a JSON body with `text` or `url`.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body(content = AnalyzeRequest, description = "Text or URL to analyze, or a multipart CSV upload."),
    responses(
        (status = 200, description = "Analysis of the text or URL. CSV uploads return a `CsvAnalysisResponse` instead.", body = AnalysisResult),
        (status = 400, description = "No input, invalid CSV or unreachable URL", body = ErrorBody),
        (status = 503, description = "Sentiment model not available", body = ErrorBody),
        (status = 500, description = "Internal sentiment analysis error", body = ErrorBody)
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, HttpError> {
    let analyzer = state.analyzer.as_ref().ok_or_else(|| {
        warn!("Analyze request rejected: sentiment model not available");
        HttpError::unavailable("Sentiment model not available")
    })?;

    match read_analysis_request(req).await? {
        AnalysisRequest::Csv(bytes) => {
            let texts = read_text_column(&bytes).map_err(|e| {
                warn!("Rejected CSV upload: {}", e);
                HttpError::bad_request(e.to_string())
            })?;
            info!(rows = texts.len(), "Analyzing CSV upload");

            let mut analysis = Vec::with_capacity(texts.len());
            for text in &texts {
                analysis.push(run_analysis(analyzer, text).await?);
            }
            Ok(Json(CsvAnalysisResponse { analysis }).into_response())
        }
        AnalysisRequest::Text(text) => Ok(Json(run_analysis(analyzer, &text).await?).into_response()),
        AnalysisRequest::Url(url) => {
            let page = state.pages.fetch_text(&url).await.map_err(|e| {
                error!("Failed to fetch {}: {:?}", url, e);
                match e {
                    PortError::InvalidInput(msg) => HttpError::bad_request(msg),
                    _ => HttpError::bad_request(format!("Could not fetch content from {}", url)),
                }
            })?;
            let snippet: String = page.chars().take(URL_SNIPPET_CHARS).collect();
            Ok(Json(run_analysis(analyzer, &snippet).await?).into_response())
        }
    }
}

/// Ask a question about the current analysis.
///
/// Successful replies are archived to IPFS when an upload token is configured.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's reply", body = ChatResponse),
        (status = 400, description = "Missing 'message' in request", body = ErrorBody),
        (status = 503, description = "Chatbot is temporarily unavailable", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    body: Bytes,
) -> Result<Json<ChatResponse>, HttpError> {
    let chat = state.chat.as_ref().ok_or_else(|| {
        warn!("Chat request rejected: chat backend not configured");
        HttpError::unavailable("Chatbot is temporarily unavailable")
    })?;

    let request: ChatRequest = parse_json_body(&body)?;
    let message = request
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| HttpError::bad_request("Missing 'message' in request"))?;

    let prompt = build_chat_prompt(
        message,
        request.original_text.as_deref(),
        request.analysis_results.as_ref(),
    );

    let reply = chat.generate(&prompt).await.map_err(|e| {
        error!("Error in /api/chat: {:?}", e);
        HttpError::internal("Internal server error")
    })?;

    let Some(reply) = reply else {
        return Ok(Json(ChatResponse {
            reply: FALLBACK_REPLY.to_string(),
            ipfs_cid: None,
            ipfs_url: None,
        }));
    };

    let ipfs_cid = match &state.archive {
        Some(archive) => {
            let turn = ChatTurn {
                user_id: user.id_or_anonymous().to_string(),
                original_text: request.original_text.clone(),
                analysis_results: request.analysis_results.clone(),
                gemini_reply: reply.clone(),
                created_at: Utc::now(),
            };
            archive
                .archive(&turn)
                .await
                .map_err(|e| error!("IPFS upload failed: {:?}", e))
                .ok()
        }
        None => None,
    };
    let ipfs_url = match (&state.archive, &ipfs_cid) {
        (Some(archive), Some(cid)) => Some(archive.gateway_url(cid)),
        _ => None,
    };

    Ok(Json(ChatResponse {
        reply,
        ipfs_cid,
        ipfs_url,
    }))
}

/// Report which features are enabled.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sentiment: state.analyzer.is_some(),
        toxicity: state.analyzer.as_ref().is_some_and(Analyzer::has_toxicity),
        chat: state.chat.is_some(),
        archive: state.archive.is_some(),
    })
}

//=========================================================================================
// Helpers
//=========================================================================================

async fn run_analysis(analyzer: &Analyzer, text: &str) -> Result<AnalysisResult, HttpError> {
    analyzer.analyze(text).await.map_err(|e| {
        error!("Error in sentiment analysis: {:?}", e);
        HttpError::internal("Internal sentiment analysis error")
    })
}

/// Decides what the caller asked for. File uploads win over `text`, which wins over `url`.
async fn read_analysis_request(req: Request) -> Result<AnalysisRequest, HttpError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| HttpError::bad_request(format!("Invalid multipart request: {}", e)))?;
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            HttpError::bad_request(format!("Failed to read multipart data: {}", e))
        })? {
            if field.name() == Some("file") {
                let data = field.bytes().await.map_err(|e| {
                    HttpError::bad_request(format!("Failed to read file bytes: {}", e))
                })?;
                return Ok(AnalysisRequest::Csv(data.to_vec()));
            }
        }
        return Err(no_input());
    }

    let body = Bytes::from_request(req, &())
        .await
        .map_err(|e| HttpError::bad_request(format!("Failed to read request body: {}", e)))?;
    let request: AnalyzeRequest = parse_json_body(&body)?;

    if let Some(text) = request.text.filter(|t| !t.is_empty()) {
        return Ok(AnalysisRequest::Text(text));
    }
    if let Some(url) = request.url.filter(|u| !u.is_empty()) {
        return Ok(AnalysisRequest::Url(url));
    }
    Err(no_input())
}

fn no_input() -> HttpError {
    HttpError::bad_request("No input provided (send 'file', 'text', or 'url')")
}

/// Parses a JSON body; an empty body is treated as `{}`.
fn parse_json_body<T>(body: &[u8]) -> Result<T, HttpError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected malformed JSON body: {}", e);
        HttpError::bad_request(format!("Invalid JSON body: {}", e))
    })
}
