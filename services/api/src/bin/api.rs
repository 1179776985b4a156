//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{GeminiChatAdapter, HostedClassifierAdapter, HttpPageFetcher, Web3StorageAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, session::SessionKeys, state::AppState},
};
use reqwest::Client;
use sentiment_chain_core::ports::{ArchiveService, ChatService, TextClassifier};
use sentiment_chain_core::Analyzer;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    let http = Client::builder().build()?;

    // --- 2. Connect the Classifiers ---
    let sentiment = load_classifier(&http, &config, &config.sentiment_model).await;
    let toxicity = load_classifier(&http, &config, &config.toxicity_model).await;
    let analyzer = match sentiment {
        Some(sentiment) => {
            if toxicity.is_none() {
                warn!("Toxicity model unavailable; sentences will be scored as non-toxic.");
            }
            Some(Analyzer::new(sentiment, toxicity, config.toxic_label.clone()))
        }
        None => {
            error!("Sentiment model unavailable; /api/analyze will answer 503.");
            None
        }
    };

    // --- 3. Initialize the Chat and Archive Adapters ---
    let chat: Option<Arc<dyn ChatService>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiChatAdapter::new(
            http.clone(),
            &config.gemini_base_url,
            &config.chat_model,
            key.clone(),
        ))),
        None => {
            error!("GEMINI_API_KEY not found. Chat disabled.");
            None
        }
    };

    let archive: Option<Arc<dyn ArchiveService>> = match &config.web3_storage_token {
        Some(token) => Some(Arc::new(Web3StorageAdapter::new(
            http.clone(),
            &config.web3_storage_url,
            token.clone(),
            &config.ipfs_gateway_domain,
        ))),
        None => {
            error!("WEB3_STORAGE_TOKEN not found. Chat exchanges will not be archived.");
            None
        }
    };

    let sessions = match &config.session_secret {
        Some(secret) => SessionKeys::new(secret.as_bytes()),
        None => {
            warn!("SESSION_SECRET not set; using a random secret, sessions reset on restart.");
            SessionKeys::ephemeral()
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        analyzer,
        chat,
        archive,
        pages: Arc::new(HttpPageFetcher::new(http.clone())),
        sessions,
    });

    // --- 5. Create the Web Router ---
    let app = build_router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds a classifier for `model` and probes it once. A failed probe disables it.
async fn load_classifier(
    http: &Client,
    config: &Config,
    model: &str,
) -> Option<Arc<dyn TextClassifier>> {
    let adapter = HostedClassifierAdapter::new(
        http.clone(),
        &config.inference_base_url,
        model,
        config.inference_api_token.clone(),
    );
    match adapter.probe().await {
        Ok(()) => {
            info!("Model loaded from {}.", adapter.model());
            Some(Arc::new(adapter))
        }
        Err(e) => {
            error!("Error loading model {}: {}", model, e);
            None
        }
    }
}
