//! crates/sentiment_chain_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the hosted models, the chat backend and the storage service.

use crate::domain::{ClassScores, ChatTurn};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, JSON).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Returns the soft-max distribution over the model's classes for `text`.
    async fn classify(&self, text: &str) -> PortResult<ClassScores>;
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Generates a reply for a fully rendered prompt.
    ///
    /// Returns `Ok(None)` when every candidate generation was withheld by the
    /// backend's safety filters.
    async fn generate(&self, prompt: &str) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait ArchiveService: Send + Sync {
    /// Uploads a chat exchange and returns its content identifier.
    async fn archive(&self, turn: &ChatTurn) -> PortResult<String>;

    /// Public gateway URL for a content identifier.
    fn gateway_url(&self, cid: &str) -> String;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Downloads a web page and returns its visible text.
    async fn fetch_text(&self, url: &str) -> PortResult<String>;
}
