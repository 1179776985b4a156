//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::session::SessionKeys;
use sentiment_chain_core::ports::{ArchiveService, ChatService, PageFetcher};
use sentiment_chain_core::Analyzer;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// A feature whose collaborator failed to initialize is `None`; handlers check
/// for it on every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Option<Analyzer>,
    pub chat: Option<Arc<dyn ChatService>>,
    pub archive: Option<Arc<dyn ArchiveService>>,
    pub pages: Arc<dyn PageFetcher>,
    pub sessions: SessionKeys,
}
