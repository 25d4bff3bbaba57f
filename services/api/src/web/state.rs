//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::session::SessionAuthenticator;
use casebook_core::ports::{
    CompanyResearchService, DatabaseService, EmbeddingService, SimilaritySearchIndex,
    TextExtractor,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub index: Arc<dyn SimilaritySearchIndex>,
    pub config: Arc<Config>,
    pub auth: Arc<SessionAuthenticator>,
    pub extractor: Arc<dyn TextExtractor>,
    pub embedder: Arc<dyn EmbeddingService>,
    pub researcher: Arc<dyn CompanyResearchService>,
}
