//! crates/casebook_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AllowedEmail, CaseDocument, CaseSummary, CompanyProfile, NewCaseDocument, ScoredCase,
};
use crate::similarity::SimilarityError;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// An external service (extraction, embedding, generation) failed.
    #[error("Upstream service failed: {0}")]
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
pub trait DatabaseService: Send + Sync {
    // --- Allow-list ---
    async fn list_allowed_emails(&self) -> PortResult<Vec<AllowedEmail>>;

    async fn is_email_allowed(&self, email: &str) -> PortResult<bool>;

    /// Fails with `PortError::Conflict` if the email is already present.
    async fn add_allowed_email(&self, email: &str) -> PortResult<AllowedEmail>;

    /// Fails with `PortError::NotFound` if the email is not present.
    async fn remove_allowed_email(&self, email: &str) -> PortResult<()>;

    // --- Case documents ---
    async fn create_case(&self, case: NewCaseDocument) -> PortResult<CaseDocument>;

    async fn list_cases(&self) -> PortResult<Vec<CaseSummary>>;

    /// Every case that carries an embedding, in upload order.
    async fn list_embedded_cases(&self) -> PortResult<Vec<CaseDocument>>;

    /// Fails with `PortError::NotFound` if no case has this id.
    async fn delete_case(&self, case_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extracts plain text from a PDF payload.
    async fn extract_text(&self, pdf_bytes: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Produces an embedding vector for a piece of text.
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>>;
}

#[async_trait]
pub trait CompanyResearchService: Send + Sync {
    /// Synthesizes a company profile and analytics suggestions for a company name.
    async fn research(&self, company_name: &str) -> PortResult<CompanyProfile>;
}

/// Errors from a similarity search: either the candidates could not be
/// loaded, or they could not be compared with the query.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Port(#[from] PortError),
    #[error(transparent)]
    Similarity(#[from] SimilarityError),
}

/// Finds the stored cases closest to a query embedding.
#[async_trait]
pub trait SimilaritySearchIndex: Send + Sync {
    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredCase>, SearchError>;
}
