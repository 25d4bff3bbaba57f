//! services/api/src/web/cases.rs
//!
//! Similar-case search for logged-in users.

use axum::{extract::State, Json};
use casebook_core::{round_score, ScoredCase, SearchError, DEFAULT_RANK_LIMIT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::ApiJson;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimilarCasesRequest {
    pub company_info: String,
    /// Defaults to 5.
    pub limit: Option<usize>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimilarCaseView {
    pub id: Uuid,
    pub filename: String,
    pub extracted_text: String,
    /// Cosine similarity rounded to two decimals.
    pub similarity: f64,
}

impl From<ScoredCase> for SimilarCaseView {
    fn from(scored: ScoredCase) -> Self {
        Self {
            id: scored.case.id,
            filename: scored.case.filename,
            extracted_text: scored.case.extracted_text,
            similarity: round_score(scored.score),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SimilarCasesResponse {
    pub ok: bool,
    pub data: Vec<SimilarCaseView>,
}

/// POST /cases/similar - Rank stored cases against a company description
#[utoipa::path(
    post,
    path = "/cases/similar",
    request_body = SimilarCasesRequest,
    responses(
        (status = 200, description = "Most similar cases, best first", body = SimilarCasesResponse),
        (status = 400, description = "Company information missing"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Embedding service failure")
    )
)]
pub async fn similar_cases_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SimilarCasesRequest>,
) -> Result<Json<SimilarCasesResponse>, ApiError> {
    if req.company_info.trim().is_empty() {
        return Err(ApiError::Validation(
            "Company information is required".to_string(),
        ));
    }
    let limit = req.limit.unwrap_or(DEFAULT_RANK_LIMIT);

    let query = state.embedder.embed(&req.company_info).await.map_err(|e| {
        error!("Embedding request failed for similar-case search: {:?}", e);
        ApiError::Upstream("Failed to find similar cases".to_string())
    })?;

    let ranked = state.index.search(&query, limit).await.map_err(|e| {
        match &e {
            SearchError::Similarity(mismatch) => {
                warn!("Stored case vectors do not match the query embedding: {}", mismatch)
            }
            SearchError::Port(port) => error!("Failed to load cases for ranking: {:?}", port),
        }
        ApiError::Upstream("Failed to find similar cases".to_string())
    })?;
    info!(results = ranked.len(), limit, "Similar-case search complete");

    Ok(Json(SimilarCasesResponse {
        ok: true,
        data: ranked.into_iter().map(SimilarCaseView::from).collect(),
    }))
}
