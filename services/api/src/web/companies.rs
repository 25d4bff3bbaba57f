//! services/api/src/web/companies.rs
//!
//! Company research for logged-in users.

use axum::{extract::State, Json};
use casebook_core::CompanyProfile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::web::extract::ApiQuery;
use crate::web::state::AppState;

const MAX_COMPANY_NAME_CHARS: usize = 100;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompanySearchQuery {
    /// The company name to research.
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize, ToSchema)]
pub struct CompanySearchResponse {
    pub ok: bool,
    #[schema(value_type = Object)]
    pub data: CompanyProfile,
}

/// GET /companies/search?q= - Synthesize a company profile and analytics ideas
#[utoipa::path(
    get,
    path = "/companies/search",
    params(CompanySearchQuery),
    responses(
        (status = 200, description = "Company profile", body = CompanySearchResponse),
        (status = 400, description = "Company name missing or too long"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Generation failure")
    )
)]
pub async fn company_search_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<CompanySearchQuery>,
) -> Result<Json<CompanySearchResponse>, ApiError> {
    let company_name = query.q.trim();
    if company_name.is_empty() {
        return Err(ApiError::Validation("Company name is required".to_string()));
    }
    if company_name.chars().count() > MAX_COMPANY_NAME_CHARS {
        return Err(ApiError::Validation("Company name too long".to_string()));
    }

    let profile = state.researcher.research(company_name).await.map_err(|e| {
        error!(company = %company_name, "Company research failed: {:?}", e);
        ApiError::Upstream("Failed to fetch company data".to_string())
    })?;

    Ok(Json(CompanySearchResponse {
        ok: true,
        data: profile,
    }))
}
