//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the response
//! shapes shared by every handler module.

use axum::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::{admin, auth, cases, companies};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::login_handler,
        auth::me_handler,
        auth::logout_handler,
        admin::list_users_handler,
        admin::add_user_handler,
        admin::remove_user_handler,
        admin::upload_case_handler,
        admin::list_cases_handler,
        admin::delete_case_handler,
        cases::similar_cases_handler,
        companies::company_search_handler,
    ),
    components(
        schemas(
            OkResponse,
            auth::LoginRequest,
            auth::MeResponse,
            auth::UserInfo,
            admin::EmailRequest,
            admin::AllowedEmailView,
            admin::AllowedEmailListResponse,
            admin::InviteResponse,
            admin::CaseSummaryView,
            admin::CaseListResponse,
            admin::UploadCaseResponse,
            cases::SimilarCasesRequest,
            cases::SimilarCaseView,
            cases::SimilarCasesResponse,
            companies::CompanySearchResponse,
        )
    ),
    tags(
        (name = "Casebook API", description = "Allow-listed access to company research and similar past cases.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Response Structs
//=========================================================================================

/// `{ok: true}` with an optional human-readable message.
#[derive(Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
        }
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = OkResponse))
)]
pub async fn health_handler() -> Json<OkResponse> {
    Json(OkResponse::ok())
}
