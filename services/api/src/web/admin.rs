//! services/api/src/web/admin.rs
//!
//! Admin-only endpoints: the email allow-list and the case corpus.
//! Every route here sits behind `require_auth` and `require_admin`.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use casebook_core::{AllowedEmail, CaseSummary, NewCaseDocument, PortError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::{validate_email, ApiJson, ApiPath};
use crate::web::rest::OkResponse;
use crate::web::state::AppState;

/// Every PDF starts with this header.
const PDF_MAGIC: &[u8] = b"%PDF-";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllowedEmailView {
    pub email: String,
    pub invited_at: DateTime<Utc>,
}

impl From<AllowedEmail> for AllowedEmailView {
    fn from(entry: AllowedEmail) -> Self {
        Self {
            email: entry.email,
            invited_at: entry.invited_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AllowedEmailListResponse {
    pub ok: bool,
    pub data: Vec<AllowedEmailView>,
}

#[derive(Serialize, ToSchema)]
pub struct InviteResponse {
    pub ok: bool,
    pub message: String,
    pub data: AllowedEmailView,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummaryView {
    pub id: Uuid,
    pub filename: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    pub has_vector: bool,
}

impl From<CaseSummary> for CaseSummaryView {
    fn from(summary: CaseSummary) -> Self {
        Self {
            id: summary.id,
            filename: summary.filename,
            size_bytes: summary.size_bytes,
            uploaded_at: summary.uploaded_at,
            has_vector: summary.has_vector,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CaseListResponse {
    pub ok: bool,
    pub data: Vec<CaseSummaryView>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadCaseResponse {
    pub ok: bool,
    pub id: Uuid,
    pub filename: String,
}

//=========================================================================================
// Allow-list Handlers
//=========================================================================================

/// GET /admin/users - List allow-listed emails
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Allow-listed emails", body = AllowedEmailListResponse),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AllowedEmailListResponse>, ApiError> {
    let emails = state.db.list_allowed_emails().await?;
    Ok(Json(AllowedEmailListResponse {
        ok: true,
        data: emails.into_iter().map(AllowedEmailView::from).collect(),
    }))
}

/// POST /admin/users - Add an email to the allow-list
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = EmailRequest,
    responses(
        (status = 201, description = "Email invited", body = InviteResponse),
        (status = 400, description = "Invalid email"),
        (status = 409, description = "Email already invited")
    )
)]
pub async fn add_user_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.unwrap_or_default();
    let email = validate_email(&email)?;

    let entry = state.db.add_allowed_email(email).await.map_err(|e| match e {
        PortError::Conflict(_) => ApiError::Conflict("Email already invited".to_string()),
        other => ApiError::from(other),
    })?;
    info!(email = %entry.email, "Email added to allow-list");

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse {
            ok: true,
            message: "User invited".to_string(),
            data: entry.into(),
        }),
    ))
}

/// DELETE /admin/users - Remove an email from the allow-list
#[utoipa::path(
    delete,
    path = "/admin/users",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email deleted", body = OkResponse),
        (status = 400, description = "Email missing"),
        (status = 404, description = "Email not found")
    )
)]
pub async fn remove_user_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Validation("Email required".to_string()))?;

    state
        .db
        .remove_allowed_email(&email)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiError::NotFound("Email not found".to_string()),
            other => ApiError::from(other),
        })?;
    info!(email = %email, "Email removed from allow-list");

    Ok(Json(OkResponse::with_message("Email deleted")))
}

//=========================================================================================
// Case Handlers
//=========================================================================================

/// Reads the `file` part of the form. Other parts are skipped.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<(String, Bytes)>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("uploaded.pdf")
            .to_string();
        let data = field.bytes().await?;
        return Ok(Some((filename, data)));
    }
    Ok(None)
}

/// POST /admin/cases - Upload a PDF case
///
/// Extracts the text, requests an embedding for it, and stores both.
#[utoipa::path(
    post,
    path = "/admin/cases",
    request_body(content_type = "multipart/form-data", description = "A PDF in the `file` field."),
    responses(
        (status = 201, description = "Case stored", body = UploadCaseResponse),
        (status = 400, description = "Missing file or not a PDF"),
        (status = 500, description = "Extraction or embedding failed")
    )
)]
pub async fn upload_case_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (filename, data) = read_file_field(&mut multipart)
        .await?
        .filter(|(_, data)| !data.is_empty())
        .ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;

    if !data.starts_with(PDF_MAGIC) {
        return Err(ApiError::Validation("Uploaded file is not a PDF".to_string()));
    }

    let extracted_text = state.extractor.extract_text(&data).await.map_err(|e| {
        error!(filename = %filename, "Text extraction failed: {:?}", e);
        ApiError::Upstream("Upload failed".to_string())
    })?;

    let vector = state.embedder.embed(&extracted_text).await.map_err(|e| {
        error!(filename = %filename, "Embedding request failed: {:?}", e);
        ApiError::Upstream("Upload failed".to_string())
    })?;

    let case = state
        .db
        .create_case(NewCaseDocument {
            filename,
            extracted_text,
            size_bytes: data.len() as i64,
            vector: Some(vector),
        })
        .await?;
    info!(case_id = %case.id, filename = %case.filename, "Case uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadCaseResponse {
            ok: true,
            id: case.id,
            filename: case.filename,
        }),
    ))
}

/// GET /admin/cases - List stored cases (metadata only)
#[utoipa::path(
    get,
    path = "/admin/cases",
    responses((status = 200, description = "Stored cases", body = CaseListResponse))
)]
pub async fn list_cases_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CaseListResponse>, ApiError> {
    let cases = state.db.list_cases().await?;
    Ok(Json(CaseListResponse {
        ok: true,
        data: cases.into_iter().map(CaseSummaryView::from).collect(),
    }))
}

/// DELETE /admin/cases/{id} - Delete a case
#[utoipa::path(
    delete,
    path = "/admin/cases/{id}",
    params(("id" = String, Path, description = "The case id (UUID).")),
    responses(
        (status = 200, description = "Case deleted", body = OkResponse),
        (status = 400, description = "Invalid case id"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn delete_case_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<OkResponse>, ApiError> {
    let case_id =
        Uuid::parse_str(&id).map_err(|_| ApiError::Validation("Invalid case ID".to_string()))?;

    state.db.delete_case(case_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ApiError::NotFound("Case not found".to_string()),
        other => ApiError::from(other),
    })?;
    info!(case_id = %case_id, "Case deleted");

    Ok(Json(OkResponse::with_message("Case deleted")))
}
