//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: login, current user, and logout.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::session::{AuthError, AuthenticatedSession, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::web::extract::{validate_email, ApiJson};
use crate::web::rest::OkResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub email: String,
    pub is_admin: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub ok: bool,
    pub user: UserInfo,
}

//=========================================================================================
// Cookies
//=========================================================================================

fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Strict{}",
        SESSION_COOKIE,
        token,
        SESSION_TTL_SECS,
        if secure { "; Secure" } else { "" }
    )
}

fn cleared_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Strict{}",
        SESSION_COOKIE,
        if secure { "; Secure" } else { "" }
    )
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated | AuthError::NotAllowListed => ApiError::unauthorized(),
            AuthError::Store(e) => ApiError::from(e),
            AuthError::Signing(e) => ApiError::Internal(format!("Failed to sign session: {e}")),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Start a session for an allow-listed email
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = OkResponse),
        (status = 400, description = "Invalid email"),
        (status = 401, description = "Email is not allow-listed")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_email(&req.email)?;

    let issued = state.auth.login(state.db.as_ref(), email).await.map_err(|e| {
        if let AuthError::Store(ref store_err) = e {
            error!("Allow-list lookup failed during login: {:?}", store_err);
        }
        ApiError::from(e)
    })?;

    let cookie = session_cookie(&issued.token, state.config.secure_cookies);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(OkResponse::ok()),
    ))
}

/// GET /auth/me - Return the identity behind the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn me_handler(Extension(session): Extension<AuthenticatedSession>) -> Json<MeResponse> {
    Json(MeResponse {
        ok: true,
        user: UserInfo {
            is_admin: session.identity.is_admin(),
            email: session.identity.email,
        },
    })
}

/// POST /auth/logout - Revoke the current session and clear the cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = OkResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthenticatedSession>,
) -> impl IntoResponse {
    state.auth.revoke(&session).await;
    info!(email = %session.identity.email, "Logged out");

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_cookie(state.config.secure_cookies))],
        Json(OkResponse::with_message("Logged out successfully")),
    )
}
