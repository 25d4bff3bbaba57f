//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::session::{AuthenticatedSession, SESSION_COOKIE};
use crate::web::state::AppState;

/// Pulls the session token out of the `Cookie` header, if there is one.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        let (name, value) = c.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

/// Middleware that validates the session cookie.
///
/// If valid, inserts the `AuthenticatedSession` into request extensions for
/// handlers to use. If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers())
        .map(str::to_owned)
        .ok_or_else(ApiError::unauthorized)?;

    let session = state
        .auth
        .authenticate(&token)
        .await
        .map_err(|_| ApiError::unauthorized())?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Middleware for admin-only routes. Must run after `require_auth`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let session = req
        .extensions()
        .get::<AuthenticatedSession>()
        .ok_or_else(ApiError::unauthorized)?;

    if !session.identity.is_admin() {
        warn!(email = %session.identity.email, "Non-admin attempted an admin route");
        return Err(ApiError::Forbidden("Forbidden".to_string()));
    }
    Ok(next.run(req).await)
}
