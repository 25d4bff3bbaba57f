//! services/api/src/web/extract.rs
//!
//! Extractor wrappers whose rejections render as the standard error envelope,
//! plus the small input checks shared by several handlers.

use std::sync::LazyLock;

use axum::extract::{FromRequest, FromRequestParts};
use regex::Regex;

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Accepts the email unchanged if it looks like an address.
pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    if EMAIL_RE.is_match(email) {
        Ok(email)
    } else {
        Err(ApiError::Validation("Invalid email address".to_string()))
    }
}
