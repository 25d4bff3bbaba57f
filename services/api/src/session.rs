//! services/api/src/session.rs
//!
//! Issues and validates the signed session tokens carried in the `token` cookie.
//!
//! Tokens are HS256 JWTs with a fixed one-hour lifetime. The admin role is
//! decided once, when the token is issued, and travels inside the signed
//! claims. Logging out records the token id in an in-process revocation list
//! until the token would have expired anyway.

use std::collections::HashMap;

use casebook_core::{DatabaseService, Identity, PortError, Role};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "token";
pub const SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing, malformed, expired, revoked or forged credential.
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Email is not on the allow-list")]
    NotAllowListed,
    #[error("Session store error: {0}")]
    Store(#[from] PortError),
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
    jti: String,
}

/// A freshly signed token, ready to be placed in a cookie.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// The result of validating a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub identity: Identity,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    admin_email: String,
    ttl: Duration,
    revoked: RwLock<HashMap<String, i64>>,
}

impl SessionAuthenticator {
    pub fn new(secret: &str, admin_email: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `authenticate_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            admin_email: admin_email.into(),
            ttl: Duration::seconds(SESSION_TTL_SECS),
            revoked: RwLock::new(HashMap::new()),
        }
    }

    /// Exact, case-sensitive comparison with the configured admin address.
    pub fn is_admin_email(&self, email: &str) -> bool {
        email == self.admin_email
    }

    /// Issues a token for an allow-listed email.
    pub async fn login(
        &self,
        db: &dyn DatabaseService,
        email: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.login_at(db, email, Utc::now()).await
    }

    pub async fn login_at(
        &self,
        db: &dyn DatabaseService,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        if !db.is_email_allowed(email).await? {
            info!(email, "Login rejected: email is not allow-listed");
            return Err(AuthError::NotAllowListed);
        }
        let issued = self.issue_at(email, now)?;
        info!(email, "Session issued");
        Ok(issued)
    }

    /// Signs a token without consulting the allow-list.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let role = if self.is_admin_email(email) {
            Role::Admin
        } else {
            Role::Member
        };
        let expires_at = now + self.ttl;
        let claims = Claims {
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedSession, AuthError> {
        self.authenticate_at(token, Utc::now()).await
    }

    /// Validates signature, expiry and revocation as of `now`.
    pub async fn authenticate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedSession, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Unauthenticated);
        }
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Rejected session token: {}", e);
                AuthError::Unauthenticated
            })?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::Unauthenticated);
        }
        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AuthError::Unauthenticated);
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AuthError::Unauthenticated)?;

        Ok(AuthenticatedSession {
            identity: Identity {
                email: claims.email,
                role: claims.role,
            },
            token_id: claims.jti,
            expires_at,
        })
    }

    /// Rejects the session's token for the rest of its lifetime.
    pub async fn revoke(&self, session: &AuthenticatedSession) {
        self.revoke_at(session, Utc::now()).await;
    }

    pub async fn revoke_at(&self, session: &AuthenticatedSession, now: DateTime<Utc>) {
        let mut revoked = self.revoked.write().await;
        let now_ts = now.timestamp();
        revoked.retain(|_, exp| *exp > now_ts);
        revoked.insert(session.token_id.clone(), session.expires_at.timestamp());
    }

    #[cfg(test)]
    pub(crate) async fn revoked_count(&self) -> usize {
        self.revoked.read().await.len()
    }
}
