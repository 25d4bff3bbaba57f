//! crates/casebook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Apart from the company profile (whose JSON shape is what the research
//! model is asked to produce), these structs are independent of any database
//! or serialization format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// An email address permitted to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedEmail {
    pub email: String,
    pub invited_at: DateTime<Utc>,
}

/// An uploaded PDF case together with its extracted text and embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDocument {
    pub id: Uuid,
    pub filename: String,
    pub extracted_text: String,
    pub uploaded_at: DateTime<Utc>,
    pub size_bytes: i64,
    /// `None` when no embedding was stored; such cases are never ranked.
    pub vector: Option<Vec<f32>>,
}

/// Metadata-only view of a case, used for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSummary {
    pub id: Uuid,
    pub filename: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    pub has_vector: bool,
}

impl CaseDocument {
    pub fn summary(&self) -> CaseSummary {
        CaseSummary {
            id: self.id,
            filename: self.filename.clone(),
            size_bytes: self.size_bytes,
            uploaded_at: self.uploaded_at,
            has_vector: self.vector.is_some(),
        }
    }
}

/// The fields needed to persist a freshly uploaded case.
#[derive(Debug, Clone)]
pub struct NewCaseDocument {
    pub filename: String,
    pub extracted_text: String,
    pub size_bytes: i64,
    pub vector: Option<Vec<f32>>,
}

/// A case paired with its cosine similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCase {
    pub case: CaseDocument,
    pub score: f64,
}

/// The role carried by a session. Resolved once, when the session is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// The authenticated caller, derived from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Company research output. Field names mirror the JSON the model is told to emit.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub company_info: CompanyInfo,
    pub analytics_points: Vec<AnalyticsPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub industry: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub size: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub founded: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub headquarters: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "optional_text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub revenue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Models answer `"founded": 1976` as often as `"founded": "1976"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(text) => text,
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Signed(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text_or_number(deserializer)?.unwrap_or_default())
}

fn optional_text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsPoint {
    pub header: String,
    pub description: String,
}
