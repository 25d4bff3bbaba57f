//! In-memory stand-ins for the service ports, shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use casebook_core::{
    AllowedEmail, AnalyticsPoint, CaseDocument, CaseSummary, CompanyInfo, CompanyProfile,
    CompanyResearchService, DatabaseService, EmbeddingService, LinearScanIndex, NewCaseDocument,
    PortError, PortResult, TextExtractor,
};
use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::session::SessionAuthenticator;
use crate::web::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@club.org";
pub const MEMBER_EMAIL: &str = "member@club.org";
pub const TEST_SECRET: &str = "router-test-secret";

#[derive(Default)]
pub struct InMemoryDb {
    emails: Mutex<Vec<AllowedEmail>>,
    cases: Mutex<Vec<CaseDocument>>,
}

impl InMemoryDb {
    pub fn with_emails(emails: &[&str]) -> Self {
        let db = Self::default();
        {
            let mut stored = db.emails.lock().unwrap();
            for email in emails {
                stored.push(AllowedEmail {
                    email: email.to_string(),
                    invited_at: Utc::now(),
                });
            }
        }
        db
    }

    pub fn insert_case(&self, filename: &str, vector: Option<Vec<f32>>) -> CaseDocument {
        let case = CaseDocument {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            extracted_text: format!("Extracted text of {filename}"),
            uploaded_at: Utc::now(),
            size_bytes: 2048,
            vector,
        };
        self.cases.lock().unwrap().push(case.clone());
        case
    }

    pub fn cases(&self) -> Vec<CaseDocument> {
        self.cases.lock().unwrap().clone()
    }

    pub fn emails(&self) -> Vec<String> {
        self.emails
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.email.clone())
            .collect()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn list_allowed_emails(&self) -> PortResult<Vec<AllowedEmail>> {
        Ok(self.emails.lock().unwrap().clone())
    }

    async fn is_email_allowed(&self, email: &str) -> PortResult<bool> {
        Ok(self.emails.lock().unwrap().iter().any(|e| e.email == email))
    }

    async fn add_allowed_email(&self, email: &str) -> PortResult<AllowedEmail> {
        let mut emails = self.emails.lock().unwrap();
        if emails.iter().any(|e| e.email == email) {
            return Err(PortError::Conflict(format!("{email} is already allowed")));
        }
        let entry = AllowedEmail {
            email: email.to_string(),
            invited_at: Utc::now(),
        };
        emails.push(entry.clone());
        Ok(entry)
    }

    async fn remove_allowed_email(&self, email: &str) -> PortResult<()> {
        let mut emails = self.emails.lock().unwrap();
        let before = emails.len();
        emails.retain(|e| e.email != email);
        if emails.len() == before {
            return Err(PortError::NotFound(format!("{email} is not allowed")));
        }
        Ok(())
    }

    async fn create_case(&self, case: NewCaseDocument) -> PortResult<CaseDocument> {
        let stored = CaseDocument {
            id: Uuid::new_v4(),
            filename: case.filename,
            extracted_text: case.extracted_text,
            uploaded_at: Utc::now(),
            size_bytes: case.size_bytes,
            vector: case.vector,
        };
        self.cases.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_cases(&self) -> PortResult<Vec<CaseSummary>> {
        Ok(self
            .cases
            .lock()
            .unwrap()
            .iter()
            .map(CaseDocument::summary)
            .collect())
    }

    async fn list_embedded_cases(&self) -> PortResult<Vec<CaseDocument>> {
        Ok(self
            .cases
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.vector.is_some())
            .cloned()
            .collect())
    }

    async fn delete_case(&self, case_id: Uuid) -> PortResult<()> {
        let mut cases = self.cases.lock().unwrap();
        let before = cases.len();
        cases.retain(|c| c.id != case_id);
        if cases.len() == before {
            return Err(PortError::NotFound(format!("Case {case_id} not found")));
        }
        Ok(())
    }
}

/// Returns a fixed text, or fails when constructed with `failing()`.
pub struct FakeExtractor {
    pub fail: bool,
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract_text(&self, pdf_bytes: &[u8]) -> PortResult<String> {
        if self.fail {
            return Err(PortError::Upstream("could not parse PDF".to_string()));
        }
        Ok(format!("extracted {} bytes", pdf_bytes.len()))
    }
}

/// Returns the same vector for every input.
pub struct FakeEmbedder {
    pub vector: Option<Vec<f32>>,
}

#[async_trait]
impl EmbeddingService for FakeEmbedder {
    async fn embed(&self, _text: &str) -> PortResult<Vec<f32>> {
        self.vector
            .clone()
            .ok_or_else(|| PortError::Upstream("quota exceeded".to_string()))
    }
}

pub struct FakeResearcher {
    pub fail: bool,
}

#[async_trait]
impl CompanyResearchService for FakeResearcher {
    async fn research(&self, company_name: &str) -> PortResult<CompanyProfile> {
        if self.fail {
            return Err(PortError::Upstream("unparseable reply".to_string()));
        }
        Ok(CompanyProfile {
            company_info: CompanyInfo {
                name: company_name.to_string(),
                industry: "Retail".to_string(),
                size: "1000-5000".to_string(),
                founded: "1999".to_string(),
                headquarters: "Dublin, Ireland".to_string(),
                description: "Sells things.".to_string(),
                revenue: None,
                website: Some("https://example.com".to_string()),
            },
            analytics_points: vec![AnalyticsPoint {
                header: "Demand forecasting".to_string(),
                description: "Predict weekly sales per store.".to_string(),
            }],
        })
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "DATABASE_URL" => "postgres://localhost/casebook_test",
            "JWT_SECRET" => TEST_SECRET,
            "ADMIN_EMAIL" => ADMIN_EMAIL,
            "OPENAI_API_KEY" => "sk-test",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test config is complete")
}

/// Knobs for building an `AppState` out of fakes.
pub struct Fakes {
    pub db: Arc<InMemoryDb>,
    pub extractor_fails: bool,
    pub embedding: Option<Vec<f32>>,
    pub research_fails: bool,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            db: Arc::new(InMemoryDb::with_emails(&[ADMIN_EMAIL, MEMBER_EMAIL])),
            extractor_fails: false,
            embedding: Some(vec![1.0, 0.0]),
            research_fails: false,
        }
    }
}

impl Fakes {
    pub fn into_state(self) -> Arc<AppState> {
        let config = Arc::new(test_config());
        let db: Arc<dyn DatabaseService> = self.db;
        Arc::new(AppState {
            index: Arc::new(LinearScanIndex::new(db.clone())),
            db,
            auth: Arc::new(SessionAuthenticator::new(
                &config.jwt_secret,
                config.admin_email.clone(),
            )),
            extractor: Arc::new(FakeExtractor {
                fail: self.extractor_fails,
            }),
            embedder: Arc::new(FakeEmbedder {
                vector: self.embedding,
            }),
            researcher: Arc::new(FakeResearcher {
                fail: self.research_fails,
            }),
            config,
        })
    }
}

/// A `Cookie` header value carrying a fresh session for `email`.
pub fn session_cookie_for(state: &AppState, email: &str) -> String {
    let issued = state
        .auth
        .issue_at(email, Utc::now())
        .expect("token signs");
    format!("{}={}", crate::session::SESSION_COOKIE, issued.token)
}
