//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use casebook_core::domain::{AllowedEmail, CaseDocument, CaseSummary, NewCaseDocument};
use casebook_core::ports::{DatabaseService, PortError, PortResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Closes the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AllowedEmailRecord {
    email: String,
    invited_at: DateTime<Utc>,
}
impl AllowedEmailRecord {
    fn to_domain(self) -> AllowedEmail {
        AllowedEmail {
            email: self.email,
            invited_at: self.invited_at,
        }
    }
}

#[derive(FromRow)]
struct CaseRecord {
    id: Uuid,
    filename: String,
    extracted_text: String,
    size_bytes: i64,
    uploaded_at: DateTime<Utc>,
    vector: Option<Vec<f32>>,
}
impl CaseRecord {
    fn to_domain(self) -> CaseDocument {
        CaseDocument {
            id: self.id,
            filename: self.filename,
            extracted_text: self.extracted_text,
            uploaded_at: self.uploaded_at,
            size_bytes: self.size_bytes,
            vector: self.vector,
        }
    }
}

#[derive(FromRow)]
struct CaseSummaryRecord {
    id: Uuid,
    filename: String,
    size_bytes: i64,
    uploaded_at: DateTime<Utc>,
    has_vector: bool,
}
impl CaseSummaryRecord {
    fn to_domain(self) -> CaseSummary {
        CaseSummary {
            id: self.id,
            filename: self.filename,
            size_bytes: self.size_bytes,
            uploaded_at: self.uploaded_at,
            has_vector: self.has_vector,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn list_allowed_emails(&self) -> PortResult<Vec<AllowedEmail>> {
        let records = sqlx::query_as::<_, AllowedEmailRecord>(
            "SELECT email, invited_at FROM allowed_emails ORDER BY invited_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn is_email_allowed(&self, email: &str) -> PortResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM allowed_emails WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(exists)
    }

    async fn add_allowed_email(&self, email: &str) -> PortResult<AllowedEmail> {
        let record = sqlx::query_as::<_, AllowedEmailRecord>(
            "INSERT INTO allowed_emails (email) VALUES ($1) ON CONFLICT (email) DO NOTHING RETURNING email, invited_at",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record
            .map(|r| r.to_domain())
            .ok_or_else(|| PortError::Conflict(format!("Email {} is already allowed", email)))
    }

    async fn remove_allowed_email(&self, email: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM allowed_emails WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Email {} not found", email)));
        }
        Ok(())
    }

    async fn create_case(&self, case: NewCaseDocument) -> PortResult<CaseDocument> {
        let record = sqlx::query_as::<_, CaseRecord>(
            "INSERT INTO case_documents (id, filename, extracted_text, size_bytes, vector) VALUES ($1, $2, $3, $4, $5) RETURNING id, filename, extracted_text, size_bytes, uploaded_at, vector",
        )
        .bind(Uuid::new_v4())
        .bind(case.filename)
        .bind(case.extracted_text)
        .bind(case.size_bytes)
        .bind(case.vector)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_cases(&self) -> PortResult<Vec<CaseSummary>> {
        let records = sqlx::query_as::<_, CaseSummaryRecord>(
            "SELECT id, filename, size_bytes, uploaded_at, vector IS NOT NULL AS has_vector FROM case_documents ORDER BY uploaded_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_embedded_cases(&self) -> PortResult<Vec<CaseDocument>> {
        let records = sqlx::query_as::<_, CaseRecord>(
            "SELECT id, filename, extracted_text, size_bytes, uploaded_at, vector FROM case_documents WHERE vector IS NOT NULL ORDER BY uploaded_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_case(&self, case_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM case_documents WHERE id = $1")
            .bind(case_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Case {} not found", case_id)));
        }
        Ok(())
    }
}
