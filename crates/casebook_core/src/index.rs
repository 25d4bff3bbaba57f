//! crates/casebook_core/src/index.rs
//!
//! The linear-scan implementation of `SimilaritySearchIndex`. Every embedded
//! case is loaded from the store and scored against the query; there is no
//! index structure, which is fine while the case corpus stays small.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{CaseDocument, ScoredCase};
use crate::ports::{DatabaseService, SearchError, SimilaritySearchIndex};
use crate::similarity::rank;

pub struct LinearScanIndex {
    db: Arc<dyn DatabaseService>,
}

impl LinearScanIndex {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }
}

fn case_vector(case: &CaseDocument) -> &[f32] {
    case.vector.as_deref().unwrap_or_default()
}

#[async_trait]
impl SimilaritySearchIndex for LinearScanIndex {
    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredCase>, SearchError> {
        let candidates = self
            .db
            .list_embedded_cases()
            .await?
            .into_iter()
            .filter(|case| case.vector.is_some());

        let ranked = rank(query, candidates, limit, case_vector)?;
        Ok(ranked
            .into_iter()
            .map(|(case, score)| ScoredCase { case, score })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllowedEmail, CaseSummary, NewCaseDocument};
    use crate::ports::{PortError, PortResult};
    use crate::similarity::SimilarityError;
    use chrono::Utc;
    use uuid::Uuid;

    /// A store that only knows how to hand back a fixed set of cases.
    struct FixedCases(Vec<CaseDocument>);

    #[async_trait]
    impl DatabaseService for FixedCases {
        async fn list_allowed_emails(&self) -> PortResult<Vec<AllowedEmail>> {
            Ok(Vec::new())
        }
        async fn is_email_allowed(&self, _email: &str) -> PortResult<bool> {
            Ok(false)
        }
        async fn add_allowed_email(&self, _email: &str) -> PortResult<AllowedEmail> {
            Err(PortError::Unexpected("read-only".to_string()))
        }
        async fn remove_allowed_email(&self, _email: &str) -> PortResult<()> {
            Err(PortError::Unexpected("read-only".to_string()))
        }
        async fn create_case(&self, _case: NewCaseDocument) -> PortResult<CaseDocument> {
            Err(PortError::Unexpected("read-only".to_string()))
        }
        async fn list_cases(&self) -> PortResult<Vec<CaseSummary>> {
            Ok(self.0.iter().map(CaseDocument::summary).collect())
        }
        async fn list_embedded_cases(&self) -> PortResult<Vec<CaseDocument>> {
            Ok(self.0.clone())
        }
        async fn delete_case(&self, case_id: Uuid) -> PortResult<()> {
            Err(PortError::NotFound(case_id.to_string()))
        }
    }

    fn case(name: &str, vector: Option<Vec<f32>>) -> CaseDocument {
        CaseDocument {
            id: Uuid::new_v4(),
            filename: name.to_string(),
            extracted_text: format!("text of {name}"),
            uploaded_at: Utc::now(),
            size_bytes: 1024,
            vector,
        }
    }

    #[tokio::test]
    async fn search_skips_cases_without_vectors() {
        let db = FixedCases(vec![
            case("a.pdf", Some(vec![1.0, 0.0])),
            case("no-vector.pdf", None),
            case("b.pdf", Some(vec![0.0, 1.0])),
        ]);
        let index = LinearScanIndex::new(Arc::new(db));

        let results = index.search(&[1.0, 0.0], 5).await.unwrap();
        let names: Vec<_> = results.iter().map(|r| r.case.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert!((results[0].score - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn search_surfaces_dimension_mismatch() {
        let db = FixedCases(vec![case("old-model.pdf", Some(vec![1.0, 0.0, 0.0]))]);
        let index = LinearScanIndex::new(Arc::new(db));

        let err = index.search(&[1.0, 0.0], 5).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Similarity(SimilarityError::DimensionMismatch { expected: 2, found: 3 })
        ));
    }

    #[tokio::test]
    async fn search_on_empty_store_is_empty() {
        let index = LinearScanIndex::new(Arc::new(FixedCases(Vec::new())));
        assert!(index.search(&[1.0], 5).await.unwrap().is_empty());
    }
}
