//! crates/casebook_core/src/similarity.rs
//!
//! Cosine similarity and top-K ranking over a linearly scanned candidate set.

use std::cmp::Ordering;

/// The number of results returned when the caller does not ask for a limit.
pub const DEFAULT_RANK_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimilarityError {
    #[error("Vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Cosine similarity of two equally sized vectors.
///
/// Degenerate inputs (a zero-magnitude vector, or a ratio that is not finite)
/// score 0 instead of producing NaN or infinity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        Ok(similarity)
    } else {
        Ok(0.0)
    }
}

/// Scores every candidate against `query` and returns the best `limit` of them,
/// highest first. Equal scores keep their input order.
///
/// Fails on the first candidate whose vector length differs from the query's.
pub fn rank<C, F>(
    query: &[f32],
    candidates: impl IntoIterator<Item = C>,
    limit: usize,
    vector_of: F,
) -> Result<Vec<(C, f64)>, SimilarityError>
where
    F: Fn(&C) -> &[f32],
{
    let mut scored = candidates
        .into_iter()
        .map(|candidate| {
            let score = cosine_similarity(query, vector_of(&candidate))?;
            Ok((candidate, score))
        })
        .collect::<Result<Vec<_>, SimilarityError>>()?;

    // `sort_by` is stable, which gives first-seen-first on ties.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    Ok(scored)
}

/// Rounds a score to two decimal places for presentation.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
