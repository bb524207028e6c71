use sitedb_core::error::{Error, Result};
use sitedb_core::types::CollectionKind;

pub fn dot(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

/// Scale to unit length in place; zero vectors are left as they are.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 { for x in v.iter_mut() { *x /= norm; } }
}

/// Indexes and cosine scores of vectors scoring at least `threshold`,
/// best first, ties by ascending index, at most `limit` of them.
/// Both sides are expected to be L2-normalized so the dot product is the cosine.
pub fn search(query: &[f32], vectors: &[Vec<f32>], threshold: f32, limit: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| (i, dot(query, v)))
        .filter(|(_, s)| *s >= threshold)
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(limit);
    scored
}

/// Rejects a query vector whose dimension differs from the stored vectors.
pub fn ensure_dim(kind: CollectionKind, query: &[f32], vectors: &[Vec<f32>]) -> Result<()> {
    match vectors.first() {
        Some(v) if v.len() != query.len() => Err(Error::DimensionMismatch { kind, query: query.len(), stored: v.len() }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_score_then_index() {
        let vectors = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0], vec![0.6, 0.8]];
        let hits = search(&[1.0, 0.0], &vectors, 0.3, 10);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!((hits[2].1 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn threshold_and_limit_apply() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.8, 0.6]];
        assert_eq!(search(&[1.0, 0.0], &vectors, 0.9, 10).len(), 1);
        assert_eq!(search(&[1.0, 0.0], &vectors, -1.0, 2).len(), 2);
        assert!(search(&[1.0, 0.0], &[], 0.0, 10).is_empty());
    }

    #[test]
    fn dimension_mismatch_detected() {
        assert!(ensure_dim(CollectionKind::Projects, &[1.0], &[vec![1.0, 0.0]]).is_err());
        assert!(ensure_dim(CollectionKind::Projects, &[1.0], &[]).is_ok());
    }
}
