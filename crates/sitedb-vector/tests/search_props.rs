use proptest::prelude::*;
use sitedb_vector::{l2_normalize, search};

fn unit_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, dim)
        .prop_filter("non-zero", |v| v.iter().any(|x| x.abs() > 1e-3))
        .prop_map(|mut v| { l2_normalize(&mut v); v })
}

proptest! {
    #[test]
    fn scores_stay_within_cosine_range(query in unit_vector(16), vectors in prop::collection::vec(unit_vector(16), 0..20)) {
        for (_, score) in search(&query, &vectors, -1.5, vectors.len()) {
            prop_assert!((-1.0 - 1e-5..=1.0 + 1e-5).contains(&score));
        }
    }

    #[test]
    fn duplicate_of_query_scores_one(query in unit_vector(8), others in prop::collection::vec(unit_vector(8), 0..10)) {
        let mut vectors = others;
        vectors.push(query.clone());
        let hits = search(&query, &vectors, 0.3, vectors.len());
        prop_assert!(!hits.is_empty());
        prop_assert!((hits[0].1 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn search_is_idempotent(query in unit_vector(8), vectors in prop::collection::vec(unit_vector(8), 0..15)) {
        prop_assert_eq!(search(&query, &vectors, 0.0, 5), search(&query, &vectors, 0.0, 5));
    }
}
