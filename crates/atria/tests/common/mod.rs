//! Shared test support.

#![allow(dead_code)]

pub mod data_gen;
pub mod exhaustive;

use atria::Neighbor;

/// Sorts hits the way the library reports them: ascending distance, index
/// as the tie-breaker.
pub fn sort_hits(mut hits: Vec<Neighbor>) -> Vec<Neighbor> {
    hits.sort_unstable_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.index.cmp(&b.index))
    });
    hits
}

/// Asserts that two hit lists agree: same length, pairwise distances within
/// tolerance, and the same set of indices.
pub fn check_hits(expected: &[Neighbor], actual: &[Neighbor], label: &str) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "{label}: hit count mismatch:\nexp {expected:?}\ngot {actual:?}",
    );
    for (i, (e, a)) in expected.iter().zip(actual.iter()).enumerate() {
        assert!(
            (e.distance - a.distance).abs() <= 1e-9 * (1.0 + e.distance),
            "{label}: distance mismatch at rank {i}:\nexp {expected:?}\ngot {actual:?}",
        );
    }
    let expected_indices: std::collections::BTreeSet<_> = expected.iter().map(|n| n.index).collect();
    let actual_indices: std::collections::BTreeSet<_> = actual.iter().map(|n| n.index).collect();
    assert_eq!(
        expected_indices, actual_indices,
        "{label}: index set mismatch:\nexp {expected:?}\ngot {actual:?}",
    );
}

/// Asserts that no index occurs twice in a hit list.
pub fn assert_no_duplicates(hits: &[Neighbor], label: &str) {
    let mut seen = std::collections::BTreeSet::new();
    for hit in hits {
        assert!(
            seen.insert(hit.index),
            "{label}: index {} reported twice in {hits:?}",
            hit.index
        );
    }
}
