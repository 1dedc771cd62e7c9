//! Brute-force reference scans the tree results are checked against.

use atria::{Metric, Neighbor, PointSet};
use ndarray::ArrayView1;

fn excluded(exclude: Option<(usize, usize)>, index: usize) -> bool {
    exclude.is_some_and(|(lo, hi)| lo <= index && index <= hi)
}

/// Exhaustive k-nearest scan, sorted ascending with index tie-breaks.
pub fn knn<P: PointSet, M: Metric>(
    points: &P,
    metric: &M,
    query: ArrayView1<'_, f64>,
    k: usize,
    exclude: Option<(usize, usize)>,
) -> Vec<Neighbor> {
    let mut hits: Vec<Neighbor> = (0..points.len())
        .filter(|&i| !excluded(exclude, i))
        .map(|i| Neighbor::new(i, metric.distance(query, points.point(i))))
        .collect();
    hits.sort_unstable_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.index.cmp(&b.index))
    });
    hits.truncate(k);
    hits
}

/// Exhaustive radius scan (closed ball), sorted by index.
pub fn range<P: PointSet, M: Metric>(
    points: &P,
    metric: &M,
    query: ArrayView1<'_, f64>,
    radius: f64,
    exclude: Option<(usize, usize)>,
) -> Vec<Neighbor> {
    (0..points.len())
        .filter(|&i| !excluded(exclude, i))
        .map(|i| Neighbor::new(i, metric.distance(query, points.point(i))))
        .filter(|n| n.distance <= radius)
        .collect()
}
