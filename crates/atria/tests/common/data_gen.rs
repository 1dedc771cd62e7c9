//! Data generation utilities for testing.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seeded uniform random points, one row-vector per point.
pub fn tabular(car: usize, dim: usize, min: f64, max: f64, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..car)
        .map(|_| (0..dim).map(|_| rng.random_range(min..max)).collect())
        .collect()
}

/// A `max x max` integer grid as 2-D points, row-major.
pub fn grid(max: i32) -> Vec<Vec<f64>> {
    (0..max)
        .flat_map(|x| (0..max).map(move |y| vec![f64::from(x), f64::from(y)]))
        .collect()
}

/// A chaotic scalar series from the fully developed logistic map. The
/// trajectory fills the unit interval but lives on a low-dimensional
/// attractor once delay-embedded, which is the workload the tree targets.
pub fn logistic_series(len: usize, x0: f64) -> Vec<f64> {
    let mut x = x0;
    (0..len)
        .map(|_| {
            let current = x;
            x = 4.0 * x * (1.0 - x);
            current
        })
        .collect()
}
