//! Distance functions over point views, with early-exit variants for the
//! pruned search paths.

use core::fmt::{self, Display};

use ndarray::ArrayView1;

use crate::Error;

/// A distance function between two equal-length views of `f64` coordinates.
///
/// Every metric used by the cluster tree must also provide
/// [`distance_capped`](Metric::distance_capped): the exact distance when it
/// is at most `cap`, and otherwise *any* value strictly greater than `cap`.
/// This lets the leaf scan abandon an accumulation as soon as it can no
/// longer beat the current pruning bound, which is the single hottest
/// code path of a query.
pub trait Metric {
    /// The exact distance between `a` and `b`.
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64;

    /// The exact distance between `a` and `b` if it is at most `cap`;
    /// otherwise some value strictly greater than `cap`.
    fn distance_capped(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap: f64) -> f64;

    /// Whether this function satisfies the triangle inequality.
    ///
    /// Tree construction rejects metrics that do not; their bounds would be
    /// unsound for pruning.
    fn obeys_triangle_inequality(&self) -> bool {
        true
    }
}

// Blanket implementations so trees and searches can borrow a metric.
impl<M: Metric + ?Sized> Metric for &M {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        (**self).distance(a, b)
    }

    fn distance_capped(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap: f64) -> f64 {
        (**self).distance_capped(a, b, cap)
    }

    fn obeys_triangle_inequality(&self) -> bool {
        (**self).obeys_triangle_inequality()
    }
}

impl<M: Metric + ?Sized> Metric for Box<M> {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        (**self).distance(a, b)
    }

    fn distance_capped(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap: f64) -> f64 {
        (**self).distance_capped(a, b, cap)
    }

    fn obeys_triangle_inequality(&self) -> bool {
        (**self).obeys_triangle_inequality()
    }
}

/// The L2 norm: square root of the sum of squared coordinate differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

/// The L2 norm without the square root.
///
/// This violates the triangle inequality and exists only for brute-force
/// reference scans; tree construction rejects it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

/// The L-infinity norm: maximum absolute coordinate difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chebyshev;

/// Euclidean distance with exponentially decaying coordinate weights,
/// `sqrt(sum decay^i * (a_i - b_i)^2)`.
///
/// Useful for delay embeddings where recent coordinates should dominate.
#[derive(Debug, Clone, Copy)]
pub struct ExpWeightedEuclidean {
    decay: f64,
}

impl ExpWeightedEuclidean {
    /// Creates the metric with the given decay factor.
    ///
    /// # Errors
    ///
    /// If `decay` is not in `(0, 1]`.
    pub fn new(decay: f64) -> Result<Self, Error> {
        if decay > 0.0 && decay <= 1.0 {
            Ok(Self { decay })
        } else {
            Err(Error::InvalidArgument(format!(
                "weight decay must be in (0, 1], got {decay}"
            )))
        }
    }

    /// The decay factor applied per coordinate.
    #[must_use]
    pub const fn decay(&self) -> f64 {
        self.decay
    }
}

/// Sum of squared differences over contiguous slices, four accumulators
/// wide so the optimizer can keep the loop vectorized.
fn sq_sum_slices(x: &[f64], y: &[f64]) -> f64 {
    let mut lanes = [0.0_f64; 4];
    for (cx, cy) in x.chunks_exact(4).zip(y.chunks_exact(4)) {
        for (lane, (a, b)) in lanes.iter_mut().zip(cx.iter().zip(cy)) {
            let d = a - b;
            *lane += d * d;
        }
    }
    let mut sum = lanes.iter().sum::<f64>();
    let rx = x.chunks_exact(4).remainder();
    let ry = y.chunks_exact(4).remainder();
    for (a, b) in rx.iter().zip(ry) {
        let d = a - b;
        sum += d * d;
    }
    sum
}

/// Sum of squared differences, abandoning once the accumulator exceeds
/// `cap_sq`. The returned partial sum is then itself greater than `cap_sq`.
fn sq_sum_slices_capped(x: &[f64], y: &[f64], cap_sq: f64) -> f64 {
    let mut sum = 0.0;
    for (cx, cy) in x.chunks_exact(4).zip(y.chunks_exact(4)) {
        let mut part = 0.0;
        for (a, b) in cx.iter().zip(cy) {
            let d = a - b;
            part += d * d;
        }
        sum += part;
        if sum > cap_sq {
            return sum;
        }
    }
    let rx = x.chunks_exact(4).remainder();
    let ry = y.chunks_exact(4).remainder();
    for (a, b) in rx.iter().zip(ry) {
        let d = a - b;
        sum += d * d;
    }
    sum
}

/// Sum of squared differences over possibly strided views.
fn sq_sum(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    match (a.as_slice(), b.as_slice()) {
        (Some(x), Some(y)) => sq_sum_slices(x, y),
        _ => a
            .iter()
            .zip(b.iter())
            .map(|(p, q)| {
                let d = p - q;
                d * d
            })
            .sum(),
    }
}

/// Capped variant of [`sq_sum`] for strided views.
fn sq_sum_capped(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap_sq: f64) -> f64 {
    match (a.as_slice(), b.as_slice()) {
        (Some(x), Some(y)) => sq_sum_slices_capped(x, y, cap_sq),
        _ => {
            let mut sum = 0.0;
            for (p, q) in a.iter().zip(b.iter()) {
                let d = p - q;
                sum += d * d;
                if sum > cap_sq {
                    return sum;
                }
            }
            sum
        }
    }
}

impl Metric for Euclidean {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        sq_sum(a, b).sqrt()
    }

    fn distance_capped(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap: f64) -> f64 {
        // The early exit compares squared accumulators; the square root of
        // an abandoned sum still exceeds `cap`.
        sq_sum_capped(a, b, cap * cap).sqrt()
    }
}

impl Metric for SquaredEuclidean {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        sq_sum(a, b)
    }

    fn distance_capped(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap: f64) -> f64 {
        // `cap` is already in squared units here.
        sq_sum_capped(a, b, cap)
    }

    fn obeys_triangle_inequality(&self) -> bool {
        false
    }
}

impl Metric for Chebyshev {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        a.iter().zip(b.iter()).fold(0.0, |m, (p, q)| m.max((p - q).abs()))
    }

    fn distance_capped(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap: f64) -> f64 {
        let mut m = 0.0_f64;
        for (p, q) in a.iter().zip(b.iter()) {
            m = m.max((p - q).abs());
            if m > cap {
                return m;
            }
        }
        m
    }
}

impl Metric for ExpWeightedEuclidean {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        let mut w = 1.0;
        let mut sum = 0.0;
        for (p, q) in a.iter().zip(b.iter()) {
            let d = p - q;
            sum += w * d * d;
            w *= self.decay;
        }
        sum.sqrt()
    }

    fn distance_capped(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, cap: f64) -> f64 {
        let cap_sq = cap * cap;
        let mut w = 1.0;
        let mut sum = 0.0;
        for (p, q) in a.iter().zip(b.iter()) {
            let d = p - q;
            sum += w * d * d;
            if sum > cap_sq {
                return sum.sqrt();
            }
            w *= self.decay;
        }
        sum.sqrt()
    }
}

impl Display for Euclidean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "euclidean")
    }
}

impl Display for SquaredEuclidean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "squared-euclidean")
    }
}

impl Display for Chebyshev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chebyshev")
    }
}

impl Display for ExpWeightedEuclidean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exp-weighted-euclidean(decay={})", self.decay)
    }
}
