//! Indexed point collections: dense coordinate matrices and copy-free
//! time-delay embeddings of scalar series.

use ndarray::{Array2, ArrayView1, ShapeBuilder};

use crate::Error;

/// An indexed collection of equal-dimension points.
///
/// Implementations hand out zero-copy views; the tree and the searches never
/// materialise a point.
pub trait PointSet {
    /// The number of points.
    fn len(&self) -> usize;

    /// Whether the collection holds no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dimensionality of every point.
    fn dim(&self) -> usize;

    /// A view of the `index`-th point.
    ///
    /// # Panics
    ///
    /// May panic if `index >= self.len()`.
    fn point(&self, index: usize) -> ArrayView1<'_, f64>;
}

impl<P: PointSet + ?Sized> PointSet for &P {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn point(&self, index: usize) -> ArrayView1<'_, f64> {
        (**self).point(index)
    }
}

/// A dense `dim x n` coordinate matrix whose columns are points.
///
/// Column-major storage keeps each point contiguous, which is what the
/// unrolled distance kernels want; [`DensePoints::from_points`] produces
/// that layout.
#[derive(Debug, Clone)]
pub struct DensePoints {
    data: Array2<f64>,
}

impl DensePoints {
    /// Wraps a `(dim, n)` matrix whose columns are the points.
    ///
    /// # Errors
    ///
    /// If the matrix has zero rows (points must have at least one
    /// coordinate).
    pub fn new(data: Array2<f64>) -> Result<Self, Error> {
        if data.nrows() == 0 {
            return Err(Error::InvalidArgument(
                "points must have at least one coordinate".into(),
            ));
        }
        Ok(Self { data })
    }

    /// Builds a column-major matrix from one row-vector per point.
    ///
    /// # Errors
    ///
    /// If `points` is empty, a point is empty, or the points disagree on
    /// dimension.
    pub fn from_points(points: &[Vec<f64>]) -> Result<Self, Error> {
        let dim = points.first().map_or(0, Vec::len);
        if dim == 0 {
            return Err(Error::InvalidArgument(
                "points must be non-empty and have at least one coordinate".into(),
            ));
        }
        if let Some(bad) = points.iter().position(|p| p.len() != dim) {
            return Err(Error::InvalidArgument(format!(
                "point {bad} has dimension {} but point 0 has dimension {dim}",
                points[bad].len()
            )));
        }
        let mut flat = Vec::with_capacity(dim * points.len());
        for point in points {
            flat.extend_from_slice(point);
        }
        let data = Array2::from_shape_vec((dim, points.len()).f(), flat)
            .unwrap_or_else(|_| unreachable!("shape was derived from the input lengths"));
        Self::new(data)
    }

    /// The underlying `(dim, n)` matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Array2<f64> {
        &self.data
    }
}

impl PointSet for DensePoints {
    fn len(&self) -> usize {
        self.data.ncols()
    }

    fn dim(&self) -> usize {
        self.data.nrows()
    }

    fn point(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.column(index)
    }
}

/// A time-delay embedding of a scalar series.
///
/// Point `i` is the strided window `(s[i], s[i + delay], ...,
/// s[i + (dim - 1) * delay])`. The series is borrowed and never copied; each
/// point is a stride-`delay` view into it.
#[derive(Debug, Clone, Copy)]
pub struct TimeDelayEmbedding<'s> {
    series: &'s [f64],
    dim: usize,
    delay: usize,
}

impl<'s> TimeDelayEmbedding<'s> {
    /// Embeds `series` with the given dimension and delay.
    ///
    /// # Errors
    ///
    /// If `dim` or `delay` is zero, or the series is too short to yield a
    /// single embedded point.
    pub fn new(series: &'s [f64], dim: usize, delay: usize) -> Result<Self, Error> {
        if dim == 0 || delay == 0 {
            return Err(Error::InvalidArgument(format!(
                "embedding dimension and delay must be positive, got ({dim}, {delay})"
            )));
        }
        let span = (dim - 1) * delay + 1;
        if series.len() < span {
            return Err(Error::InvalidArgument(format!(
                "series of length {} is too short for a ({dim}, {delay}) embedding",
                series.len()
            )));
        }
        Ok(Self { series, dim, delay })
    }

    /// The embedding dimension.
    #[must_use]
    pub const fn embedding_dim(&self) -> usize {
        self.dim
    }

    /// The delay between consecutive coordinates, in samples.
    #[must_use]
    pub const fn delay(&self) -> usize {
        self.delay
    }
}

impl PointSet for TimeDelayEmbedding<'_> {
    fn len(&self) -> usize {
        self.series.len() - (self.dim - 1) * self.delay
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn point(&self, index: usize) -> ArrayView1<'_, f64> {
        let span = (self.dim - 1) * self.delay + 1;
        let window = &self.series[index..index + span];
        ArrayView1::from_shape(self.dim.strides(self.delay), window)
            .unwrap_or_else(|_| unreachable!("window length is validated at construction"))
    }
}
