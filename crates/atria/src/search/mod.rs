//! Query entry points: k-nearest, radius search, and range counting, plus
//! their batched variants.

mod context;
mod knn;
mod range;

pub use context::SearchContext;

use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::{neighbors::Neighbor, points::PointSet, tree::Tree, Error, Metric};

/// Optional query parameters, in their exact-search defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Approximation slack for k-nearest queries: a result is accepted once
    /// no remaining cluster could improve on the current `k`-th distance by
    /// more than a `(1 + epsilon)` factor. Zero (the default) is exact.
    pub epsilon: f64,
    /// Inclusive range of point indices to ignore, e.g. a window around the
    /// query's own index for leave-one-out queries on embedded series. An
    /// inverted range excludes nothing.
    pub exclude: Option<(usize, usize)>,
}

impl SearchOptions {
    /// Sets the approximation slack.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Excludes the inclusive index range `[lo, hi]` from the results.
    #[must_use]
    pub fn excluding(mut self, lo: usize, hi: usize) -> Self {
        self.exclude = Some((lo, hi));
        self
    }

    /// Whether `index` falls in the excluded range.
    pub(crate) fn excludes(&self, index: usize) -> bool {
        self.exclude.is_some_and(|(lo, hi)| lo <= index && index <= hi)
    }
}

/// A query position: an external vector, or one of the indexed points.
///
/// Index queries evaluate distances against the stored point directly, so a
/// delay-embedded series can be queried against itself without
/// materialising any window.
#[derive(Debug, Clone, Copy)]
pub enum Query<'q> {
    /// An external query vector.
    Point(ArrayView1<'q, f64>),
    /// The index of a point in the tree's own point set.
    Index(usize),
}

impl<'q> From<ArrayView1<'q, f64>> for Query<'q> {
    fn from(view: ArrayView1<'q, f64>) -> Self {
        Self::Point(view)
    }
}

impl<'q> From<&'q [f64]> for Query<'q> {
    fn from(slice: &'q [f64]) -> Self {
        Self::Point(ArrayView1::from(slice))
    }
}

impl From<usize> for Query<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'d, P: PointSet, M: Metric> Tree<'d, P, M> {
    /// The `k` nearest neighbors of `query`, sorted by ascending distance
    /// (index breaks ties). Fewer than `k` are returned only when the point
    /// set, minus exclusions, has fewer than `k` members.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for `k = 0`, a dimension mismatch, a
    ///   non-finite query vector, or an out-of-bounds query index.
    /// - [`Error::CapacityExceeded`] if `ctx` was created for a smaller
    ///   tree.
    pub fn knn<'q, Q: Into<Query<'q>>>(
        &self,
        query: Q,
        k: usize,
        ctx: &mut SearchContext,
    ) -> Result<Vec<Neighbor>, Error> {
        self.knn_with(query, k, &SearchOptions::default(), ctx)
    }

    /// [`knn`](Tree::knn) with explicit [`SearchOptions`].
    ///
    /// # Errors
    ///
    /// As [`knn`](Tree::knn), plus [`Error::InvalidArgument`] for a negative
    /// or non-finite `epsilon`.
    pub fn knn_with<'q, Q: Into<Query<'q>>>(
        &self,
        query: Q,
        k: usize,
        options: &SearchOptions,
        ctx: &mut SearchContext,
    ) -> Result<Vec<Neighbor>, Error> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".into()));
        }
        if !(options.epsilon >= 0.0 && options.epsilon.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "epsilon must be finite and non-negative, got {}",
                options.epsilon
            )));
        }
        ctx.ensure_queue_capacity(self.queue_capacity_requirement())?;
        let view = self.query_view(query.into())?;
        Ok(knn::search(self, view, k, options, ctx))
    }

    /// Every point within `radius` of `query` (closed ball), in traversal
    /// order. Callers that need a deterministic order should sort.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for a negative or non-finite radius, a
    ///   dimension mismatch, a non-finite query vector, or an out-of-bounds
    ///   query index.
    /// - [`Error::CapacityExceeded`] if `ctx` was created for a smaller
    ///   tree.
    pub fn range_search<'q, Q: Into<Query<'q>>>(
        &self,
        query: Q,
        radius: f64,
        ctx: &mut SearchContext,
    ) -> Result<Vec<Neighbor>, Error> {
        self.range_search_with(query, radius, &SearchOptions::default(), ctx)
    }

    /// [`range_search`](Tree::range_search) with explicit [`SearchOptions`].
    ///
    /// # Errors
    ///
    /// See [`range_search`](Tree::range_search).
    pub fn range_search_with<'q, Q: Into<Query<'q>>>(
        &self,
        query: Q,
        radius: f64,
        options: &SearchOptions,
        ctx: &mut SearchContext,
    ) -> Result<Vec<Neighbor>, Error> {
        let view = self.validated_range_query(query.into(), radius, ctx)?;
        Ok(range::search(self, view, radius, options, ctx))
    }

    /// The number of points within `radius` of `query`, without
    /// materialising them. This is the correlation-sum kernel.
    ///
    /// # Errors
    ///
    /// See [`range_search`](Tree::range_search).
    pub fn count_range<'q, Q: Into<Query<'q>>>(
        &self,
        query: Q,
        radius: f64,
        ctx: &mut SearchContext,
    ) -> Result<usize, Error> {
        self.count_range_with(query, radius, &SearchOptions::default(), ctx)
    }

    /// [`count_range`](Tree::count_range) with explicit [`SearchOptions`].
    ///
    /// # Errors
    ///
    /// See [`range_search`](Tree::range_search).
    pub fn count_range_with<'q, Q: Into<Query<'q>>>(
        &self,
        query: Q,
        radius: f64,
        options: &SearchOptions,
        ctx: &mut SearchContext,
    ) -> Result<usize, Error> {
        let view = self.validated_range_query(query.into(), radius, ctx)?;
        Ok(range::count(self, view, radius, options, ctx))
    }

    /// Runs [`knn`](Tree::knn) for each column of a `(dim, q)` query matrix
    /// on the calling thread, reusing one internal context.
    ///
    /// # Errors
    ///
    /// See [`knn`](Tree::knn); the row count must match the point
    /// dimension.
    pub fn knn_batch(&self, queries: ArrayView2<'_, f64>, k: usize) -> Result<Vec<Vec<Neighbor>>, Error> {
        self.check_batch_dim(queries)?;
        let mut ctx = SearchContext::for_tree(self, k);
        queries
            .axis_iter(Axis(1))
            .map(|query| self.knn(query, k, &mut ctx))
            .collect()
    }

    /// Parallel [`knn_batch`](Tree::knn_batch): queries are distributed
    /// over the rayon pool, one private context per worker, against the
    /// shared immutable tree. Results keep query order and are identical to
    /// the sequential batch.
    ///
    /// # Errors
    ///
    /// See [`knn_batch`](Tree::knn_batch).
    pub fn par_knn_batch(&self, queries: ArrayView2<'_, f64>, k: usize) -> Result<Vec<Vec<Neighbor>>, Error>
    where
        P: Sync,
        M: Sync,
    {
        self.check_batch_dim(queries)?;
        queries
            .axis_iter(Axis(1))
            .into_par_iter()
            .map_init(
                || SearchContext::for_tree(self, k),
                |ctx, query| self.knn(query, k, ctx),
            )
            .collect()
    }

    /// Runs [`count_range`](Tree::count_range) for each column of a
    /// `(dim, q)` query matrix, reusing one internal context. Counting many
    /// balls at once is the correlation-sum estimate over a whole
    /// trajectory.
    ///
    /// # Errors
    ///
    /// See [`count_range`](Tree::count_range); the row count must match the
    /// point dimension.
    pub fn count_range_batch(&self, queries: ArrayView2<'_, f64>, radius: f64) -> Result<Vec<usize>, Error> {
        self.check_batch_dim(queries)?;
        let mut ctx = SearchContext::for_tree(self, 1);
        queries
            .axis_iter(Axis(1))
            .map(|query| self.count_range(query, radius, &mut ctx))
            .collect()
    }

    /// Parallel [`count_range_batch`](Tree::count_range_batch), one private
    /// context per rayon worker.
    ///
    /// # Errors
    ///
    /// See [`count_range_batch`](Tree::count_range_batch).
    pub fn par_count_range_batch(&self, queries: ArrayView2<'_, f64>, radius: f64) -> Result<Vec<usize>, Error>
    where
        P: Sync,
        M: Sync,
    {
        self.check_batch_dim(queries)?;
        queries
            .axis_iter(Axis(1))
            .into_par_iter()
            .map_init(
                || SearchContext::for_tree(self, 1),
                |ctx, query| self.count_range(query, radius, ctx),
            )
            .collect()
    }

    /// Validates a query against this tree and resolves it to a view.
    fn query_view<'t, 'q: 't>(&'t self, query: Query<'q>) -> Result<ArrayView1<'t, f64>, Error> {
        match query {
            Query::Point(view) => {
                if view.len() != self.points().dim() {
                    return Err(Error::InvalidArgument(format!(
                        "query has dimension {} but the point set has dimension {}",
                        view.len(),
                        self.points().dim()
                    )));
                }
                if !view.iter().all(|c| c.is_finite()) {
                    return Err(Error::InvalidArgument(
                        "query contains a non-finite coordinate".into(),
                    ));
                }
                Ok(view.reborrow())
            }
            Query::Index(index) => {
                if index >= self.points().len() {
                    return Err(Error::InvalidArgument(format!(
                        "query index {index} is out of bounds for {} points",
                        self.points().len()
                    )));
                }
                Ok(self.points().point(index))
            }
        }
    }

    /// Shared validation for the radius entry points.
    fn validated_range_query<'t, 'q: 't>(
        &'t self,
        query: Query<'q>,
        radius: f64,
        ctx: &SearchContext,
    ) -> Result<ArrayView1<'t, f64>, Error> {
        if !(radius >= 0.0 && radius.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "radius must be finite and non-negative, got {radius}"
            )));
        }
        ctx.ensure_queue_capacity(self.queue_capacity_requirement())?;
        self.query_view(query)
    }

    /// Checks the row count of a `(dim, q)` query matrix.
    fn check_batch_dim(&self, queries: ArrayView2<'_, f64>) -> Result<(), Error> {
        if queries.nrows() == self.points().dim() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "query matrix has {} rows but the point set has dimension {}",
                queries.nrows(),
                self.points().dim()
            )))
        }
    }
}
