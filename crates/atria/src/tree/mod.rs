//! The immutable partition tree and its construction entry point.

mod build;
mod cluster;

pub use cluster::{Cluster, ClusterId, ClusterKind};

use ndarray::ArrayView1;

use crate::{neighbors::Neighbor, points::PointSet, Error, Metric};

/// A binary partition tree over a borrowed point set.
///
/// Built once with [`Tree::build`] and immutable afterwards, so it can be
/// shared read-only across any number of query threads. Each query needs an
/// exclusive [`SearchContext`](crate::SearchContext) alongside the tree.
///
/// Every non-root point lives in the permutation table exactly once, paired
/// with its precomputed distance to its leaf's center; every other point is
/// the center of exactly one cluster. That assignment is what lets leaf
/// scans prune with the triangle inequality before computing anything, and
/// what makes duplicate results structurally impossible.
pub struct Tree<'d, P, M> {
    points: &'d P,
    metric: M,
    clusters: Vec<Cluster>,
    table: Vec<Neighbor>,
    leaf_capacity: usize,
    terminal_clusters: usize,
}

impl<'d, P: PointSet, M: Metric> Tree<'d, P, M> {
    /// Leaf capacity used by [`Tree::with_default_leaf_capacity`].
    pub const DEFAULT_LEAF_CAPACITY: usize = 64;

    /// Builds a tree over `points` with the given leaf capacity.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPointSet`] if `points` is empty.
    /// - [`Error::InvalidData`] if any coordinate is NaN or infinite.
    /// - [`Error::InvalidArgument`] if `leaf_capacity` is zero or the metric
    ///   does not satisfy the triangle inequality.
    pub fn build(points: &'d P, metric: M, leaf_capacity: usize) -> Result<Self, Error> {
        if leaf_capacity == 0 {
            return Err(Error::InvalidArgument(
                "leaf capacity must be at least 1".into(),
            ));
        }
        if !metric.obeys_triangle_inequality() {
            return Err(Error::InvalidArgument(
                "tree construction requires a metric that satisfies the triangle inequality".into(),
            ));
        }
        if points.is_empty() {
            return Err(Error::EmptyPointSet);
        }
        if let Some(index) = (0..points.len()).find(|&i| !points.point(i).iter().all(|c| c.is_finite())) {
            return Err(Error::InvalidData { index });
        }

        let built = build::build(points, &metric, leaf_capacity);
        let tree = Self {
            points,
            metric,
            clusters: built.clusters,
            table: built.table,
            leaf_capacity,
            terminal_clusters: built.terminal_clusters,
        };
        ftlog::info!(
            "built tree over {} points: {} clusters ({} terminal), root radius {:.6}",
            points.len(),
            tree.total_clusters(),
            tree.terminal_clusters(),
            tree.root().radius(),
        );
        Ok(tree)
    }

    /// Builds a tree with [`Tree::DEFAULT_LEAF_CAPACITY`].
    ///
    /// # Errors
    ///
    /// See [`Tree::build`].
    pub fn with_default_leaf_capacity(points: &'d P, metric: M) -> Result<Self, Error> {
        Self::build(points, metric, Self::DEFAULT_LEAF_CAPACITY)
    }

    /// The indexed points this tree was built over.
    #[must_use]
    pub const fn points(&self) -> &'d P {
        self.points
    }

    /// The metric the tree was built with. Queries must use the same one.
    #[must_use]
    pub const fn metric(&self) -> &M {
        &self.metric
    }

    /// The root cluster.
    #[must_use]
    pub fn root(&self) -> &Cluster {
        &self.clusters[ClusterId::ROOT.index()]
    }

    /// The cluster with the given id.
    #[must_use]
    pub fn cluster(&self, id: ClusterId) -> &Cluster {
        &self.clusters[id.index()]
    }

    /// Total number of clusters, terminal ones included.
    #[must_use]
    pub fn total_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Number of terminal clusters.
    #[must_use]
    pub const fn terminal_clusters(&self) -> usize {
        self.terminal_clusters
    }

    /// The leaf capacity the tree was built with.
    #[must_use]
    pub const fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// The permutation table: every non-center point paired with its
    /// distance to its leaf's center, grouped by leaf section.
    #[must_use]
    pub fn permutation_table(&self) -> &[Neighbor] {
        &self.table
    }

    /// The permutation-table section owned by a terminal cluster; empty for
    /// a branch.
    #[must_use]
    pub fn leaf_members(&self, cluster: &Cluster) -> &[Neighbor] {
        match *cluster.kind() {
            ClusterKind::Leaf { start, len } => &self.table[start..start + len],
            ClusterKind::Branch { .. } => &[],
        }
    }

    /// Smallest queue capacity a context must pre-allocate for this tree.
    /// Each cluster enters the traversal frontier at most once.
    pub(crate) fn queue_capacity_requirement(&self) -> usize {
        2 * self.clusters.len() + 1
    }

    /// Distance from an arbitrary query view to an indexed point.
    pub(crate) fn distance_to(&self, query: ArrayView1<'_, f64>, index: usize) -> f64 {
        self.metric.distance(query, self.points.point(index))
    }

    /// Capped distance from an arbitrary query view to an indexed point.
    pub(crate) fn distance_to_capped(&self, query: ArrayView1<'_, f64>, index: usize, cap: f64) -> f64 {
        self.metric.distance_capped(query, self.points.point(index), cap)
    }
}
