//! Nearest-neighbor search for data whose intrinsic dimension is far below
//! its embedding dimension, the regime of delay-embedded chaotic series.
//!
//! The engine is a binary cluster tree built by recursive center-based
//! partitioning. Each cluster caches the distances that construction
//! already paid for (every point's distance to its leaf's center, plus a
//! per-split sibling gap) and the searches spend them on triangle
//! inequality pruning. Queries run best-first (k-nearest) or depth-first
//! (radius, correlation counts) over a caller-owned [`SearchContext`] whose
//! buffers are allocated once, so a context reused across queries keeps the
//! hot path allocation-free.
//!
//! ```
//! use atria::{DensePoints, Euclidean, SearchContext, Tree};
//!
//! let points = DensePoints::from_points(&[vec![0.0], vec![1.0]])?;
//! let tree = Tree::with_default_leaf_capacity(&points, Euclidean)?;
//! let mut ctx = SearchContext::for_tree(&tree, 1);
//!
//! let hits = tree.knn([0.25].as_slice(), 1, &mut ctx)?;
//! assert_eq!(hits[0].index, 0);
//! assert!((hits[0].distance - 0.25).abs() < 1e-12);
//! # Ok::<(), atria::Error>(())
//! ```
//!
//! The tree is immutable after construction and freely shareable across
//! threads; parallel batches hand each rayon worker its own context.

mod error;
mod metric;
mod neighbors;
mod points;
mod search;
mod tree;

pub use error::Error;
pub use metric::{Chebyshev, Euclidean, ExpWeightedEuclidean, Metric, SquaredEuclidean};
pub use neighbors::{Neighbor, NeighborHeap};
pub use points::{DensePoints, PointSet, TimeDelayEmbedding};
pub use search::{Query, SearchContext, SearchOptions};
pub use tree::{Cluster, ClusterId, ClusterKind, Tree};
