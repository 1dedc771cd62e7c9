//! Error taxonomy for tree construction and queries.

/// Errors reported by the public entry points of this crate.
///
/// Tree construction and queries either succeed wholly or fail at the entry
/// point with one of these kinds; once inputs are validated, the traversal
/// and distance kernels are infallible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A caller-supplied argument is out of range or inconsistent with the
    /// point set, e.g. `k = 0`, a negative radius, a zero leaf capacity, or
    /// a query vector whose dimension does not match the indexed points.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The point set contains a non-finite coordinate. The offending point
    /// index is reported.
    #[error("point {index} contains a non-finite coordinate")]
    InvalidData {
        /// Index of the first point with a NaN or infinite coordinate.
        index: usize,
    },

    /// A tree cannot be built over zero points.
    #[error("cannot build a search tree over an empty point set")]
    EmptyPointSet,

    /// A reused [`SearchContext`](crate::SearchContext) was created for a
    /// smaller tree and its pre-allocated queue cannot hold the traversal
    /// frontier of this one.
    #[error("search context queue holds {available} items but the tree requires {required}")]
    CapacityExceeded {
        /// Queue capacity this tree requires.
        required: usize,
        /// Queue capacity the context was created with.
        available: usize,
    },
}
