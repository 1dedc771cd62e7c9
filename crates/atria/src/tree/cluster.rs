//! Cluster nodes of the binary partition tree.

/// Identifier of a cluster within its tree's arena.
///
/// The root is always id 0. Ids are only meaningful for the tree that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterId(pub(crate) usize);

impl ClusterId {
    /// The root cluster's id.
    pub const ROOT: Self = Self(0);

    /// The arena slot this id refers to.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One node of the partition tree.
///
/// Every cluster is represented by a `center` point and covers a ball of
/// radius `r_max` around it. A branch owns two child clusters whose point
/// sets partition its own (minus the center); a leaf owns a contiguous
/// section of the tree's permutation table instead.
#[derive(Debug)]
pub struct Cluster {
    /// Index of the representative point.
    pub(crate) center: usize,
    /// Maximum distance from the center to any non-center member,
    /// descendants included.
    pub(crate) r_max: f64,
    /// Minimum over the members of `|d(p, own center) - d(p, sibling
    /// center)|`, fixed when this cluster and its sibling were split off.
    /// Zero for the root and for leaves.
    pub(crate) g_min: f64,
    /// Branch or leaf payload.
    pub(crate) kind: ClusterKind,
}

/// The two shapes a cluster can take.
#[derive(Debug)]
pub enum ClusterKind {
    /// An internal cluster owning two children.
    Branch {
        /// Child covering the members closer to its own center.
        left: ClusterId,
        /// Child centered on the point farthest from the parent center.
        right: ClusterId,
    },
    /// A terminal cluster whose non-center members occupy
    /// `[start, start + len)` of the permutation table.
    Leaf {
        /// First permutation-table slot of this leaf's section.
        start: usize,
        /// Number of non-center members.
        len: usize,
    },
}

impl Cluster {
    /// Index of the representative point.
    #[must_use]
    pub const fn center(&self) -> usize {
        self.center
    }

    /// Maximum distance from the center to any non-center member.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.r_max
    }

    /// Lower bound on the gap between member distances to this cluster's
    /// center and to its sibling's center.
    #[must_use]
    pub const fn sibling_gap(&self) -> f64 {
        self.g_min
    }

    /// Branch or leaf payload.
    #[must_use]
    pub const fn kind(&self) -> &ClusterKind {
        &self.kind
    }

    /// Whether this cluster is terminal.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, ClusterKind::Leaf { .. })
    }

    /// Whether every member coincides with the center.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.r_max == 0.0
    }
}
