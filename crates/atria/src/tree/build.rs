//! Iterative construction of the partition tree.
//!
//! The builder maintains one working array fusing the point permutation with
//! each point's distance to its enclosing cluster's center, and an explicit
//! stack of pending sections, so construction never recurses and each split
//! computes at most one fresh distance per point.

use crate::{
    neighbors::Neighbor,
    points::PointSet,
    tree::cluster::{Cluster, ClusterId, ClusterKind},
    Metric,
};

/// A pending section of the working array, owned by the cluster that has
/// already been given its center and radius but not yet its payload.
struct Frame {
    cluster: ClusterId,
    start: usize,
    end: usize,
}

/// Output of a finished build: the cluster arena, the permutation table,
/// and the number of terminal clusters.
pub(crate) struct Built {
    pub clusters: Vec<Cluster>,
    pub table: Vec<Neighbor>,
    pub terminal_clusters: usize,
}

/// Builds the cluster arena over `points`, which must be non-empty and
/// fully finite (validated by the caller).
pub(crate) fn build<P: PointSet, M: Metric>(points: &P, metric: &M, leaf_capacity: usize) -> Built {
    let n = points.len();
    let dist = |i: usize, j: usize| metric.distance(points.point(i), points.point(j));

    // The first point anchors the root; determinism keeps repeated builds
    // over the same data identical.
    let root_center = 0;
    let table: Vec<Neighbor> = (1..n)
        .map(|i| Neighbor::new(i, dist(i, root_center)))
        .collect();
    let r_max = table.iter().map(|nb| nb.distance).fold(0.0, f64::max);

    let mut builder = Builder {
        clusters: vec![Cluster {
            center: root_center,
            r_max,
            g_min: 0.0,
            kind: ClusterKind::Leaf { start: 0, len: 0 },
        }],
        table,
        terminal_clusters: 0,
        leaf_capacity,
    };

    let mut stack = vec![Frame {
        cluster: ClusterId::ROOT,
        start: 0,
        end: n - 1,
    }];
    while let Some(frame) = stack.pop() {
        builder.split(frame, &mut stack, &dist);
    }

    Built {
        clusters: builder.clusters,
        table: builder.table,
        terminal_clusters: builder.terminal_clusters,
    }
}

struct Builder {
    clusters: Vec<Cluster>,
    table: Vec<Neighbor>,
    terminal_clusters: usize,
    leaf_capacity: usize,
}

impl Builder {
    /// Processes one pending section: seals it as a leaf, or partitions it
    /// around two new child centers and pushes the child sections.
    fn split<D: Fn(usize, usize) -> f64>(&mut self, frame: Frame, stack: &mut Vec<Frame>, dist: &D) {
        let Frame { cluster, start, end } = frame;
        let (center, r_max) = {
            let c = &self.clusters[cluster.index()];
            (c.center, c.r_max)
        };

        if end - start <= self.leaf_capacity || r_max == 0.0 {
            self.seal_leaf(cluster, start, end);
            return;
        }

        // The right pole is the section point farthest from the current
        // center; its distance is already cached.
        let far = self.argmax(start, end);
        self.table.swap(far, end - 1);
        let right_center = self.table[end - 1].index;

        // Re-aim every cached distance at the right pole. The left pole is
        // the point farthest from it, i.e. the diameter of the section.
        let mut best = start;
        let mut span = -1.0;
        for j in start..end - 1 {
            let d = dist(self.table[j].index, right_center);
            self.table[j].distance = d;
            if d > span {
                span = d;
                best = j;
            }
        }
        if span == 0.0 {
            // Every remaining point coincides with the right pole; there is
            // nothing to separate.
            self.restore_and_seal(cluster, center, start, end, dist);
            return;
        }
        self.table.swap(best, start);
        let left_center = self.table[start].index;

        // One pass over the open section: one fresh distance per point,
        // assignment to the nearer pole, and the sibling gap as we go.
        // Invariant: [start+1, mid) is assigned left, [mid, j) right.
        let mut mid = start + 1;
        let mut g_min = f64::INFINITY;
        for j in start + 1..end - 1 {
            let d_right = self.table[j].distance;
            let d_left = dist(self.table[j].index, left_center);
            let gap = (d_left - d_right).abs();
            if gap < g_min {
                g_min = gap;
            }
            if d_left < d_right {
                self.table[j].distance = d_left;
                self.table.swap(j, mid);
                mid += 1;
            }
        }

        if mid == start + 1 || mid == end - 1 {
            // A one-sided partition would leave an empty child.
            self.restore_and_seal(cluster, center, start, end, dist);
            return;
        }

        let left_r = self.max_distance(start + 1, mid);
        let right_r = self.max_distance(mid, end - 1);
        ftlog::debug!(
            "split section of {} into {} + {} (radii {left_r:.6} / {right_r:.6}, gap {g_min:.6})",
            end - start,
            mid - start - 1,
            end - 1 - mid,
        );

        let left = ClusterId(self.clusters.len());
        self.clusters.push(Cluster {
            center: left_center,
            r_max: left_r,
            g_min,
            kind: ClusterKind::Leaf { start: 0, len: 0 },
        });
        let right = ClusterId(self.clusters.len());
        self.clusters.push(Cluster {
            center: right_center,
            r_max: right_r,
            g_min,
            kind: ClusterKind::Leaf { start: 0, len: 0 },
        });
        self.clusters[cluster.index()].kind = ClusterKind::Branch { left, right };

        stack.push(Frame {
            cluster: right,
            start: mid,
            end: end - 1,
        });
        stack.push(Frame {
            cluster: left,
            start: start + 1,
            end: mid,
        });
    }

    /// Marks `cluster` terminal over `[start, end)`.
    fn seal_leaf(&mut self, cluster: ClusterId, start: usize, end: usize) {
        let c = &mut self.clusters[cluster.index()];
        c.kind = ClusterKind::Leaf {
            start,
            len: end - start,
        };
        c.g_min = 0.0;
        self.terminal_clusters += 1;
    }

    /// Re-aims the section's cached distances back at `center` after an
    /// abandoned split, then seals the leaf. Only degenerate sections pay
    /// for the recomputation.
    fn restore_and_seal<D: Fn(usize, usize) -> f64>(
        &mut self,
        cluster: ClusterId,
        center: usize,
        start: usize,
        end: usize,
        dist: &D,
    ) {
        for j in start..end {
            self.table[j].distance = dist(self.table[j].index, center);
        }
        self.seal_leaf(cluster, start, end);
    }

    /// Position of the largest cached distance in `[start, end)`.
    fn argmax(&self, start: usize, end: usize) -> usize {
        let mut best = start;
        for j in start + 1..end {
            if self.table[j].distance > self.table[best].distance {
                best = j;
            }
        }
        best
    }

    /// Largest cached distance in `[start, end)`, zero for an empty range.
    fn max_distance(&self, start: usize, end: usize) -> f64 {
        self.table[start..end]
            .iter()
            .map(|nb| nb.distance)
            .fold(0.0, f64::max)
    }
}
