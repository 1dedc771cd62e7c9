//! Best-first k-nearest-neighbor traversal.

use ndarray::ArrayView1;

use crate::{
    neighbors::{Neighbor, NeighborHeap},
    points::PointSet,
    search::{context::SearchItem, SearchContext, SearchOptions},
    tree::{ClusterKind, Tree},
    Metric,
};

/// Runs one k-nearest query over a validated query view.
///
/// The frontier queue pops clusters in ascending `d_min` order; the moment
/// the best remaining lower bound cannot beat the current `k`-th distance
/// (scaled by the approximation slack), no cluster left in the queue can
/// either, and the traversal stops.
pub(crate) fn search<P: PointSet, M: Metric>(
    tree: &Tree<'_, P, M>,
    query: ArrayView1<'_, f64>,
    k: usize,
    options: &SearchOptions,
    ctx: &mut SearchContext,
) -> Vec<Neighbor> {
    ctx.neighbors.reset(k);
    ctx.queue.clear();
    let slack = 1.0 + options.epsilon;

    let d_root = tree.distance_to(query, tree.root().center());
    ctx.queue.push(SearchItem::root(d_root, tree.root().radius()));

    while let Some(item) = ctx.queue.pop() {
        if ctx.neighbors.threshold() < slack * item.d_min {
            break;
        }
        let cluster = tree.cluster(item.cluster);
        if item.d_center < ctx.neighbors.threshold() && !options.excludes(cluster.center()) {
            ctx.neighbors.try_insert(Neighbor::new(cluster.center(), item.d_center));
        }
        match *cluster.kind() {
            ClusterKind::Leaf { .. } => {
                scan_leaf(tree, query, &item, options, &mut ctx.neighbors);
            }
            ClusterKind::Branch { left, right } => {
                let left_cluster = tree.cluster(left);
                let right_cluster = tree.cluster(right);
                let d_left = tree.distance_to(query, left_cluster.center());
                let d_right = tree.distance_to(query, right_cluster.center());
                ctx.queue
                    .push(SearchItem::child(&item, left, left_cluster, d_left, d_right));
                ctx.queue
                    .push(SearchItem::child(&item, right, right_cluster, d_right, d_left));
            }
        }
    }

    ctx.neighbors.drain_sorted()
}

/// Scans a terminal cluster's permutation-table section into the heap.
fn scan_leaf<P: PointSet, M: Metric>(
    tree: &Tree<'_, P, M>,
    query: ArrayView1<'_, f64>,
    item: &SearchItem,
    options: &SearchOptions,
    neighbors: &mut NeighborHeap,
) {
    let cluster = tree.cluster(item.cluster);
    let section = tree.leaf_members(cluster);
    if cluster.is_singleton() {
        // Every member coincides with the center, so every member sits at
        // the already-known center distance.
        for entry in section {
            if options.excludes(entry.index) {
                continue;
            }
            if item.d_center < neighbors.threshold() {
                neighbors.try_insert(Neighbor::new(entry.index, item.d_center));
            }
        }
        return;
    }
    for entry in section {
        if options.excludes(entry.index) {
            continue;
        }
        // The stored center distance gives a free lower bound; only points
        // that could still beat the k-th best pay for a real distance.
        let cap = neighbors.threshold();
        if cap <= (item.d_center - entry.distance).abs() {
            continue;
        }
        let d = tree.distance_to_capped(query, entry.index, cap);
        if d < cap {
            neighbors.try_insert(Neighbor::new(entry.index, d));
        }
    }
}
