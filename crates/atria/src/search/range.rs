//! Depth-first traversal for radius queries and correlation counts.

use ndarray::ArrayView1;

use crate::{
    neighbors::Neighbor,
    points::PointSet,
    search::{context::SearchItem, SearchContext, SearchOptions},
    tree::{ClusterKind, Tree},
    Metric,
};

/// Collects every point within `radius` of the query.
pub(crate) fn search<P: PointSet, M: Metric>(
    tree: &Tree<'_, P, M>,
    query: ArrayView1<'_, f64>,
    radius: f64,
    options: &SearchOptions,
    ctx: &mut SearchContext,
) -> Vec<Neighbor> {
    let mut hits = Vec::new();
    traverse(tree, query, radius, options, ctx, |index, distance| {
        hits.push(Neighbor::new(index, distance));
    });
    hits
}

/// Counts the points within `radius` of the query without materialising
/// them.
pub(crate) fn count<P: PointSet, M: Metric>(
    tree: &Tree<'_, P, M>,
    query: ArrayView1<'_, f64>,
    radius: f64,
    options: &SearchOptions,
    ctx: &mut SearchContext,
) -> usize {
    let mut hits = 0;
    traverse(tree, query, radius, options, ctx, |_, _| hits += 1);
    hits
}

/// The shared depth-first skeleton.
///
/// The fixed radius makes traversal order irrelevant, so a plain stack
/// replaces the best-first queue: a cluster is explored iff its proved
/// lower bound does not exceed the radius.
fn traverse<P: PointSet, M: Metric, F: FnMut(usize, f64)>(
    tree: &Tree<'_, P, M>,
    query: ArrayView1<'_, f64>,
    radius: f64,
    options: &SearchOptions,
    ctx: &mut SearchContext,
    mut collect: F,
) {
    ctx.stack.clear();
    let d_root = tree.distance_to(query, tree.root().center());
    let root_item = SearchItem::root(d_root, tree.root().radius());
    if root_item.d_min <= radius {
        ctx.stack.push(root_item);
    }

    while let Some(item) = ctx.stack.pop() {
        let cluster = tree.cluster(item.cluster);
        if item.d_center <= radius && !options.excludes(cluster.center()) {
            collect(cluster.center(), item.d_center);
        }
        match *cluster.kind() {
            ClusterKind::Leaf { .. } => {
                let section = tree.leaf_members(cluster);
                if cluster.is_singleton() {
                    if item.d_center <= radius {
                        for entry in section {
                            if !options.excludes(entry.index) {
                                collect(entry.index, item.d_center);
                            }
                        }
                    }
                    continue;
                }
                for entry in section {
                    if options.excludes(entry.index) {
                        continue;
                    }
                    if (item.d_center - entry.distance).abs() > radius {
                        continue;
                    }
                    let d = tree.distance_to_capped(query, entry.index, radius);
                    if d <= radius {
                        collect(entry.index, d);
                    }
                }
            }
            ClusterKind::Branch { left, right } => {
                let left_cluster = tree.cluster(left);
                let right_cluster = tree.cluster(right);
                let d_left = tree.distance_to(query, left_cluster.center());
                let d_right = tree.distance_to(query, right_cluster.center());
                let left_item = SearchItem::child(&item, left, left_cluster, d_left, d_right);
                if left_item.d_min <= radius {
                    ctx.stack.push(left_item);
                }
                let right_item = SearchItem::child(&item, right, right_cluster, d_right, d_left);
                if right_item.d_min <= radius {
                    ctx.stack.push(right_item);
                }
            }
        }
    }
}
