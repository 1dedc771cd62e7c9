//! Radius queries and correlation counts against the exhaustive reference.

mod common;

use atria::{
    DensePoints, Error, Euclidean, PointSet, Query, SearchContext, SearchOptions,
    TimeDelayEmbedding, Tree,
};
use ndarray::ArrayView1;
use test_case::test_case;

#[test_case(500, 5, 42; "500x5")]
#[test_case(1_500, 3, 8; "1_500x3")]
fn counts_match_the_exhaustive_scan_exactly(car: usize, dim: usize, seed: u64) {
    let data = common::data_gen::tabular(car, dim, -1.0, 1.0, seed);
    let points = DensePoints::from_points(&data).unwrap();
    let tree = Tree::build(&points, Euclidean, 16).unwrap();
    let mut ctx = SearchContext::for_tree(&tree, 1);

    for (qi, query) in common::data_gen::tabular(10, dim, -1.0, 1.0, seed + 1).iter().enumerate() {
        for radius in [0.1, 0.5, 1.0, 2.0] {
            let expected = common::exhaustive::range(
                &points,
                &Euclidean,
                ArrayView1::from(query.as_slice()),
                radius,
                None,
            );
            let count = tree.count_range(query.as_slice(), radius, &mut ctx).unwrap();
            assert_eq!(
                count,
                expected.len(),
                "query {qi}: count mismatch at radius {radius}"
            );
        }
    }
}

#[test_case(800, 4, 19; "800x4")]
fn range_hits_equal_the_exhaustive_set(car: usize, dim: usize, seed: u64) {
    let data = common::data_gen::tabular(car, dim, -1.0, 1.0, seed);
    let points = DensePoints::from_points(&data).unwrap();
    let tree = Tree::build(&points, Euclidean, 8).unwrap();
    let mut ctx = SearchContext::for_tree(&tree, 1);

    for (qi, query) in common::data_gen::tabular(8, dim, -1.0, 1.0, seed + 1).iter().enumerate() {
        for radius in [0.3, 0.8, 1.5] {
            let expected = common::sort_hits(common::exhaustive::range(
                &points,
                &Euclidean,
                ArrayView1::from(query.as_slice()),
                radius,
                None,
            ));
            let actual = common::sort_hits(tree.range_search(query.as_slice(), radius, &mut ctx).unwrap());
            common::check_hits(&expected, &actual, &format!("query {qi}, radius {radius}"));
            common::assert_no_duplicates(&actual, &format!("query {qi}, radius {radius}"));

            let count = tree.count_range(query.as_slice(), radius, &mut ctx).unwrap();
            assert_eq!(count, actual.len(), "count disagrees with the hit list");
        }
    }
}

#[test]
fn zero_radius_finds_exact_matches_only() {
    let data = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0], vec![2.0, 2.0]];
    let points = DensePoints::from_points(&data).unwrap();
    let tree = Tree::build(&points, Euclidean, 2).unwrap();
    let mut ctx = SearchContext::for_tree(&tree, 1);

    let hits = common::sort_hits(tree.range_search([0.0, 0.0].as_slice(), 0.0, &mut ctx).unwrap());
    let indices: Vec<usize> = hits.iter().map(|n| n.index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert!(hits.iter().all(|n| n.distance == 0.0));
    assert_eq!(tree.count_range([0.0, 0.0].as_slice(), 0.0, &mut ctx).unwrap(), 2);
}

#[test]
fn exclusion_window_applies_to_range_queries() {
    let data = common::data_gen::tabular(300, 2, -1.0, 1.0, 23);
    let points = DensePoints::from_points(&data).unwrap();
    let tree = Tree::build(&points, Euclidean, 8).unwrap();
    let mut ctx = SearchContext::for_tree(&tree, 1);

    let index = 120;
    let exclude = (110, 130);
    let options = SearchOptions::default().excluding(exclude.0, exclude.1);
    let radius = 0.4;

    let expected = common::sort_hits(common::exhaustive::range(
        &points,
        &Euclidean,
        points.point(index),
        radius,
        Some(exclude),
    ));
    let actual = common::sort_hits(
        tree.range_search_with(Query::Index(index), radius, &options, &mut ctx)
            .unwrap(),
    );
    common::check_hits(&expected, &actual, "excluded range query");
    let count = tree
        .count_range_with(Query::Index(index), radius, &options, &mut ctx)
        .unwrap();
    assert_eq!(count, actual.len());
}

#[test]
fn embedded_series_counts_match_the_exhaustive_scan() {
    // The correlation-sum workload: count pairs closer than r over a
    // delay-embedded chaotic series.
    let series = common::data_gen::logistic_series(1_500, 0.42);
    let embedded = TimeDelayEmbedding::new(&series, 4, 2).unwrap();
    let tree = Tree::build(&embedded, Euclidean, 32).unwrap();
    let mut ctx = SearchContext::for_tree(&tree, 1);

    for index in [5, 400, 1_200] {
        for radius in [0.05, 0.2, 0.6] {
            let expected = common::exhaustive::range(&embedded, &Euclidean, embedded.point(index), radius, None);
            let count = tree.count_range(Query::Index(index), radius, &mut ctx).unwrap();
            assert_eq!(count, expected.len(), "index {index}, radius {radius}");
        }
    }
}

#[test]
fn batched_counts_agree_with_single_counts() {
    let data = common::data_gen::tabular(700, 3, -1.0, 1.0, 47);
    let points = DensePoints::from_points(&data).unwrap();
    let tree = Tree::build(&points, Euclidean, 16).unwrap();
    let radius = 0.5;

    let query_rows = common::data_gen::tabular(15, 3, -1.0, 1.0, 48);
    let mut flat = Vec::new();
    for row in &query_rows {
        flat.extend_from_slice(row);
    }
    let queries = ndarray::Array2::from_shape_vec((15, 3), flat).unwrap().reversed_axes();

    let sequential = tree.count_range_batch(queries.view(), radius).unwrap();
    let parallel = tree.par_count_range_batch(queries.view(), radius).unwrap();
    assert_eq!(sequential, parallel);

    let mut ctx = SearchContext::for_tree(&tree, 1);
    for (row, &count) in query_rows.iter().zip(&sequential) {
        assert_eq!(tree.count_range(row.as_slice(), radius, &mut ctx).unwrap(), count);
    }
}

#[test]
fn identical_points_all_fall_inside_any_ball() {
    let data = vec![vec![3.0, 4.0]; 12];
    let points = DensePoints::from_points(&data).unwrap();
    let tree = Tree::with_default_leaf_capacity(&points, Euclidean).unwrap();
    let mut ctx = SearchContext::for_tree(&tree, 1);
    assert_eq!(tree.count_range([3.0, 4.0].as_slice(), 0.0, &mut ctx).unwrap(), 12);
    assert_eq!(tree.count_range([0.0, 0.0].as_slice(), 4.9, &mut ctx).unwrap(), 0);
    assert_eq!(tree.count_range([0.0, 0.0].as_slice(), 5.0, &mut ctx).unwrap(), 12);
}

#[test]
fn invalid_radius_is_rejected() {
    let points = DensePoints::from_points(&[vec![0.0], vec![1.0]]).unwrap();
    let tree = Tree::with_default_leaf_capacity(&points, Euclidean).unwrap();
    let mut ctx = SearchContext::for_tree(&tree, 1);
    assert!(matches!(
        tree.range_search([0.0].as_slice(), -1.0, &mut ctx),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        tree.count_range([0.0].as_slice(), f64::NAN, &mut ctx),
        Err(Error::InvalidArgument(_))
    ));
}
