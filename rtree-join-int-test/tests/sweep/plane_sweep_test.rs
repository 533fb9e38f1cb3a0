//! Partitioned plane sweep against the nested-loop join.

use rtree_join::{
    nested_loop_join, plane_sweep_join, Axis, Entry, Mbr, PlaneSweep, PlaneSweepConfig,
    SpatialError,
};
use rtree_join_int_test::data_gen::{clustered_rects, touching_tiles, uniform_rects};
use rtree_join_int_test::test_util::brute_force_pairs;
use std::collections::HashSet;

#[test]
fn test_result_independent_of_partition_count() {
    let a = uniform_rects(600, 500.0, 30.0, 61);
    let b = clustered_rects(500, 4, 62);
    let expected = brute_force_pairs(&a, &b);

    for axis in [Axis::Dim0, Axis::Dim1] {
        for partitions in (1..=40).chain([100, 1_000]) {
            let swept = plane_sweep_join(&a, &b, axis, partitions).unwrap();
            assert_eq!(swept, expected, "{:?} with {} partitions", axis, partitions);
        }
    }
}

#[test]
fn test_objects_on_stripe_boundaries() {
    // joint extent [0, 10] cut into 10 stripes, so every tile edge is a
    // stripe boundary
    let tiles = touching_tiles(10, 10);
    let expected = brute_force_pairs(&tiles, &tiles);

    for axis in [Axis::Dim0, Axis::Dim1] {
        for partitions in [1, 2, 5, 10, 20] {
            assert_eq!(
                plane_sweep_join(&tiles, &tiles, axis, partitions).unwrap(),
                expected,
                "{:?} with {} partitions",
                axis,
                partitions
            );
        }
    }
}

#[test]
fn test_wide_objects_reported_once() {
    let a = vec![Entry::new(1, Mbr::new(0.0, 100.0, 0.0, 1.0))];
    let b = Entry::from_rects((0..50).map(|i| {
        let x = i as f32 * 2.0;
        Mbr::new(x, x + 1.0, 0.5, 3.0)
    }));

    let pairs = PlaneSweep::new(PlaneSweepConfig::new(Axis::Dim0, 25).with_workers(4))
        .run(&a, &b)
        .unwrap();
    let unique: HashSet<_> = pairs.iter().copied().collect();
    assert_eq!(unique.len(), pairs.len());
    assert_eq!(unique, brute_force_pairs(&a, &b));
}

#[test]
fn test_pairs_are_oriented_a_then_b() {
    let a = vec![Entry::new(100, Mbr::new(0.0, 1.0, 0.0, 1.0))];
    let b = vec![Entry::new(200, Mbr::new(0.5, 2.0, 0.5, 2.0))];
    for axis in [Axis::Dim0, Axis::Dim1] {
        assert_eq!(
            plane_sweep_join(&a, &b, axis, 4).unwrap(),
            HashSet::from([(100, 200)])
        );
    }
}

#[test]
fn test_worker_count_does_not_change_result() {
    let a = uniform_rects(800, 300.0, 10.0, 71);
    let b = uniform_rects(800, 300.0, 10.0, 72);
    let expected: HashSet<_> = nested_loop_join(&a, &b);

    for workers in [0, 1, 2, 7, 32] {
        let pairs = PlaneSweep::new(PlaneSweepConfig::new(Axis::Dim1, 16).with_workers(workers))
            .run(&a, &b)
            .unwrap();
        assert_eq!(pairs.into_iter().collect::<HashSet<_>>(), expected);
    }
}

#[test]
fn test_empty_inputs() {
    let a = uniform_rects(10, 10.0, 1.0, 5);
    assert!(plane_sweep_join(&a, &[], Axis::Dim0, 4).unwrap().is_empty());
    assert!(plane_sweep_join(&[], &a, Axis::Dim1, 4).unwrap().is_empty());
}

#[test]
fn test_zero_partitions_rejected() {
    let a = uniform_rects(10, 10.0, 1.0, 5);
    assert!(matches!(
        plane_sweep_join(&a, &a, Axis::Dim0, 0),
        Err(SpatialError::Construction(_))
    ));
}
