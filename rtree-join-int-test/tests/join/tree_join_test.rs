//! Tree joins against a brute-force oracle.

use rtree_join::{
    build_index, join, Entry, JoinConfig, JoinStrategy, Mbr, TreeJoin,
};
use rtree_join_int_test::data_gen::{clustered_rects, grid_points, touching_tiles, uniform_rects};
use rtree_join_int_test::test_util::{brute_force_pairs, build_pair, join_all_strategies};
use std::collections::HashSet;

#[test]
fn test_worked_example() {
    let a = Entry::from_rects(vec![Mbr::new(0.0, 2.0, 0.0, 2.0)]);
    let b = Entry::from_rects(vec![
        Mbr::new(2.0, 4.0, 0.0, 2.0),
        Mbr::new(3.0, 5.0, 0.0, 2.0),
    ]);
    let (tree_a, tree_b) = build_pair(&a, &b, 16, 1.0).unwrap();

    for strategy in JoinStrategy::ALL {
        assert_eq!(join(&tree_a, &tree_b, strategy), HashSet::from([(0, 0)]));
    }
}

#[test]
fn test_joins_match_brute_force() {
    let a = uniform_rects(500, 400.0, 15.0, 1);
    let b = uniform_rects(480, 400.0, 15.0, 2);
    let expected = brute_force_pairs(&a, &b);
    assert!(!expected.is_empty());

    let (tree_a, tree_b) = build_pair(&a, &b, 8, 1.0).unwrap();
    for (strategy, pairs) in join_all_strategies(&tree_a, &tree_b, &JoinConfig::with_workers(4)) {
        assert_eq!(pairs, expected, "{} differs from brute force", strategy);
    }
}

#[test]
fn test_touching_tiles_are_joined() {
    // 10 x 10 unit tiles against themselves: every tile meets itself and
    // its eight neighbours along edges or corners.
    let tiles = touching_tiles(10, 10);
    let (tree_a, tree_b) = build_pair(&tiles, &tiles, 4, 1.0).unwrap();
    let expected = brute_force_pairs(&tiles, &tiles);
    assert_eq!(expected.len(), 100 + 2 * (2 * 90) + 4 * 81);

    for strategy in JoinStrategy::ALL {
        assert_eq!(join(&tree_a, &tree_b, strategy), expected, "{}", strategy);
    }
}

#[test]
fn test_coincident_points_join() {
    let a = grid_points(300, 6, 31);
    let b = grid_points(250, 6, 32);
    let expected = brute_force_pairs(&a, &b);
    let (tree_a, tree_b) = build_pair(&a, &b, 5, 1.0).unwrap();

    for strategy in JoinStrategy::ALL {
        assert_eq!(join(&tree_a, &tree_b, strategy), expected, "{}", strategy);
    }
}

#[test]
fn test_disjoint_inputs_produce_nothing() {
    let a = uniform_rects(200, 100.0, 5.0, 3);
    let b: Vec<Entry> = uniform_rects(200, 100.0, 5.0, 4)
        .into_iter()
        .map(|e| {
            let m = e.mbr;
            Entry::new(e.id, Mbr::new(m.low0 + 500.0, m.high0 + 500.0, m.low1, m.high1))
        })
        .collect();
    let (tree_a, tree_b) = build_pair(&a, &b, 16, 1.0).unwrap();

    for strategy in JoinStrategy::ALL {
        assert!(join(&tree_a, &tree_b, strategy).is_empty());
    }
}

#[test]
fn test_trees_of_different_heights() {
    let a = clustered_rects(2_000, 4, 8);
    let b = vec![Entry::new(77, Mbr::new(0.0, 1000.0, 0.0, 1000.0))];
    let tree_a = build_index(a.clone(), 4, 1.0).unwrap();
    let tree_b = build_index(b.clone(), 4, 1.0).unwrap();
    assert!(tree_a.height() > tree_b.height());

    let expected = brute_force_pairs(&a, &b);
    for strategy in JoinStrategy::ALL {
        assert_eq!(join(&tree_a, &tree_b, strategy), expected, "{}", strategy);
        let swapped: HashSet<_> = join(&tree_b, &tree_a, strategy)
            .into_iter()
            .map(|(x, y)| (y, x))
            .collect();
        assert_eq!(swapped, expected, "{} swapped", strategy);
    }
}

#[test]
fn test_pairs_are_never_repeated() {
    let a = clustered_rects(800, 3, 12);
    let b = clustered_rects(800, 3, 13);
    let (tree_a, tree_b) = build_pair(&a, &b, 6, 1.0).unwrap();

    for strategy in JoinStrategy::ALL {
        let outcome = TreeJoin::new(&tree_a, &tree_b)
            .with_config(JoinConfig::with_workers(3))
            .run(strategy);
        let unique: HashSet<_> = outcome.pairs.iter().copied().collect();
        assert_eq!(unique.len(), outcome.pairs.len(), "{}", strategy);
    }
}

#[test]
fn test_hybrid_dispatch_keeps_results() {
    let a = uniform_rects(3_000, 1000.0, 10.0, 55);
    let b = uniform_rects(3_000, 1000.0, 10.0, 56);
    let (tree_a, tree_b) = build_pair(&a, &b, 4, 1.0).unwrap();
    let expected = brute_force_pairs(&a, &b);

    let outcome = TreeJoin::new(&tree_a, &tree_b)
        .with_config(JoinConfig::with_workers(4).with_hybrid_threshold(2))
        .run(JoinStrategy::Hybrid);
    assert!(outcome.dispatched_tasks >= 2);
    assert_eq!(outcome.into_set(), expected);
}
