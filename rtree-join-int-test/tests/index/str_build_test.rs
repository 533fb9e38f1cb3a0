use rtree_join::{build_index, Entry, IndexConfig, Mbr, SpatialError, StrLoader};
use rtree_join_int_test::data_gen::{clustered_rects, grid_points, uniform_rects};
use std::collections::HashSet;

#[test]
fn test_every_object_lands_in_exactly_one_leaf() {
    let entries = uniform_rects(2_000, 1000.0, 8.0, 7);
    let tree = build_index(entries.clone(), 16, 1.0).unwrap();

    let ids: Vec<u32> = tree.leaf_entries().map(|e| e.id).collect();
    assert_eq!(ids.len(), entries.len());
    let unique: HashSet<u32> = ids.into_iter().collect();
    assert_eq!(unique.len(), entries.len());
}

#[test]
fn test_built_trees_are_level_ordered_and_sound() {
    for (max_entries, fill_factor) in [(4, 1.0), (16, 1.0), (16, 0.5), (10, 0.7), (64, 1.0)] {
        let tree = build_index(clustered_rects(1_500, 6, 11), max_entries, fill_factor).unwrap();

        assert_eq!(tree.root_id(), 0);
        assert!(tree.is_level_ordered());
        let report = tree.check_integrity();
        assert!(report.is_valid, "{:?}", report.errors);
        assert_eq!(report.nodes_checked, tree.node_count());
        assert!(tree.check_bounds().is_ok());
    }
}

#[test]
fn test_node_bounds_cover_their_entries() {
    let tree = build_index(uniform_rects(700, 200.0, 20.0, 3), 8, 1.0).unwrap();
    for node in tree.nodes() {
        assert!(node.len() <= 8);
        assert_eq!(node.mbr, node.compute_mbr());
        for child in node.children() {
            assert!(child.child > node.id);
            assert_eq!(child.mbr, tree.node(child.child).mbr);
        }
    }
}

#[test]
fn test_fill_factor_limits_node_size() {
    let tree = build_index(uniform_rects(1_000, 500.0, 5.0, 5), 16, 0.5).unwrap();
    assert!(tree.nodes().iter().all(|n| n.len() <= 8));
    // 1000 / 8 leaves
    assert_eq!(tree.stats().leaves, 125);
}

#[test]
fn test_single_object_tree() {
    let tree = build_index(vec![Entry::new(9, Mbr::new(1.0, 2.0, 3.0, 4.0))], 16, 1.0).unwrap();
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.mbr(), Mbr::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(tree.leaf_entries().next().map(|e| e.id), Some(9));
}

#[test]
fn test_coincident_points_build() {
    let tree = build_index(grid_points(3_000, 4, 21), 16, 1.0).unwrap();
    assert_eq!(tree.len(), 3_000);
    assert_eq!(tree.mbr(), Mbr::new(0.0, 3.0, 0.0, 3.0));
}

#[test]
fn test_parallel_loader_matches_sequential() {
    let entries = clustered_rects(5_000, 9, 42);
    let config = IndexConfig::new(16, 1.0);
    let sequential = StrLoader::new(config.clone())
        .with_workers(1)
        .load(entries.clone())
        .unwrap();
    let parallel = StrLoader::new(config).with_workers(8).load(entries).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_invalid_builds_are_rejected() {
    assert!(matches!(
        build_index(Vec::new(), 16, 1.0),
        Err(SpatialError::Construction(_))
    ));
    let entries = uniform_rects(10, 10.0, 1.0, 1);
    assert!(matches!(
        build_index(entries.clone(), 16, 0.1),
        Err(SpatialError::Construction(_))
    ));
    assert!(matches!(
        build_index(entries, 16, 0.0),
        Err(SpatialError::Construction(_))
    ));
}
