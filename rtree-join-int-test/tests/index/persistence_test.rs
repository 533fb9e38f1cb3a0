//! Save/load through the page format, including damaged files.

use rtree_join::{
    build_index, join, load_index, load_index_with, save_index, JoinStrategy, LoadOptions,
    SpatialError,
};
use rtree_join_int_test::data_gen::{clustered_rects, uniform_rects};
use rtree_join_int_test::test_util::{
    brute_force_pairs, cleanup, create_test_context, run_test,
};

#[test]
fn test_save_and_load_round_trip() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("objects.idx");
            let tree = build_index(clustered_rects(3_000, 5, 17), 16, 1.0)?;
            save_index(&tree, &path, 16)?;

            let size = std::fs::metadata(&path)?.len() as usize;
            assert_eq!(size, tree.node_count() * tree.page_layout().page_bytes());

            let loaded = load_index(&path)?;
            assert_eq!(loaded, tree);
            assert!(loaded.check_integrity().is_valid);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_join_after_load_matches_brute_force() {
    run_test(
        || create_test_context(),
        |ctx| {
            let a = uniform_rects(400, 300.0, 12.0, 101);
            let b = uniform_rects(450, 300.0, 12.0, 102);
            let expected = brute_force_pairs(&a, &b);

            for (name, entries) in [("a.idx", &a), ("b.idx", &b)] {
                let tree = build_index(entries.clone(), 8, 1.0)?;
                save_index(&tree, ctx.file(name), 8)?;
            }
            let options = LoadOptions::new(8);
            let tree_a = load_index_with(ctx.file("a.idx"), &options)?;
            let tree_b = load_index_with(ctx.file("b.idx"), &options)?;

            for strategy in JoinStrategy::ALL {
                assert_eq!(join(&tree_a, &tree_b, strategy), expected, "{}", strategy);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_load_with_wrong_page_size_fails() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("objects.idx");
            let tree = build_index(uniform_rects(500, 100.0, 2.0, 9), 16, 1.0)?;
            save_index(&tree, &path, 16)?;

            let result = load_index_with(&path, &LoadOptions::new(4));
            assert!(matches!(result, Err(SpatialError::Format(_))));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_load_rejects_damaged_files() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("objects.idx");
            let tree = build_index(uniform_rects(200, 100.0, 2.0, 4), 4, 1.0)?;
            save_index(&tree, &path, 4)?;
            let original = std::fs::read(&path)?;
            let page_bytes = tree.page_layout().page_bytes();

            // truncated by half a page
            let damaged = ctx.file("truncated.idx");
            std::fs::write(&damaged, &original[..original.len() - page_bytes / 2])?;
            assert!(matches!(
                load_index_with(&damaged, &LoadOptions::new(4)),
                Err(SpatialError::Format(_))
            ));

            // page 1 claims to be node 7
            let mut bytes = original.clone();
            bytes[page_bytes + 8..page_bytes + 12].copy_from_slice(&7u32.to_le_bytes());
            let damaged = ctx.file("renumbered.idx");
            std::fs::write(&damaged, &bytes)?;
            assert!(matches!(
                load_index_with(&damaged, &LoadOptions::new(4)),
                Err(SpatialError::Format(_))
            ));

            // root's first child reference no longer matches the child
            let mut bytes = original.clone();
            for offset in (68..84).step_by(4) {
                bytes[offset..offset + 4].copy_from_slice(&1000f32.to_le_bytes());
            }
            let damaged = ctx.file("stale-bounds.idx");
            std::fs::write(&damaged, &bytes)?;
            assert!(matches!(
                load_index_with(&damaged, &LoadOptions::new(4)),
                Err(SpatialError::Format(_))
            ));

            // root entry count of zero
            let mut bytes = original;
            bytes[4..8].copy_from_slice(&0u32.to_le_bytes());
            let damaged = ctx.file("empty-root.idx");
            std::fs::write(&damaged, &bytes)?;
            assert!(matches!(
                load_index_with(&damaged, &LoadOptions::new(4)),
                Err(SpatialError::Format(_))
            ));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_load_missing_file_is_io_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            let result = load_index(ctx.file("missing.idx"));
            assert!(matches!(result, Err(SpatialError::Io(_))));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_load_respects_buffer_limit() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("objects.idx");
            let tree = build_index(uniform_rects(1_000, 100.0, 2.0, 8), 16, 1.0)?;
            save_index(&tree, &path, 16)?;

            let options = LoadOptions::default().with_buffer_limit(1024);
            match load_index_with(&path, &options) {
                Err(SpatialError::Capacity { requested, limit }) => {
                    assert_eq!(requested, std::fs::metadata(&path)?.len());
                    assert_eq!(limit, Some(1024));
                }
                other => panic!("expected a capacity error, got {:?}", other.map(|t| t.len())),
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_save_rejects_pages_too_small() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = build_index(uniform_rects(300, 100.0, 2.0, 12), 16, 1.0)?;
            let result = save_index(&tree, ctx.file("small.idx"), 4);
            assert!(matches!(result, Err(SpatialError::Format(_))));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
