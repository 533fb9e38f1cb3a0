use rtree_join::{
    build_index, join, load_index, plane_sweep_join, read_trace, save_index, write_trace, Axis,
    JoinStrategy, LoadOptions, Mbr, SpatialError,
};
use rtree_join_int_test::data_gen::{clustered_rects, uniform_rects};
use rtree_join_int_test::test_util::{brute_force_pairs, cleanup, create_test_context, run_test};
use std::collections::HashSet;

#[test]
fn test_trace_to_index_to_join() {
    run_test(
        || create_test_context(),
        |ctx| {
            let a = uniform_rects(900, 600.0, 9.0, 201);
            let b = clustered_rects(700, 5, 202);
            write_trace(ctx.file("a.txt"), &a)?;
            write_trace(ctx.file("b.txt"), &b)?;

            let trace_a = read_trace(ctx.file("a.txt"), &LoadOptions::default())?;
            let trace_b = read_trace(ctx.file("b.txt"), &LoadOptions::default())?;
            assert_eq!(trace_a.entries, a);
            assert_eq!(trace_b.entries, b);

            save_index(&build_index(trace_a.entries.clone(), 16, 1.0)?, ctx.file("a.idx"), 16)?;
            save_index(&build_index(trace_b.entries.clone(), 16, 1.0)?, ctx.file("b.idx"), 16)?;
            let tree_a = load_index(ctx.file("a.idx"))?;
            let tree_b = load_index(ctx.file("b.idx"))?;

            let expected = brute_force_pairs(&a, &b);
            for strategy in JoinStrategy::ALL {
                assert_eq!(join(&tree_a, &tree_b, strategy), expected, "{}", strategy);
            }
            let swept = plane_sweep_join(&trace_a.entries, &trace_b.entries, Axis::Dim0, 32)?;
            assert_eq!(swept, expected);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_trace_bounds_cover_all_objects() {
    run_test(
        || create_test_context(),
        |ctx| {
            let entries = uniform_rects(250, 80.0, 4.0, 9);
            write_trace(ctx.file("objects.txt"), &entries)?;
            let trace = read_trace(ctx.file("objects.txt"), &LoadOptions::default())?;

            let bounds = trace.bounds.unwrap_or_else(Mbr::empty);
            assert!(entries.iter().all(|e| bounds.contains(&e.mbr)));
            assert_eq!(Some(bounds), Mbr::bounding(entries.iter().map(|e| &e.mbr)));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_handwritten_trace_keeps_object_ids() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("hand.txt");
            std::fs::write(&path, "3\n10 0 2 0 2\n20 2 4 0 2\n30 3 5 0 2\n")?;
            let trace = read_trace(&path, &LoadOptions::default())?;
            let ids: Vec<u32> = trace.entries.iter().map(|e| e.id).collect();
            assert_eq!(ids, vec![10, 20, 30]);

            let (a, b) = trace.entries.split_at(1);
            let pairs = plane_sweep_join(a, b, Axis::Dim1, 2)?;
            assert_eq!(pairs, HashSet::from([(10, 20)]));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_short_trace_is_rejected() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("short.txt");
            std::fs::write(&path, "5\n0 0 1 0 1\n1 1 2 1 2\n")?;
            let result = read_trace(&path, &LoadOptions::default());
            assert!(matches!(result, Err(SpatialError::Format(_))));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
