use rtree_join::{
    build_index, load_index, plane_sweep_join, save_index, Axis, JoinConfig, JoinStrategy,
    SpatialResult, TreeJoin,
};
use rtree_join_int_test::data_gen::uniform_rects;
use rtree_join_int_test::test_util::{cleanup, create_test_context};

fn main() -> SpatialResult<()> {
    colog::init();
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 1_000_000;
    let start = std::time::Instant::now();
    let a = uniform_rects(count, 100_000.0, 50.0, 1);
    let b = uniform_rects(count, 100_000.0, 50.0, 2);
    println!("Generated {} x {} objects in {:?}", count, count, start.elapsed());

    let start = std::time::Instant::now();
    let tree_a = build_index(a.clone(), 16, 1.0)?;
    let tree_b = build_index(b.clone(), 16, 1.0)?;
    println!("Built both trees in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    save_index(&tree_a, ctx.file("a.idx"), 16)?;
    save_index(&tree_b, ctx.file("b.idx"), 16)?;
    let tree_a = load_index(ctx.file("a.idx"))?;
    let tree_b = load_index(ctx.file("b.idx"))?;
    println!("Saved and reloaded both trees in {:?}", start.elapsed());

    let config = JoinConfig::default();
    for strategy in JoinStrategy::ALL {
        let start = std::time::Instant::now();
        let outcome = TreeJoin::new(&tree_a, &tree_b)
            .with_config(config.clone())
            .run(strategy);
        println!(
            "{} join found {} pairs in {:?}",
            strategy,
            outcome.pairs.len(),
            start.elapsed()
        );
    }

    let start = std::time::Instant::now();
    let pairs = plane_sweep_join(&a, &b, Axis::Dim0, 1000)?;
    println!("Plane sweep found {} pairs in {:?}", pairs.len(), start.elapsed());

    cleanup(ctx)
}
