use rtree_join::{
    build_index, join_with_config, Entry, IdPair, JoinConfig, JoinStrategy, RTree,
    SpatialResult,
};
use std::backtrace::Backtrace;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Runs a test between a setup and a teardown step.
/// Teardown runs even when the test fails, and the first failure is reported with a backtrace.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> SpatialResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> SpatialResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> SpatialResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => after(ctx)
                    .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", panic_err.type_id())
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", start_time.elapsed());
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Error: {}", error);
}

/// Scratch directory for one test's index and trace files.
#[derive(Clone)]
pub struct TestContext {
    path: String,
}

impl TestContext {
    pub fn new(path: String) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of a file inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.path).join(name)
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir.join(id.to_string()).to_string_lossy().into_owned()
}

pub fn create_test_context() -> SpatialResult<TestContext> {
    let path = random_path();
    fs::create_dir_all(&path)?;
    Ok(TestContext::new(path))
}

pub fn cleanup(ctx: TestContext) -> SpatialResult<()> {
    let max_retries = 5;
    let mut delay_ms = 20u64;

    for retry in 0..max_retries {
        if !std::path::Path::new(ctx.path()).exists() {
            return Ok(());
        }
        match fs::remove_dir_all(ctx.path()) {
            Ok(_) => return Ok(()),
            Err(e) if retry + 1 < max_retries => {
                log::warn!("Failed to remove {} (attempt {}): {}", ctx.path(), retry + 1, e);
                thread::sleep(Duration::from_millis(delay_ms));
                delay_ms *= 2;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Every intersecting `(a, b)` pair, by testing all combinations.
pub fn brute_force_pairs(a: &[Entry], b: &[Entry]) -> HashSet<IdPair> {
    let mut pairs = HashSet::new();
    for ea in a {
        for eb in b {
            if ea.mbr.intersects(&eb.mbr) {
                pairs.insert((ea.id, eb.id));
            }
        }
    }
    pairs
}

/// Builds both trees with the same node capacity and fill factor.
pub fn build_pair(
    a: &[Entry],
    b: &[Entry],
    max_entries: usize,
    fill_factor: f64,
) -> SpatialResult<(RTree, RTree)> {
    let tree_a = build_index(a.to_vec(), max_entries, fill_factor)?;
    let tree_b = build_index(b.to_vec(), max_entries, fill_factor)?;
    Ok((tree_a, tree_b))
}

/// Runs every join strategy and returns the result sets in
/// [`JoinStrategy::ALL`] order.
pub fn join_all_strategies(
    a: &RTree,
    b: &RTree,
    config: &JoinConfig,
) -> Vec<(JoinStrategy, HashSet<IdPair>)> {
    JoinStrategy::ALL
        .into_iter()
        .map(|strategy| (strategy, join_with_config(a, b, strategy, config)))
        .collect()
}
