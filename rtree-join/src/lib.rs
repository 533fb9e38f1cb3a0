//! # rtree-join - Bulk-Loaded R-Trees and Spatial Joins
//!
//! This crate builds static R-Trees over 2D rectangles, persists them in a
//! fixed-size page format, and joins two rectangle sets by reporting every
//! pair of intersecting objects.
//!
//! ## Features
//!
//! - **STR Bulk Loading**: Sort-Tile-Recursive packing with a configurable fill factor
//! - **Level Order**: Node ids follow breadth-first order, so node `i` is page `i` on disk
//! - **Page Format**: Little-endian, 64-byte header plus 64-byte data blocks of three entries
//! - **Tree Joins**: Synchronous depth-first, parallel breadth-first, and a breadth/depth hybrid
//! - **Plane Sweep**: Stripe-partitioned sweep over unindexed inputs
//!
//! Rectangles are closed: objects that share only an edge or corner intersect.
//!
//! ## Quick Start
//!
//! ```rust
//! use rtree_join::{build_index, join, plane_sweep_join, Axis, Entry, JoinStrategy, Mbr};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let a = Entry::from_rects(vec![Mbr::new(0.0, 2.0, 0.0, 2.0)]);
//! let b = Entry::from_rects(vec![
//!     Mbr::new(2.0, 4.0, 0.0, 2.0),
//!     Mbr::new(3.0, 5.0, 0.0, 2.0),
//! ]);
//!
//! let tree_a = build_index(a.clone(), 16, 1.0)?;
//! let tree_b = build_index(b.clone(), 16, 1.0)?;
//! let pairs = join(&tree_a, &tree_b, JoinStrategy::ParallelBreadth);
//! assert!(pairs.contains(&(0, 0)));
//! assert_eq!(pairs.len(), 1);
//!
//! let swept = plane_sweep_join(&a, &b, Axis::Dim0, 4)?;
//! assert_eq!(swept, pairs);
//! # Ok(())
//! # }
//! ```
//!
//! ## Persistence
//!
//! ```rust,no_run
//! use rtree_join::{build_index, load_index, save_index, Entry, Mbr};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let entries = Entry::from_rects((0..1000).map(|i| {
//!     let x = (i % 100) as f32;
//!     let y = (i / 100) as f32;
//!     Mbr::new(x, x + 0.5, y, y + 0.5)
//! }));
//! let tree = build_index(entries, 16, 1.0)?;
//! save_index(&tree, "objects.idx", 16)?;
//! let loaded = load_index("objects.idx")?;
//! assert_eq!(loaded.len(), 1000);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod join;
pub mod mbr;
mod parallel;
pub mod rtree;
pub mod sweep;
pub mod trace;

use std::collections::HashSet;
use std::path::Path;

// Re-export core types
pub use config::{IndexConfig, JoinConfig, LoadOptions, PlaneSweepConfig, Schedule};
pub use mbr::{Axis, Mbr};
pub use rtree::{
    ChildRef, Entry, IdPair, IntegrityReport, Node, NodeEntries, NodeId, ObjectId, PageLayout,
    RTree, RTreeStats, SpatialError, SpatialResult, StrLoader,
};

// Re-export join types
pub use join::{JoinOutcome, JoinStrategy, TreeJoin};
pub use sweep::PlaneSweep;
pub use trace::{read_trace, write_trace, Trace};

/// Builds a level-ordered R-Tree from `entries` with the STR loader.
///
/// Fails with [`SpatialError::Construction`] when `entries` is empty or
/// `floor(fill_factor * max_entries) < 2`.
pub fn build_index(
    entries: Vec<Entry>,
    max_entries: usize,
    fill_factor: f64,
) -> SpatialResult<RTree> {
    StrLoader::new(IndexConfig::new(max_entries, fill_factor)).load(entries)
}

/// Writes `tree` to `path`, one page of `max_entries` slots per node.
pub fn save_index(tree: &RTree, path: impl AsRef<Path>, max_entries: usize) -> SpatialResult<()> {
    rtree::rtree_storage::save_tree(tree, path.as_ref(), max_entries)
}

/// Reads a tree saved with the default `max_entries` of 16.
pub fn load_index(path: impl AsRef<Path>) -> SpatialResult<RTree> {
    load_index_with(path, &LoadOptions::default())
}

/// Reads a tree saved with `options.max_entries`.
pub fn load_index_with(path: impl AsRef<Path>, options: &LoadOptions) -> SpatialResult<RTree> {
    rtree::rtree_storage::load_tree(path.as_ref(), options)
}

/// Joins two trees with the default [`JoinConfig`].
pub fn join(a: &RTree, b: &RTree, strategy: JoinStrategy) -> HashSet<IdPair> {
    TreeJoin::new(a, b).run(strategy).into_set()
}

/// Joins two trees with an explicit [`JoinConfig`].
pub fn join_with_config(
    a: &RTree,
    b: &RTree,
    strategy: JoinStrategy,
    config: &JoinConfig,
) -> HashSet<IdPair> {
    TreeJoin::new(a, b)
        .with_config(config.clone())
        .run(strategy)
        .into_set()
}

/// Joins two unindexed inputs with the partitioned plane sweep.
///
/// Fails with [`SpatialError::Construction`] when `num_partitions` is 0.
pub fn plane_sweep_join(
    a: &[Entry],
    b: &[Entry],
    axis: Axis,
    num_partitions: usize,
) -> SpatialResult<HashSet<IdPair>> {
    let pairs = PlaneSweep::new(PlaneSweepConfig::new(axis, num_partitions)).run(a, b)?;
    Ok(pairs.into_iter().collect())
}

/// Joins two unindexed inputs by testing every pair.
pub fn nested_loop_join(a: &[Entry], b: &[Entry]) -> HashSet<IdPair> {
    sweep::nested_loop_join(a, b).into_iter().collect()
}
