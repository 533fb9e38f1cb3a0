//! Sort-Tile-Recursive (STR) bulk loading.
//!
//! With `per_node = floor(fill_factor * max_entries)`, `n` entries are packed
//! into `P = ceil(n / per_node)` leaves laid out as `S = floor(sqrt(P))`
//! vertical slabs:
//!
//! 1. stable-sort all entries by `low0`
//! 2. cut the sorted run into slabs of `S * per_node` entries (the last
//!    slab takes the remainder) and stable-sort each slab by `low1`
//! 3. pack consecutive runs of `per_node` entries into leaves (the last
//!    run takes the remainder)
//!
//! Upper levels group consecutive nodes of the level below in runs of
//! `per_node` until a single root remains.

use crate::config::IndexConfig;
use crate::parallel::scoped_map;

use super::rtree_impl::RTree;
use super::rtree_types::{ChildRef, Entry, Node, NodeId, SpatialError, SpatialResult};

/// Builds an [`RTree`] from a batch of entries.
///
/// # Examples
///
/// ```rust
/// use rtree_join::{Entry, IndexConfig, Mbr, StrLoader};
///
/// let entries = Entry::from_rects((0..100).map(|i| {
///     let x = i as f32;
///     Mbr::new(x, x + 1.0, 0.0, 1.0)
/// }));
/// let tree = StrLoader::new(IndexConfig::new(8, 1.0)).load(entries).unwrap();
/// assert_eq!(tree.len(), 100);
/// assert_eq!(tree.root_id(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct StrLoader {
    config: IndexConfig,
    workers: usize,
}

impl StrLoader {
    pub fn new(config: IndexConfig) -> Self {
        Self { config, workers: 1 }
    }

    /// Builds node levels on up to `workers` threads. The resulting tree
    /// is identical to the single-threaded one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Builds the tree and renumbers it in level order, root at 0.
    pub fn load(&self, entries: Vec<Entry>) -> SpatialResult<RTree> {
        Ok(self.load_unordered(entries)?.fix_up())
    }

    /// Builds the tree without the fix-up pass.
    ///
    /// Nodes keep the unassigned id, sit in the arena leaves first with the
    /// root last, and the tree cannot be saved until [`RTree::fix_up`] runs.
    pub fn load_unordered(&self, mut entries: Vec<Entry>) -> SpatialResult<RTree> {
        self.config.validate()?;
        if entries.is_empty() {
            return Err(SpatialError::Construction(
                "cannot build an index from zero entries".to_string(),
            ));
        }
        if entries.len() > NodeId::MAX as usize {
            return Err(SpatialError::Construction(format!(
                "{} entries exceed the addressable node count",
                entries.len()
            )));
        }

        let per_node = self.config.entries_per_node();
        let entry_count = entries.len();
        tile(&mut entries, per_node);

        let runs: Vec<&[Entry]> = entries.chunks(per_node).collect();
        let mut nodes: Vec<Node> = scoped_map(&runs, self.workers, |chunk| {
            chunk.iter().map(|run| Node::leaf(run.to_vec())).collect::<Vec<_>>()
        })
        .into_iter()
        .flatten()
        .collect();

        let mut level_start = 0;
        let mut level_end = nodes.len();
        let mut height = 1;
        while level_end - level_start > 1 {
            let level: Vec<ChildRef> = (level_start..level_end)
                .map(|i| ChildRef {
                    mbr: nodes[i].mbr,
                    child: i as NodeId,
                })
                .collect();
            let groups: Vec<&[ChildRef]> = level.chunks(per_node).collect();
            let parents: Vec<Node> = scoped_map(&groups, self.workers, |chunk| {
                chunk
                    .iter()
                    .map(|group| Node::directory(group.to_vec()))
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .flatten()
            .collect();

            level_start = level_end;
            nodes.extend(parents);
            level_end = nodes.len();
            height += 1;
        }

        log::debug!(
            "STR loaded {} entries into {} nodes (height {}, {} per node)",
            entry_count,
            nodes.len(),
            height,
            per_node
        );

        let root = (nodes.len() - 1) as NodeId;
        Ok(RTree::from_parts(
            nodes,
            root,
            self.config.max_entries,
            self.config.tree_index,
        ))
    }
}

/// Orders entries into STR tiles in place.
fn tile(entries: &mut [Entry], per_node: usize) {
    let leaf_count = entries.len().div_ceil(per_node);
    let slab_count = (leaf_count as f64).sqrt().floor().max(1.0) as usize;
    let slab_len = slab_count * per_node;

    entries.sort_by(|a, b| a.mbr.low0.total_cmp(&b.mbr.low0));
    for slab in entries.chunks_mut(slab_len) {
        slab.sort_by(|a, b| a.mbr.low1.total_cmp(&b.mbr.low1));
    }
}
