use serde::{Deserialize, Serialize};

use crate::mbr::Axis;
use crate::rtree::rtree_constants::{
    DEFAULT_FILL_FACTOR, DEFAULT_HYBRID_TASKS_PER_WORKER, DEFAULT_MAX_ENTRIES,
    DEFAULT_NUM_PARTITIONS,
};
use crate::rtree::{PageLayout, SpatialError, SpatialResult};

/// Number of hardware threads, falling back to 1 when unknown.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Settings for building an R-Tree with the STR bulk loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Upper bound on entries per node; also sizes the disk page.
    pub max_entries: usize,
    /// Fraction of `max_entries` the loader packs into each node.
    pub fill_factor: f64,
    /// Label of the tree; carried through but never interpreted.
    pub tree_index: u8,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            fill_factor: DEFAULT_FILL_FACTOR,
            tree_index: 0,
        }
    }
}

impl IndexConfig {
    pub fn new(max_entries: usize, fill_factor: f64) -> Self {
        Self {
            max_entries,
            fill_factor,
            ..Default::default()
        }
    }

    pub fn with_tree_index(mut self, tree_index: u8) -> Self {
        self.tree_index = tree_index;
        self
    }

    /// `floor(fill_factor * max_entries)`
    pub fn entries_per_node(&self) -> usize {
        let per_node = (self.fill_factor * self.max_entries as f64).floor();
        if per_node.is_finite() && per_node > 0.0 {
            per_node as usize
        } else {
            0
        }
    }

    pub fn page_layout(&self) -> PageLayout {
        PageLayout::new(self.max_entries)
    }

    /// Size of one node on disk.
    pub fn page_bytes(&self) -> usize {
        self.page_layout().page_bytes()
    }

    /// Rejects settings the loader cannot build a tree with.
    pub fn validate(&self) -> SpatialResult<()> {
        if !(self.fill_factor > 0.0 && self.fill_factor <= 1.0) {
            return Err(SpatialError::Construction(format!(
                "fill factor must be in (0, 1], got {}",
                self.fill_factor
            )));
        }
        let per_node = self.entries_per_node();
        if per_node < 2 {
            return Err(SpatialError::Construction(format!(
                "entries per node must be at least 2, got {} (max_entries {}, fill factor {})",
                per_node, self.max_entries, self.fill_factor
            )));
        }
        Ok(())
    }
}

/// How the parallel joins hand node pairs to their workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Schedule {
    /// Each worker takes one contiguous share of the pairs up front.
    #[default]
    Static,
    /// Workers pull pairs one at a time from a shared queue.
    Dynamic,
}

impl Schedule {
    pub const ALL: [Schedule; 2] = [Schedule::Static, Schedule::Dynamic];
}

/// Settings for the tree-vs-tree join strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Worker threads used by the parallel strategies.
    pub workers: usize,
    /// Frontier size at which the hybrid join stops expanding breadth-first.
    /// `None` means `10 * workers`.
    pub hybrid_threshold: Option<usize>,
    /// Applies to every breadth-first round and to the hybrid's
    /// depth-first dispatch.
    #[serde(default)]
    pub schedule: Schedule,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            workers: available_workers(),
            hybrid_threshold: None,
            schedule: Schedule::default(),
        }
    }
}

impl JoinConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    pub fn with_hybrid_threshold(mut self, threshold: usize) -> Self {
        self.hybrid_threshold = Some(threshold);
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Worker count, never below 1.
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }

    pub fn effective_hybrid_threshold(&self) -> usize {
        self.hybrid_threshold
            .unwrap_or(DEFAULT_HYBRID_TASKS_PER_WORKER * self.effective_workers())
            .max(1)
    }
}

/// Settings for reading index and trace files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// `max_entries` the index file was written with; decides the page size.
    pub max_entries: usize,
    /// Refuse to buffer files larger than this many bytes.
    pub buffer_limit: Option<u64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            buffer_limit: None,
        }
    }
}

impl LoadOptions {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            buffer_limit: None,
        }
    }

    pub fn with_buffer_limit(mut self, limit: u64) -> Self {
        self.buffer_limit = Some(limit);
        self
    }
}

/// Settings for the partitioned plane-sweep join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneSweepConfig {
    /// Axis cut into stripes; events run along the other axis.
    pub axis: Axis,
    pub num_partitions: usize,
    pub workers: usize,
}

impl Default for PlaneSweepConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Dim0,
            num_partitions: DEFAULT_NUM_PARTITIONS,
            workers: available_workers(),
        }
    }
}

impl PlaneSweepConfig {
    pub fn new(axis: Axis, num_partitions: usize) -> Self {
        Self {
            axis,
            num_partitions,
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> SpatialResult<()> {
        if self.num_partitions == 0 {
            return Err(SpatialError::Construction(
                "plane sweep needs at least one partition".to_string(),
            ));
        }
        Ok(())
    }
}
