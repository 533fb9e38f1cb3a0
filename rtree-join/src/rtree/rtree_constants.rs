//! Constants for the R-Tree and its page format.

/// Default maximum number of entries per node
pub const DEFAULT_MAX_ENTRIES: usize = 16;

/// Default fraction of `max_entries` packed per node by the bulk loader
pub const DEFAULT_FILL_FACTOR: f64 = 1.0;

/// Node id carried by nodes before the fix-up pass renumbers them
pub const UNASSIGNED_NODE_ID: u32 = u32::MAX;

/// Size of a page header; the first [`PAGE_HEADER_META_BYTES`] are meaningful
pub const PAGE_HEADER_BYTES: usize = 64;

/// Leaf flag (4) + entry count (4) + node id (4) + bounding rectangle (16)
pub const PAGE_HEADER_META_BYTES: usize = 28;

/// Size of one data block in a page
pub const DATA_BLOCK_BYTES: usize = 64;

/// Id (4) + rectangle (16)
pub const ENTRY_SLOT_BYTES: usize = 20;

/// Entry slots per data block (3 * 20 = 60, padded to 64)
pub const SLOTS_PER_BLOCK: usize = 3;

/// Hybrid join switches to depth-first dispatch once the frontier holds
/// this many pairs per worker
pub const DEFAULT_HYBRID_TASKS_PER_WORKER: usize = 10;

/// Default stripe count for the plane-sweep join
pub const DEFAULT_NUM_PARTITIONS: usize = 1000;
