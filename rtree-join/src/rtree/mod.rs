//! Bulk-loaded R-Tree with a fixed-size page format.
//!
//! # Architecture
//!
//! - `rtree_types`: entries, nodes and the error type
//! - `rtree_impl`: the arena-backed tree and the level-order fix-up pass
//! - `str_loader`: Sort-Tile-Recursive bulk loading
//! - `page_codec`: encoding of one node into one page
//! - `rtree_storage`: whole-file save and load
//! - `rtree_constants`: defaults and page geometry

pub mod page_codec;
pub mod rtree_constants;
pub mod rtree_impl;
pub mod rtree_storage;
pub mod rtree_types;
pub mod str_loader;

pub use page_codec::PageLayout;
pub use rtree_impl::{IntegrityReport, RTree};
pub use rtree_types::{
    ChildRef, Entry, IdPair, Node, NodeEntries, NodeId, ObjectId, RTreeStats, SpatialError,
    SpatialResult,
};
pub use str_loader::StrLoader;
