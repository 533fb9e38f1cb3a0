//! Core types and data structures for the R-Tree.
//!
//! This module defines the fundamental types used throughout the crate:
//! - Error types and result types
//! - Entry and node types (Leaf and Directory)
//! - Statistics structures

use std::io;
use thiserror::Error;

use crate::mbr::Mbr;

use super::rtree_constants::UNASSIGNED_NODE_ID;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while building, persisting or loading an index
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("Construction error: {0}")]
    Construction(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Insufficient memory: cannot buffer {requested} bytes{}", limit_suffix(.limit))]
    Capacity { requested: u64, limit: Option<u64> },

    #[error("Format error: {0}")]
    Format(String),
}

fn limit_suffix(limit: &Option<u64>) -> String {
    match limit {
        Some(limit) => format!(" (limit {} bytes)", limit),
        None => String::new(),
    }
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Identifier of a spatial object, as found in the input trace
pub type ObjectId = u32;

/// Identifier of a node; after fix-up also its page index on disk
pub type NodeId = u32;

/// A join result: `(object id from tree A, object id from tree B)`
pub type IdPair = (ObjectId, ObjectId);

// ============================================================================
// Entries
// ============================================================================

/// A spatial object: rectangle plus object id.
///
/// Used both as loader input and as the entry type of leaf nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub id: ObjectId,
    pub mbr: Mbr,
}

impl Entry {
    pub fn new(id: ObjectId, mbr: Mbr) -> Self {
        Self { id, mbr }
    }

    /// Wraps plain rectangles, using the input position as object id.
    pub fn from_rects<I>(rects: I) -> Vec<Entry>
    where
        I: IntoIterator<Item = Mbr>,
    {
        rects
            .into_iter()
            .enumerate()
            .map(|(i, mbr)| Entry::new(i as ObjectId, mbr))
            .collect()
    }
}

/// A child reference in a directory node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildRef {
    pub mbr: Mbr,
    pub child: NodeId,
}

// ============================================================================
// Node Types
// ============================================================================

/// Entries of a node; the variant decides whether the node is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEntries {
    /// Leaf node containing spatial objects
    Leaf(Vec<Entry>),
    /// Directory node containing child references
    Directory(Vec<ChildRef>),
}

/// A node of the R-Tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Covers every entry of the node
    pub mbr: Mbr,
    pub entries: NodeEntries,
}

impl Node {
    /// Creates a leaf whose bounding rectangle is merged from its entries.
    pub fn leaf(entries: Vec<Entry>) -> Self {
        let mbr = entries.iter().fold(Mbr::empty(), |acc, e| acc.union(&e.mbr));
        Self {
            id: UNASSIGNED_NODE_ID,
            mbr,
            entries: NodeEntries::Leaf(entries),
        }
    }

    /// Creates a directory whose bounding rectangle is merged from its children.
    pub fn directory(children: Vec<ChildRef>) -> Self {
        let mbr = children.iter().fold(Mbr::empty(), |acc, c| acc.union(&c.mbr));
        Self {
            id: UNASSIGNED_NODE_ID,
            mbr,
            entries: NodeEntries::Directory(children),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.entries, NodeEntries::Leaf(_))
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            NodeEntries::Leaf(entries) => entries.len(),
            NodeEntries::Directory(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Child references of a directory node; empty for a leaf.
    pub fn children(&self) -> &[ChildRef] {
        match &self.entries {
            NodeEntries::Leaf(_) => &[],
            NodeEntries::Directory(children) => children,
        }
    }

    /// Recomputes the bounding rectangle from the entries.
    pub fn compute_mbr(&self) -> Mbr {
        match &self.entries {
            NodeEntries::Leaf(entries) => {
                entries.iter().fold(Mbr::empty(), |acc, e| acc.union(&e.mbr))
            }
            NodeEntries::Directory(children) => {
                children.iter().fold(Mbr::empty(), |acc, c| acc.union(&c.mbr))
            }
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Shape of a built R-Tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RTreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub entries: usize,
    pub height: usize,
    pub page_bytes: usize,
}
