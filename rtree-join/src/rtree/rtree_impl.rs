//! In-memory R-Tree.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Once the fix-up pass has
//! run, a node's id equals its arena index and its page index on disk, and
//! the arena is in breadth-first (level) order with the root at 0.

use std::collections::VecDeque;

use crate::mbr::Mbr;

use super::page_codec::PageLayout;
use super::rtree_types::{
    Entry, Node, NodeEntries, NodeId, RTreeStats, SpatialError, SpatialResult,
};

/// An immutable R-Tree built by the STR loader or read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RTree {
    nodes: Vec<Node>,
    root: NodeId,
    max_entries: usize,
    tree_index: u8,
}

/// Result of a structural check over a tree.
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub nodes_checked: usize,
    pub errors: Vec<String>,
    pub is_valid: bool,
}

impl IntegrityReport {
    fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    fn fail(&mut self, message: String) {
        self.errors.push(message);
        self.is_valid = false;
    }
}

impl RTree {
    /// Assembles a tree from an arena. `root` must index into `nodes`.
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        root: NodeId,
        max_entries: usize,
        tree_index: u8,
    ) -> Self {
        Self {
            nodes,
            root,
            max_entries,
            tree_index,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &Node {
        self.node(self.root)
    }

    /// Returns the node stored under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree. Ids taken from this
    /// tree's own child references are always valid.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn tree_index(&self) -> u8 {
        self.tree_index
    }

    /// Bounding rectangle of the whole tree.
    pub fn mbr(&self) -> Mbr {
        self.root().mbr
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.leaf_entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels, counting the leaf level. All leaves share a depth,
    /// so the leftmost path is enough.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root();
        while let Some(first) = node.children().first() {
            node = self.node(first.child);
            height += 1;
        }
        height
    }

    /// Every leaf entry, in arena order.
    pub fn leaf_entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.nodes.iter().flat_map(|node| {
            let entries: &[Entry] = match &node.entries {
                NodeEntries::Leaf(entries) => entries,
                NodeEntries::Directory(_) => &[],
            };
            entries
        })
    }

    pub fn page_layout(&self) -> PageLayout {
        PageLayout::new(self.max_entries)
    }

    pub fn stats(&self) -> RTreeStats {
        RTreeStats {
            nodes: self.nodes.len(),
            leaves: self.nodes.iter().filter(|n| n.is_leaf()).count(),
            entries: self.len(),
            height: self.height(),
            page_bytes: self.page_layout().page_bytes(),
        }
    }

    /// Checks whether every node id equals its arena index and the arena
    /// is in breadth-first order from a root at 0.
    pub fn is_level_ordered(&self) -> bool {
        if self.root != 0 || self.nodes.is_empty() {
            return false;
        }
        if self
            .nodes
            .iter()
            .enumerate()
            .any(|(i, node)| node.id as usize != i)
        {
            return false;
        }
        // In BFS order the children of consecutive directories are consecutive.
        let mut expected: NodeId = 1;
        for node in &self.nodes {
            for child in node.children() {
                if child.child != expected {
                    return false;
                }
                expected += 1;
            }
        }
        expected as usize == self.nodes.len()
    }

    /// Renumbers nodes in breadth-first order from the root, assigning
    /// consecutive ids starting at 0, and rewrites child references to match.
    ///
    /// Nodes unreachable from the root are dropped.
    pub fn fix_up(self) -> RTree {
        let RTree {
            nodes,
            root,
            max_entries,
            tree_index,
        } = self;

        let mut order: Vec<usize> = Vec::with_capacity(nodes.len());
        let mut queue = VecDeque::from([root as usize]);
        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            queue.extend(nodes[idx].children().iter().map(|c| c.child as usize));
        }

        let mut new_ids = vec![NodeId::MAX; nodes.len()];
        for (new_id, &old) in order.iter().enumerate() {
            new_ids[old] = new_id as NodeId;
        }

        let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(order.len());
        for (new_id, &old) in order.iter().enumerate() {
            if let Some(mut node) = slots[old].take() {
                node.id = new_id as NodeId;
                if let NodeEntries::Directory(children) = &mut node.entries {
                    for child in children.iter_mut() {
                        child.child = new_ids[child.child as usize];
                    }
                }
                ordered.push(node);
            }
        }

        log::debug!(
            "Renumbered {} nodes in level order (root was {})",
            ordered.len(),
            root
        );

        RTree {
            nodes: ordered,
            root: 0,
            max_entries,
            tree_index,
        }
    }

    /// Verifies the structural invariants: every node's bounds equal the
    /// merge of its entries, cached child bounds match the child, nodes stay
    /// within capacity, and all leaves share one depth.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut report = IntegrityReport::new();
        let mut leaf_depth: Option<usize> = None;
        let mut stack = vec![(self.root, 1usize)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id as usize) else {
                report.fail(format!("node {} does not exist", id));
                continue;
            };
            report.nodes_checked += 1;

            if node.is_empty() {
                report.fail(format!("node {} has no entries", node.id));
            }
            if node.len() > self.max_entries {
                report.fail(format!(
                    "node {} holds {} entries, more than {}",
                    node.id,
                    node.len(),
                    self.max_entries
                ));
            }

            // bounds must be exactly the min/max over the entries
            let merged = node.compute_mbr();
            if !node.is_empty() && node.mbr != merged {
                report.fail(format!(
                    "node {} carries bounds {}, its entries span {}",
                    node.id, node.mbr, merged
                ));
            }

            match &node.entries {
                NodeEntries::Leaf(_) => {
                    match leaf_depth {
                        None => leaf_depth = Some(depth),
                        Some(expected) if expected != depth => report.fail(format!(
                            "leaf {} at depth {}, expected {}",
                            node.id, depth, expected
                        )),
                        Some(_) => {}
                    }
                }
                NodeEntries::Directory(children) => {
                    for child in children {
                        match self.nodes.get(child.child as usize) {
                            Some(target) if target.mbr != child.mbr => report.fail(format!(
                                "child reference {} -> {} carries {}, node has {}",
                                node.id, child.child, child.mbr, target.mbr
                            )),
                            Some(_) => stack.push((child.child, depth + 1)),
                            None => report.fail(format!(
                                "directory {} references missing node {}",
                                node.id, child.child
                            )),
                        }
                    }
                }
            }
        }

        report
    }

    /// Like [`RTree::check_integrity`], but fails with the first violation.
    pub fn check_bounds(&self) -> SpatialResult<()> {
        let report = self.check_integrity();
        match report.errors.into_iter().next() {
            Some(first) => Err(SpatialError::Format(first)),
            None => Ok(()),
        }
    }
}
