//! Synchronous depth-first traversal of two trees.

use crate::rtree::{IdPair, NodeEntries, RTree};

use super::NodePair;

/// Joins the subtrees rooted at `pair` and appends every intersecting
/// object pair to `out`.
///
/// Descends only into child pairs whose rectangles intersect. A leaf may
/// meet a directory at any depth, so trees of different height are fine.
pub(crate) fn join_subtrees(a: &RTree, b: &RTree, pair: NodePair, out: &mut Vec<IdPair>) {
    let (id_a, id_b) = pair;
    let node_a = a.node(id_a);
    let node_b = b.node(id_b);

    match (&node_a.entries, &node_b.entries) {
        (NodeEntries::Leaf(entries_a), NodeEntries::Leaf(entries_b)) => {
            for ea in entries_a {
                for eb in entries_b {
                    if ea.mbr.intersects(&eb.mbr) {
                        out.push((ea.id, eb.id));
                    }
                }
            }
        }
        (NodeEntries::Leaf(_), NodeEntries::Directory(children_b)) => {
            for cb in children_b {
                if node_a.mbr.intersects(&cb.mbr) {
                    join_subtrees(a, b, (id_a, cb.child), out);
                }
            }
        }
        (NodeEntries::Directory(children_a), NodeEntries::Leaf(_)) => {
            for ca in children_a {
                if ca.mbr.intersects(&node_b.mbr) {
                    join_subtrees(a, b, (ca.child, id_b), out);
                }
            }
        }
        (NodeEntries::Directory(children_a), NodeEntries::Directory(children_b)) => {
            for ca in children_a {
                for cb in children_b {
                    if ca.mbr.intersects(&cb.mbr) {
                        join_subtrees(a, b, (ca.child, cb.child), out);
                    }
                }
            }
        }
    }
}

/// Joins two whole trees on the calling thread.
pub(crate) fn synchronous_join(a: &RTree, b: &RTree) -> Vec<IdPair> {
    let mut out = Vec::new();
    join_subtrees(a, b, (a.root_id(), b.root_id()), &mut out);
    out
}
