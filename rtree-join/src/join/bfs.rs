//! Level-synchronous breadth-first join.
//!
//! Each round expands every pair of the current frontier, in parallel, into
//! the next frontier. Workers buffer their new pairs and results locally and
//! merge them into the shared round state once, when their share is done.
//! The [`Schedule`] decides whether a share is a fixed slice of the frontier
//! or whatever a worker pulls from a queue.

use parking_lot::Mutex;

use crate::config::Schedule;
use crate::parallel::scheduled_fold;
use crate::rtree::{IdPair, NodeEntries, RTree};

use super::{JoinOutcome, NodePair};

/// Shared state of one round
#[derive(Default)]
struct RoundMerge {
    next: Vec<NodePair>,
    results: Vec<IdPair>,
}

/// Expands one node pair: leaf-by-leaf pairs emit object matches, every other
/// combination emits the child pairs whose rectangles intersect.
pub(crate) fn expand_pair(
    a: &RTree,
    b: &RTree,
    pair: NodePair,
    next: &mut Vec<NodePair>,
    results: &mut Vec<IdPair>,
) {
    let (id_a, id_b) = pair;
    let node_a = a.node(id_a);
    let node_b = b.node(id_b);

    match (&node_a.entries, &node_b.entries) {
        (NodeEntries::Leaf(entries_a), NodeEntries::Leaf(entries_b)) => {
            for ea in entries_a {
                for eb in entries_b {
                    if ea.mbr.intersects(&eb.mbr) {
                        results.push((ea.id, eb.id));
                    }
                }
            }
        }
        (NodeEntries::Leaf(_), NodeEntries::Directory(children_b)) => {
            next.extend(
                children_b
                    .iter()
                    .filter(|cb| node_a.mbr.intersects(&cb.mbr))
                    .map(|cb| (id_a, cb.child)),
            );
        }
        (NodeEntries::Directory(children_a), NodeEntries::Leaf(_)) => {
            next.extend(
                children_a
                    .iter()
                    .filter(|ca| ca.mbr.intersects(&node_b.mbr))
                    .map(|ca| (ca.child, id_b)),
            );
        }
        (NodeEntries::Directory(children_a), NodeEntries::Directory(children_b)) => {
            for ca in children_a {
                for cb in children_b {
                    if ca.mbr.intersects(&cb.mbr) {
                        next.push((ca.child, cb.child));
                    }
                }
            }
        }
    }
}

/// Runs one round over `frontier` and returns the next frontier. Object
/// matches are appended to `results`.
pub(crate) fn bfs_round(
    a: &RTree,
    b: &RTree,
    frontier: &[NodePair],
    workers: usize,
    schedule: Schedule,
    results: &mut Vec<IdPair>,
) -> Vec<NodePair> {
    let merge = Mutex::new(RoundMerge::default());
    scheduled_fold(
        frontier,
        workers,
        schedule,
        RoundMerge::default,
        |local: &mut RoundMerge, pair| {
            expand_pair(a, b, pair, &mut local.next, &mut local.results)
        },
        |mut local| {
            let mut shared = merge.lock();
            shared.next.append(&mut local.next);
            shared.results.append(&mut local.results);
        },
    );

    let RoundMerge {
        next,
        results: mut found,
    } = merge.into_inner();
    results.append(&mut found);
    next
}

/// Runs rounds until the frontier is empty.
pub(crate) fn parallel_breadth_join(
    a: &RTree,
    b: &RTree,
    workers: usize,
    schedule: Schedule,
) -> JoinOutcome {
    let mut outcome = JoinOutcome::default();
    let mut frontier = vec![(a.root_id(), b.root_id())];

    while !frontier.is_empty() {
        outcome.rounds += 1;
        frontier = bfs_round(a, b, &frontier, workers, schedule, &mut outcome.pairs);
        log::debug!(
            "BFS round {}: {} pairs in next frontier, {} results so far",
            outcome.rounds,
            frontier.len(),
            outcome.pairs.len()
        );
    }
    outcome
}
