//! Breadth/depth hybrid join.
//!
//! Runs breadth-first rounds while the frontier is small. Once a round
//! leaves at least `threshold` pairs, every remaining pair becomes an
//! independent depth-first task. The [`Schedule`] covers both phases: it
//! splits each round's frontier and hands out the depth-first tasks.

use parking_lot::Mutex;

use crate::config::Schedule;
use crate::parallel::scheduled_fold;
use crate::rtree::{IdPair, RTree};

use super::bfs::bfs_round;
use super::sync_traversal::join_subtrees;
use super::{JoinOutcome, NodePair};

pub(crate) fn hybrid_join(
    a: &RTree,
    b: &RTree,
    workers: usize,
    threshold: usize,
    schedule: Schedule,
) -> JoinOutcome {
    let mut outcome = JoinOutcome::default();
    let mut frontier = vec![(a.root_id(), b.root_id())];

    loop {
        outcome.rounds += 1;
        frontier = bfs_round(a, b, &frontier, workers, schedule, &mut outcome.pairs);

        if frontier.is_empty() {
            log::debug!("Hybrid join reached the leaves after {} rounds", outcome.rounds);
            break;
        }
        if frontier.len() >= threshold {
            log::info!(
                "Hybrid join dispatching {} depth-first tasks after round {} ({:?})",
                frontier.len(),
                outcome.rounds,
                schedule
            );
            outcome.dispatched_tasks = frontier.len();
            dispatch_depth_first(a, b, &frontier, workers, schedule, &mut outcome.pairs);
            break;
        }
    }
    outcome
}

/// Runs one depth-first traversal per pair on `workers` threads and waits
/// for all of them.
fn dispatch_depth_first(
    a: &RTree,
    b: &RTree,
    tasks: &[NodePair],
    workers: usize,
    schedule: Schedule,
    results: &mut Vec<IdPair>,
) {
    let merged = Mutex::new(Vec::new());
    scheduled_fold(
        tasks,
        workers,
        schedule,
        Vec::new,
        |local: &mut Vec<IdPair>, pair| join_subtrees(a, b, pair, local),
        |mut local| merged.lock().append(&mut local),
    );
    results.append(&mut merged.into_inner());
}
