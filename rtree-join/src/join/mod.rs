//! Tree-against-tree spatial joins.
//!
//! All strategies walk both trees from their roots and descend only into
//! node pairs whose rectangles intersect. They differ in how the work is
//! scheduled:
//!
//! - [`JoinStrategy::Synchronous`]: recursive depth-first descent on the
//!   calling thread
//! - [`JoinStrategy::ParallelBreadth`]: level-synchronous rounds over a
//!   frontier of node pairs, each round expanded by a pool of workers
//! - [`JoinStrategy::Hybrid`]: breadth-first rounds until the frontier is
//!   large enough, then one depth-first task per remaining pair
//!
//! Every strategy produces the same set of pairs; order is unspecified.

pub(crate) mod bfs;
pub(crate) mod hybrid;
pub(crate) mod sync_traversal;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::JoinConfig;
use crate::rtree::{IdPair, NodeId, RTree};

/// A pair of node ids, one from each tree.
pub(crate) type NodePair = (NodeId, NodeId);

/// How a tree join schedules its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinStrategy {
    Synchronous,
    ParallelBreadth,
    Hybrid,
}

impl JoinStrategy {
    pub const ALL: [JoinStrategy; 3] = [
        JoinStrategy::Synchronous,
        JoinStrategy::ParallelBreadth,
        JoinStrategy::Hybrid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JoinStrategy::Synchronous => "synchronous",
            JoinStrategy::ParallelBreadth => "parallel_breadth",
            JoinStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JoinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synchronous" | "sync" => Ok(JoinStrategy::Synchronous),
            "parallel_breadth" | "bfs" => Ok(JoinStrategy::ParallelBreadth),
            "hybrid" => Ok(JoinStrategy::Hybrid),
            other => Err(format!("unknown join strategy: {}", other)),
        }
    }
}

/// Pairs found by a join, plus how the traversal went.
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    /// `(object id from A, object id from B)`; no duplicates, no order
    pub pairs: Vec<IdPair>,
    /// Breadth-first rounds run (0 for the synchronous strategy)
    pub rounds: usize,
    /// Depth-first tasks handed out by the hybrid strategy
    pub dispatched_tasks: usize,
}

impl JoinOutcome {
    pub fn into_set(self) -> HashSet<IdPair> {
        self.pairs.into_iter().collect()
    }
}

/// A join of two trees with a given configuration.
///
/// # Examples
///
/// ```rust
/// use rtree_join::{build_index, Entry, JoinConfig, JoinStrategy, Mbr, TreeJoin};
///
/// let a = build_index(Entry::from_rects(vec![Mbr::new(0.0, 2.0, 0.0, 2.0)]), 16, 1.0).unwrap();
/// let b = build_index(
///     Entry::from_rects(vec![Mbr::new(2.0, 4.0, 0.0, 2.0), Mbr::new(3.0, 5.0, 0.0, 2.0)]),
///     16,
///     1.0,
/// )
/// .unwrap();
///
/// let outcome = TreeJoin::new(&a, &b)
///     .with_config(JoinConfig::with_workers(2))
///     .run(JoinStrategy::Hybrid);
/// assert_eq!(outcome.pairs, vec![(0, 0)]);
/// ```
pub struct TreeJoin<'a> {
    a: &'a RTree,
    b: &'a RTree,
    config: JoinConfig,
}

impl<'a> TreeJoin<'a> {
    pub fn new(a: &'a RTree, b: &'a RTree) -> Self {
        Self {
            a,
            b,
            config: JoinConfig::default(),
        }
    }

    pub fn with_config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run(&self, strategy: JoinStrategy) -> JoinOutcome {
        let workers = self.config.effective_workers();
        let outcome = match strategy {
            JoinStrategy::Synchronous => JoinOutcome {
                pairs: sync_traversal::synchronous_join(self.a, self.b),
                ..Default::default()
            },
            JoinStrategy::ParallelBreadth => {
                bfs::parallel_breadth_join(self.a, self.b, workers, self.config.schedule)
            }
            JoinStrategy::Hybrid => hybrid::hybrid_join(
                self.a,
                self.b,
                workers,
                self.config.effective_hybrid_threshold(),
                self.config.schedule,
            ),
        };

        log::info!(
            "{} join of {} x {} objects found {} pairs ({} rounds, {} tasks, {} workers, {:?} schedule)",
            strategy,
            self.a.len(),
            self.b.len(),
            outcome.pairs.len(),
            outcome.rounds,
            outcome.dispatched_tasks,
            workers,
            self.config.schedule
        );
        outcome
    }
}
