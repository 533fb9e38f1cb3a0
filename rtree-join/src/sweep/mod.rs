//! Partitioned plane-sweep join over unindexed inputs.
//!
//! The partition axis is cut into equal stripes over the joint bounds of
//! both inputs, and each rectangle is copied into every stripe it overlaps.
//! Each stripe is then swept along the other axis with one active set per
//! input. A pair found in several stripes is reported only by the stripe
//! that holds the larger of the two low bounds on the partition axis.

pub mod event;
pub mod stripes;

use std::collections::HashSet;

use crate::config::PlaneSweepConfig;
use crate::mbr::{Axis, Mbr};
use crate::parallel::{scoped_map, scoped_map_mut};
use crate::rtree::{Entry, IdPair, SpatialResult};

use event::{Event, Side};
use stripes::StripeGrid;

/// Plane-sweep join with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct PlaneSweep {
    config: PlaneSweepConfig,
}

impl PlaneSweep {
    pub fn new(config: PlaneSweepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaneSweepConfig {
        &self.config
    }

    /// Joins `a` against `b`; every intersecting pair is reported exactly once
    /// as `(a.id, b.id)`.
    pub fn run(&self, a: &[Entry], b: &[Entry]) -> SpatialResult<Vec<IdPair>> {
        self.config.validate()?;
        if a.is_empty() || b.is_empty() {
            return Ok(Vec::new());
        }

        let axis = self.config.axis;
        let bounds = Mbr::bounding(a.iter().chain(b.iter()).map(|e| &e.mbr))
            .unwrap_or_default();
        let grid = StripeGrid::new(
            bounds.low(axis),
            bounds.high(axis),
            self.config.num_partitions,
        );

        let mut stripes = partition(&grid, axis, a, b, self.config.workers);
        let pairs: Vec<IdPair> = scoped_map_mut(&mut stripes, self.config.workers, |first, chunk| {
            let mut local = Vec::new();
            for (offset, events) in chunk.iter_mut().enumerate() {
                let k = first + offset;
                sweep_stripe(events, a, b, axis, grid.lower_bound(k), &mut local);
                // swept stripes are not read again
                *events = Vec::new();
            }
            local
        })
        .into_iter()
        .flatten()
        .collect();

        log::info!(
            "Plane sweep of {} x {} objects over {} stripes on {:?} found {} pairs",
            a.len(),
            b.len(),
            grid.count(),
            axis,
            pairs.len()
        );
        Ok(pairs)
    }
}

/// Distributes bottom and top events of both inputs into their stripes.
fn partition(
    grid: &StripeGrid,
    axis: Axis,
    a: &[Entry],
    b: &[Entry],
    workers: usize,
) -> Vec<Vec<Event>> {
    let mut stripes: Vec<Vec<Event>> = vec![Vec::new(); grid.count()];
    for (side, entries) in [(Side::A, a), (Side::B, b)] {
        let indexed: Vec<(usize, &Entry)> = entries.iter().enumerate().collect();
        let locals = scoped_map(&indexed, workers, |chunk| {
            let mut local: Vec<Vec<Event>> = vec![Vec::new(); grid.count()];
            for &(index, entry) in chunk {
                let sweep = axis.other();
                let bottom = Event::new(entry.mbr.low(sweep), true, side, index);
                let top = Event::new(entry.mbr.high(sweep), false, side, index);
                for k in grid.span(entry.mbr.low(axis), entry.mbr.high(axis)) {
                    local[k].push(bottom);
                    local[k].push(top);
                }
            }
            local
        });
        for local in locals {
            for (stripe, mut events) in stripes.iter_mut().zip(local) {
                stripe.append(&mut events);
            }
        }
    }
    stripes
}

/// Sweeps the events of one stripe and appends the pairs it owns to `out`.
fn sweep_stripe(
    events: &mut [Event],
    a: &[Entry],
    b: &[Entry],
    axis: Axis,
    stripe_low: f64,
    out: &mut Vec<IdPair>,
) {
    events.sort_by(Event::sweep_order);

    let mut active_a: HashSet<usize> = HashSet::new();
    let mut active_b: HashSet<usize> = HashSet::new();

    for event in events.iter() {
        match (event.side, event.bottom) {
            (Side::A, true) => {
                active_a.insert(event.index);
                let ea = &a[event.index];
                for &j in &active_b {
                    let eb = &b[j];
                    if owns_pair(&ea.mbr, &eb.mbr, axis, stripe_low) {
                        out.push((ea.id, eb.id));
                    }
                }
            }
            (Side::B, true) => {
                active_b.insert(event.index);
                let eb = &b[event.index];
                for &i in &active_a {
                    let ea = &a[i];
                    if owns_pair(&ea.mbr, &eb.mbr, axis, stripe_low) {
                        out.push((ea.id, eb.id));
                    }
                }
            }
            (Side::A, false) => {
                active_a.remove(&event.index);
            }
            (Side::B, false) => {
                active_b.remove(&event.index);
            }
        }
    }
}

#[inline]
fn owns_pair(ra: &Mbr, rb: &Mbr, axis: Axis, stripe_low: f64) -> bool {
    ra.intersects(rb) && f64::from(ra.low(axis).max(rb.low(axis))) >= stripe_low
}

/// Brute-force join: tests every pair.
pub fn nested_loop_join(a: &[Entry], b: &[Entry]) -> Vec<IdPair> {
    let mut out = Vec::new();
    for ea in a {
        for eb in b {
            if ea.mbr.intersects(&eb.mbr) {
                out.push((ea.id, eb.id));
            }
        }
    }
    out
}
