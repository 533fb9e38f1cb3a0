//! Seeded rectangle generators for join tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rtree_join::{Entry, Mbr};

/// Rectangles spread uniformly over `[0, extent)` on both axes, with
/// sides up to `max_side`.
pub fn uniform_rects(count: usize, extent: f32, max_side: f32, seed: u64) -> Vec<Entry> {
    let mut rng = StdRng::seed_from_u64(seed);
    Entry::from_rects((0..count).map(|_| {
        let x = rng.random_range(0.0..extent);
        let y = rng.random_range(0.0..extent);
        let w = rng.random_range(0.0..=max_side);
        let h = rng.random_range(0.0..=max_side);
        Mbr::new(x, x + w, y, y + h)
    }))
}

/// Degenerate rectangles on an integer grid, so many of them coincide or
/// touch.
pub fn grid_points(count: usize, cells: u32, seed: u64) -> Vec<Entry> {
    let mut rng = StdRng::seed_from_u64(seed);
    Entry::from_rects((0..count).map(|_| {
        let x = rng.random_range(0..cells) as f32;
        let y = rng.random_range(0..cells) as f32;
        Mbr::new(x, x, y, y)
    }))
}

/// Rectangles gathered around a few centres, mixing small and wide shapes.
pub fn clustered_rects(count: usize, clusters: usize, seed: u64) -> Vec<Entry> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centres: Vec<(f32, f32)> = (0..clusters.max(1))
        .map(|_| (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
        .collect();

    Entry::from_rects((0..count).map(|_| {
        let (cx, cy) = centres[rng.random_range(0..centres.len())];
        let x = cx + rng.random_range(-40.0..40.0);
        let y = cy + rng.random_range(-40.0..40.0);
        let (w, h) = if rng.random_bool(0.1) {
            (rng.random_range(50.0..200.0), rng.random_range(0.0..5.0))
        } else {
            (rng.random_range(0.0..4.0), rng.random_range(0.0..4.0))
        };
        Mbr::new(x, x + w, y, y + h)
    }))
}

/// Rectangles on an integer lattice whose sides end exactly on the
/// neighbouring cell, so adjacent objects share edges.
pub fn touching_tiles(columns: u32, rows: u32) -> Vec<Entry> {
    Entry::from_rects((0..rows).flat_map(|row| {
        (0..columns).map(move |col| {
            let x = col as f32;
            let y = row as f32;
            Mbr::new(x, x + 1.0, y, y + 1.0)
        })
    }))
}
