//! Equal-width stripes over one axis.

use std::ops::RangeInclusive;

/// Cuts `[low, high]` into `count` stripes of equal width.
///
/// Stripe `k` covers `lower_bound(k) <= v < lower_bound(k + 1)`; the last
/// stripe also takes everything at or above its lower bound. The index
/// computation and the bounds agree exactly, so a value always falls into
/// the stripe whose lower bound it is compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripeGrid {
    low: f64,
    width: f64,
    count: usize,
}

impl StripeGrid {
    /// Creates a grid of `count` stripes (`count >= 1`).
    ///
    /// A zero or non-finite extent cannot be divided, so it yields a single
    /// stripe.
    pub fn new(low: f32, high: f32, count: usize) -> Self {
        let low = f64::from(low);
        let extent = f64::from(high) - low;
        let count = count.max(1);

        if !(extent.is_finite() && extent > 0.0) {
            if count > 1 {
                log::warn!(
                    "Partition extent is {}; using a single stripe instead of {}",
                    extent,
                    count
                );
            }
            return Self {
                low,
                width: 0.0,
                count: 1,
            };
        }

        Self {
            low,
            width: extent / count as f64,
            count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Lowest value belonging to stripe `k`.
    #[inline]
    pub fn lower_bound(&self, k: usize) -> f64 {
        self.low + k as f64 * self.width
    }

    /// Stripe holding `v`, clamped to the grid.
    pub fn stripe_of(&self, v: f32) -> usize {
        if self.count == 1 {
            return 0;
        }
        let v = f64::from(v);
        let estimate = ((v - self.low) / self.width).floor();
        let mut idx = if estimate.is_nan() || estimate < 0.0 {
            0
        } else {
            (estimate as usize).min(self.count - 1)
        };

        // the division may land one stripe off near a boundary
        while idx + 1 < self.count && self.lower_bound(idx + 1) <= v {
            idx += 1;
        }
        while idx > 0 && self.lower_bound(idx) > v {
            idx -= 1;
        }
        idx
    }

    /// Stripes touched by the interval `[low, high]`.
    pub fn span(&self, low: f32, high: f32) -> RangeInclusive<usize> {
        self.stripe_of(low)..=self.stripe_of(high)
    }
}
