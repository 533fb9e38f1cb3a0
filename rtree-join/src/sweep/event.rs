use std::cmp::Ordering;

/// Input a rectangle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

/// A sweep event: the bottom or top edge of a rectangle along the sweep axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub coord: f32,
    pub bottom: bool,
    pub side: Side,
    /// Position of the rectangle in its input slice
    pub index: usize,
}

impl Event {
    pub fn new(coord: f32, bottom: bool, side: Side, index: usize) -> Self {
        Self {
            // fold -0.0 into 0.0 so equal coordinates compare equal
            coord: coord + 0.0,
            bottom,
            side,
            index,
        }
    }

    /// Sweep order: ascending coordinate, bottom edges before top edges on
    /// ties so rectangles that only touch still meet in the active sets.
    pub fn sweep_order(&self, other: &Event) -> Ordering {
        self.coord
            .total_cmp(&other.coord)
            .then_with(|| other.bottom.cmp(&self.bottom))
    }
}
