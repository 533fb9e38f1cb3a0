use std::hash::Hash;

/// Axis of the 2D coordinate space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, serde::Deserialize, serde::Serialize)]
pub enum Axis {
    /// First dimension (`low0`/`high0`)
    #[default]
    Dim0,
    /// Second dimension (`low1`/`high1`)
    Dim1,
}

impl Axis {
    /// Returns the other axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::Dim0 => Axis::Dim1,
            Axis::Dim1 => Axis::Dim0,
        }
    }
}

/// A minimum bounding rectangle (MBR).
///
/// `Mbr` describes an axis-aligned rectangle through its low and high bound
/// on each of the two axes. Bounds are stored as 4-byte floats, which is also
/// the precision of the on-disk page format.
///
/// The type does not enforce `low <= high`; callers must supply valid bounds.
///
/// # Examples
///
/// ```rust
/// use rtree_join::Mbr;
///
/// let a = Mbr::new(0.0, 2.0, 0.0, 2.0);
/// let b = Mbr::new(2.0, 4.0, 0.0, 2.0);
///
/// // Rectangles sharing an edge intersect
/// assert!(a.intersects(&b));
/// ```
#[derive(Clone, Copy, PartialEq, Default, Debug, serde::Deserialize, serde::Serialize)]
pub struct Mbr {
    /// Low bound on axis 0
    pub low0: f32,
    /// High bound on axis 0
    pub high0: f32,
    /// Low bound on axis 1
    pub low1: f32,
    /// High bound on axis 1
    pub high1: f32,
}

impl Eq for Mbr {}

impl Hash for Mbr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.low0.to_bits().hash(state);
        self.high0.to_bits().hash(state);
        self.low1.to_bits().hash(state);
        self.high1.to_bits().hash(state);
    }
}

impl std::fmt::Display for Mbr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mbr({}, {}, {}, {})", self.low0, self.high0, self.low1, self.high1)
    }
}

impl Mbr {
    /// Creates a new rectangle from its bounds, in `(low0, high0, low1, high1)` order.
    pub fn new(low0: f32, high0: f32, low1: f32, high1: f32) -> Mbr {
        Mbr {
            low0,
            high0,
            low1,
            high1,
        }
    }

    /// The identity element of [`Mbr::union`]: low bounds at `+inf`, high bounds at `-inf`.
    pub fn empty() -> Mbr {
        Mbr {
            low0: f32::INFINITY,
            high0: f32::NEG_INFINITY,
            low1: f32::INFINITY,
            high1: f32::NEG_INFINITY,
        }
    }

    /// Component-wise min/max over a set of rectangles.
    ///
    /// Returns `None` for an empty iterator.
    pub fn bounding<'a, I>(rects: I) -> Option<Mbr>
    where
        I: IntoIterator<Item = &'a Mbr>,
    {
        let mut iter = rects.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, r| acc.union(r)))
    }

    /// Closed-interval overlap test. Rectangles touching at an edge or corner intersect.
    #[inline]
    pub fn intersects(&self, other: &Mbr) -> bool {
        self.low0 <= other.high0
            && self.high0 >= other.low0
            && self.low1 <= other.high1
            && self.high1 >= other.low1
    }

    /// Returns the smallest rectangle covering both.
    pub fn union(&self, other: &Mbr) -> Mbr {
        Mbr::new(
            self.low0.min(other.low0),
            self.high0.max(other.high0),
            self.low1.min(other.low1),
            self.high1.max(other.high1),
        )
    }

    /// Grows this rectangle in place to cover `other`.
    pub fn expand(&mut self, other: &Mbr) {
        *self = self.union(other);
    }

    /// Checks if this rectangle covers another one entirely.
    pub fn contains(&self, other: &Mbr) -> bool {
        other.low0 >= self.low0
            && other.high0 <= self.high0
            && other.low1 >= self.low1
            && other.high1 <= self.high1
    }

    /// Low bound on the given axis.
    #[inline]
    pub fn low(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Dim0 => self.low0,
            Axis::Dim1 => self.low1,
        }
    }

    /// High bound on the given axis.
    #[inline]
    pub fn high(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Dim0 => self.high0,
            Axis::Dim1 => self.high1,
        }
    }

    /// Checks if the bounds are ordered (`low <= high` on both axes).
    pub fn is_valid(&self) -> bool {
        self.low0 <= self.high0 && self.low1 <= self.high1
    }

    /// Bounds as an array, in `(low0, high0, low1, high1)` order.
    pub fn to_array(&self) -> [f32; 4] {
        [self.low0, self.high0, self.low1, self.high1]
    }

    /// Inverse of [`Mbr::to_array`].
    pub fn from_array(bounds: [f32; 4]) -> Mbr {
        Mbr::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }
}
