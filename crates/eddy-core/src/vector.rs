//! The per-cell flow direction.

use std::fmt;

/// A unit-or-zero direction with each component in `{-1, 0, 1}`.
///
/// Produced by the flow stage of a flow field: the offset to the
/// neighbour that most reduces path cost. Components are independent,
/// so a diagonal may be reduced to a cardinal direction by zeroing one
/// axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlowVector {
    /// Horizontal component: `-1` left, `1` right.
    pub x: i8,
    /// Vertical component: `-1` down, `1` up.
    pub y: i8,
}

impl FlowVector {
    /// No improving neighbour.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Build a vector from a neighbour offset.
    ///
    /// # Panics
    ///
    /// Panics if either component lies outside `-1..=1`.
    pub fn from_offset(dx: i32, dy: i32) -> Self {
        assert!(
            (-1..=1).contains(&dx) && (-1..=1).contains(&dy),
            "flow offset ({dx}, {dy}) is not a unit step"
        );
        Self {
            x: dx as i8,
            y: dy as i8,
        }
    }

    /// Whether both components are zero.
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Whether both components are nonzero.
    pub fn is_diagonal(self) -> bool {
        self.x != 0 && self.y != 0
    }

    /// Components widened to `(dx, dy)`.
    pub fn offset(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    /// A single glyph for debug rendering.
    pub fn glyph(self) -> char {
        match (self.x, self.y) {
            (0, 0) => '·',
            (0, 1) => '↑',
            (1, 0) => '→',
            (0, -1) => '↓',
            (-1, 0) => '←',
            (1, 1) => '↗',
            (1, -1) => '↘',
            (-1, 1) => '↖',
            _ => '↙',
        }
    }
}

impl fmt::Display for FlowVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
