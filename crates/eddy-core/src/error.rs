//! Error types for grid construction and flow-field contracts.

use std::error::Error;
use std::fmt;

use crate::id::Cell;

/// Errors from building a grid or tile map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is zero.
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The grid has more cells than integration costs can represent.
    TooManyCells {
        /// Requested cell count.
        cells: usize,
        /// Maximum supported cell count.
        max: usize,
    },
    /// A text map has rows of differing lengths.
    RaggedRows {
        /// Zero-based line index of the offending row.
        line: usize,
        /// Expected number of columns.
        expected: usize,
        /// Columns found on that line.
        found: usize,
    },
    /// A text map contains a character with no tile meaning.
    UnknownTile {
        /// The unrecognised character.
        glyph: char,
        /// Zero-based line index.
        line: usize,
        /// Zero-based column within the line.
        column: usize,
    },
    /// A tile layer does not fit in the four-bit layer nibble.
    LayerOutOfRange {
        /// The rejected layer.
        layer: u8,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "grid {width}x{height} has no cells")
            }
            Self::TooManyCells { cells, max } => {
                write!(f, "grid has {cells} cells, maximum is {max}")
            }
            Self::RaggedRows {
                line,
                expected,
                found,
            } => write!(
                f,
                "map line {line} has {found} columns, expected {expected}"
            ),
            Self::UnknownTile {
                glyph,
                line,
                column,
            } => write!(f, "unknown tile '{glyph}' at line {line}, column {column}"),
            Self::LayerOutOfRange { layer } => {
                write!(f, "tile layer {layer} does not fit in 4 bits")
            }
        }
    }
}

impl Error for GridError {}

/// Violations of the flow-field calculation contract, for callers that
/// validate before calculating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The goal cell lies outside the grid.
    GoalOutOfBounds {
        /// The rejected goal.
        goal: Cell,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// The grid dimensions passed to a calculation differ from the
    /// dimensions the field's buffers were allocated for.
    DimensionMismatch {
        /// Dimensions the buffers hold, as `(width, height)`.
        allocated: (u32, u32),
        /// Dimensions requested, as `(width, height)`.
        requested: (u32, u32),
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoalOutOfBounds {
                goal,
                width,
                height,
            } => write!(f, "goal {goal} outside {width}x{height} grid"),
            Self::DimensionMismatch {
                allocated,
                requested,
            } => write!(
                f,
                "field allocated for {}x{} but asked to calculate {}x{}",
                allocated.0, allocated.1, requested.0, requested.1
            ),
        }
    }
}

impl Error for FieldError {}
