//! Geometry primitives used across trellis.

#![warn(missing_docs)]

/// Margin and padding edges.
mod edges;
/// Width/height size type.
mod expanse;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;

use serde::{Deserialize, Serialize};

pub use edges::Edges;
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;

/// The two layout axes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Along the x axis.
    #[default]
    Horizontal,
    /// Along the y axis.
    Vertical,
}

impl Orientation {
    /// The perpendicular orientation.
    pub fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}
