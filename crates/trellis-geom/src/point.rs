use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::Orientation;

/// A location in window coordinates.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: u32,
    /// Vertical coordinate.
    pub y: u32,
}

impl Point {
    /// The origin.
    pub fn zero() -> Self {
        (0, 0).into()
    }

    /// Coordinate along an axis.
    pub fn along(&self, o: Orientation) -> u32 {
        match o {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Move the point along an axis, saturating at the coordinate bounds.
    pub fn offset(&self, o: Orientation, delta: u32) -> Self {
        match o {
            Orientation::Horizontal => Self {
                x: self.x.saturating_add(delta),
                y: self.y,
            },
            Orientation::Vertical => Self {
                x: self.x,
                y: self.y.saturating_add(delta),
            },
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

impl From<(u32, u32)> for Point {
    #[inline]
    fn from(v: (u32, u32)) -> Self {
        Self { x: v.0, y: v.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(Point::zero() + (1u32, 1u32).into(), (1u32, 1u32).into());
        assert_eq!(Point::zero() + (1u32, 0u32).into(), (1u32, 0u32).into());
        assert_eq!(
            Point::from((u32::MAX, 0)) + (1u32, 0u32).into(),
            (u32::MAX, 0u32).into()
        );
    }

    #[test]
    fn offset_along_axis() {
        let p = Point::from((3, 4));
        assert_eq!(p.offset(Orientation::Horizontal, 2), Point::from((5, 4)));
        assert_eq!(p.offset(Orientation::Vertical, 2), Point::from((3, 6)));
        assert_eq!(p.along(Orientation::Vertical), 4);
    }
}
