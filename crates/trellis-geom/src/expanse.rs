use serde::{Deserialize, Serialize};

use super::{Orientation, Point, Rect};

/// An `Expanse` is a rectangle that has a width and height but no location.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Expanse {
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Expanse {
    /// Construct an expanse.
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Extent along an axis.
    pub fn along(&self, o: Orientation) -> u32 {
        match o {
            Orientation::Horizontal => self.w,
            Orientation::Vertical => self.h,
        }
    }

    /// Build an expanse from main and cross extents for an orientation.
    pub fn from_main_cross(o: Orientation, main: u32, cross: u32) -> Self {
        match o {
            Orientation::Horizontal => Self { w: main, h: cross },
            Orientation::Vertical => Self { w: cross, h: main },
        }
    }

    /// Return a `Rect` with the same dimensions as the `Expanse`, but a location at (0, 0).
    pub fn rect(&self) -> Rect {
        Rect {
            tl: Point::default(),
            w: self.w,
            h: self.h,
        }
    }

    /// True if this expanse can completely enclose the target in both dimensions.
    pub fn contains(&self, other: &Self) -> bool {
        self.w >= other.w && self.h >= other.h
    }
}

impl From<Rect> for Expanse {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(u32, u32)> for Expanse {
    fn from(v: (u32, u32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}
