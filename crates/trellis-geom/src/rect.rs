use serde::{Deserialize, Serialize};

use super::{Edges, Expanse, Orientation, Point};

/// An axis-aligned rectangle in window coordinates.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero-sized rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The size of this rectangle.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// Extent along an axis.
    pub fn along(&self, o: Orientation) -> u32 {
        self.expanse().along(o)
    }

    /// True if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Shrink the rectangle by the given edges. Edges larger than the
    /// rectangle collapse it to zero extent on that axis.
    pub fn inset(&self, edges: Edges) -> Self {
        let x = self.tl.x.saturating_add(edges.left);
        let y = self.tl.y.saturating_add(edges.top);
        Self::new(
            x,
            y,
            self.w.saturating_sub(edges.horizontal()),
            self.h.saturating_sub(edges.vertical()),
        )
    }

    /// Take a sub-range of this rectangle along one axis, keeping the full
    /// extent on the other.
    pub fn slice(&self, o: Orientation, offset: u32, size: u32) -> Self {
        let tl = self.tl.offset(o, offset);
        match o {
            Orientation::Horizontal => Self { tl, w: size, h: self.h },
            Orientation::Vertical => Self { tl, w: self.w, h: size },
        }
    }

    /// Does this rectangle completely enclose the other?
    pub fn contains_rect(&self, other: Self) -> bool {
        other.tl.x >= self.tl.x
            && other.tl.y >= self.tl.y
            && u64::from(other.tl.x) + u64::from(other.w) <= u64::from(self.tl.x) + u64::from(self.w)
            && u64::from(other.tl.y) + u64::from(other.h) <= u64::from(self.tl.y) + u64::from(self.h)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn inset_collapses() {
        let r = Rect::new(10, 10, 4, 20);
        assert_eq!(r.inset(Edges::all(1)), Rect::new(11, 11, 2, 18));
        assert_eq!(r.inset(Edges::all(3)), Rect::new(13, 13, 0, 14));
    }

    #[test]
    fn slice_keeps_cross() {
        let r = Rect::new(5, 5, 100, 50);
        assert_eq!(
            r.slice(Orientation::Horizontal, 10, 20),
            Rect::new(15, 5, 20, 50)
        );
        assert_eq!(
            r.slice(Orientation::Vertical, 10, 20),
            Rect::new(5, 15, 100, 20)
        );
    }

    proptest! {
        #[test]
        fn inset_is_contained(
            x in 0u32..1000, y in 0u32..1000, w in 0u32..1000, h in 0u32..1000, m in 0u32..20
        ) {
            let r = Rect::new(x, y, w, h);
            let inner = r.inset(Edges::all(m));
            if !inner.is_empty() {
                prop_assert!(r.contains_rect(inner));
            }
        }
    }
}
