use serde::{Deserialize, Serialize};

use crate::Orientation;

/// Space around the four sides of a rectangle.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Edges {
    /// Space above.
    pub top: u32,
    /// Space to the right.
    pub right: u32,
    /// Space below.
    pub bottom: u32,
    /// Space to the left.
    pub left: u32,
}

impl Edges {
    /// Construct edges from explicit sides.
    pub fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same space on every side.
    pub fn all(n: u32) -> Self {
        Self::new(n, n, n, n)
    }

    /// Symmetric horizontal and vertical space.
    pub fn symmetric(horizontal: u32, vertical: u32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Combined left and right space.
    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// Combined top and bottom space.
    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }

    /// Combined space along an axis.
    pub fn along(&self, o: Orientation) -> u32 {
        match o {
            Orientation::Horizontal => self.horizontal(),
            Orientation::Vertical => self.vertical(),
        }
    }

    /// Space before the start of an axis (left or top).
    pub fn leading(&self, o: Orientation) -> u32 {
        match o {
            Orientation::Horizontal => self.left,
            Orientation::Vertical => self.top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums() {
        let e = Edges::new(1, 2, 3, 4);
        assert_eq!(e.horizontal(), 6);
        assert_eq!(e.vertical(), 4);
        assert_eq!(e.along(Orientation::Vertical), 4);
        assert_eq!(e.leading(Orientation::Horizontal), 4);
        assert_eq!(Edges::symmetric(2, 1), Edges::new(1, 2, 1, 2));
    }
}
