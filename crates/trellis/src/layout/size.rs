use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::geom::{Edges, Orientation};

/// Available extent along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Constraint {
    /// No external limit.
    #[default]
    Unbounded,
    /// A fixed available extent.
    Exact(u32),
}

impl Constraint {
    /// The fixed extent, if any.
    pub fn exact(self) -> Option<u32> {
        match self {
            Self::Unbounded => None,
            Self::Exact(n) => Some(n),
        }
    }

    /// Remove `n` units from a fixed extent, saturating at zero.
    pub fn shrink(self, n: u32) -> Self {
        match self {
            Self::Unbounded => Self::Unbounded,
            Self::Exact(v) => Self::Exact(v.saturating_sub(n)),
        }
    }
}

impl From<Option<u32>> for Constraint {
    fn from(v: Option<u32>) -> Self {
        v.map_or(Self::Unbounded, Self::Exact)
    }
}

/// A width/height constraint pair. Cached measurements are keyed on the
/// exact pair they were computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Constraints {
    /// Width constraint.
    pub width: Constraint,
    /// Height constraint.
    pub height: Constraint,
}

impl Constraints {
    /// Both axes unconstrained.
    pub const UNBOUNDED: Self = Self {
        width: Constraint::Unbounded,
        height: Constraint::Unbounded,
    };

    /// Construct a constraint pair.
    pub fn new(width: Constraint, height: Constraint) -> Self {
        Self { width, height }
    }

    /// A fixed width with unconstrained height.
    pub fn for_width(width: u32) -> Self {
        Self::new(Constraint::Exact(width), Constraint::Unbounded)
    }

    /// A fixed height with unconstrained width.
    pub fn for_height(height: u32) -> Self {
        Self::new(Constraint::Unbounded, Constraint::Exact(height))
    }

    /// Build a pair from main and cross constraints for an orientation.
    pub fn from_main_cross(o: Orientation, main: Constraint, cross: Constraint) -> Self {
        match o {
            Orientation::Horizontal => Self::new(main, cross),
            Orientation::Vertical => Self::new(cross, main),
        }
    }

    /// The constraint along an axis.
    pub fn along(&self, o: Orientation) -> Constraint {
        match o {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Remove margins from both axes.
    pub fn inset(&self, margin: Edges) -> Self {
        Self::new(
            self.width.shrink(margin.horizontal()),
            self.height.shrink(margin.vertical()),
        )
    }
}

/// A (minimum, natural) size pair along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SizeRequest {
    /// Smallest size before content is clipped.
    pub minimum: u32,
    /// Ideal size with no external constraint.
    pub natural: u32,
}

impl SizeRequest {
    /// A zero request.
    pub const ZERO: Self = Self {
        minimum: 0,
        natural: 0,
    };

    /// Construct a request. The natural size is raised to the minimum.
    pub fn new(minimum: u32, natural: u32) -> Self {
        Self {
            minimum,
            natural: natural.max(minimum),
        }
    }

    /// A request whose minimum and natural sizes are equal.
    pub fn fixed(n: u32) -> Self {
        Self::new(n, n)
    }

    /// Component-wise maximum: the request of something that must hold both.
    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.minimum.max(other.minimum),
            self.natural.max(other.natural),
        )
    }

    /// Component-wise sum: the request of both placed end to end.
    pub fn sum(self, other: Self) -> Self {
        Self::new(
            self.minimum.saturating_add(other.minimum),
            self.natural.saturating_add(other.natural),
        )
    }

    /// Add `n` to both components.
    pub fn grow(self, n: u32) -> Self {
        Self::new(
            self.minimum.saturating_add(n),
            self.natural.saturating_add(n),
        )
    }

    /// Remove `n` from both components, saturating at zero.
    pub fn shrink(self, n: u32) -> Self {
        Self::new(
            self.minimum.saturating_sub(n),
            self.natural.saturating_sub(n),
        )
    }

    /// Apply explicit overrides: `min` raises the minimum, `natural`
    /// replaces the natural size (never below the minimum).
    pub fn with_overrides(self, min: Option<u32>, natural: Option<u32>) -> Self {
        let minimum = min.map_or(self.minimum, |m| m.max(self.minimum));
        Self::new(minimum, natural.unwrap_or(self.natural))
    }
}

impl Add for SizeRequest {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.sum(other)
    }
}

/// Size requests for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Measurement {
    /// Horizontal request.
    pub width: SizeRequest,
    /// Vertical request.
    pub height: SizeRequest,
}

impl Measurement {
    /// A zero measurement.
    pub const ZERO: Self = Self {
        width: SizeRequest::ZERO,
        height: SizeRequest::ZERO,
    };

    /// Construct a measurement.
    pub fn new(width: SizeRequest, height: SizeRequest) -> Self {
        Self { width, height }
    }

    /// A measurement whose minimum and natural sizes coincide.
    pub fn fixed(w: u32, h: u32) -> Self {
        Self::new(SizeRequest::fixed(w), SizeRequest::fixed(h))
    }

    /// Build a measurement from main and cross requests.
    pub fn from_main_cross(o: Orientation, main: SizeRequest, cross: SizeRequest) -> Self {
        match o {
            Orientation::Horizontal => Self::new(main, cross),
            Orientation::Vertical => Self::new(cross, main),
        }
    }

    /// The request along an axis.
    pub fn along(&self, o: Orientation) -> SizeRequest {
        match o {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Add margins to both axes.
    pub fn outset(&self, margin: Edges) -> Self {
        Self::new(
            self.width.grow(margin.horizontal()),
            self.height.grow(margin.vertical()),
        )
    }
}

/// Which axis a widget's natural size is a function of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SizeMode {
    /// Height depends on the allocated width (wrapping text, flow layouts).
    #[default]
    HeightForWidth,
    /// Width depends on the allocated height (vertical text).
    WidthForHeight,
}

impl SizeMode {
    /// True if the size along `axis` should be queried with the other axis
    /// constrained.
    pub fn depends(self, axis: Orientation) -> bool {
        matches!(
            (self, axis),
            (Self::HeightForWidth, Orientation::Vertical)
                | (Self::WidthForHeight, Orientation::Horizontal)
        )
    }

    /// The axis that is resolved first.
    pub fn leading_axis(self) -> Orientation {
        match self {
            Self::HeightForWidth => Orientation::Horizontal,
            Self::WidthForHeight => Orientation::Vertical,
        }
    }
}

/// Placement of a widget inside the space its parent allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Align {
    /// Take the whole allocation.
    #[default]
    Fill,
    /// Natural size at the start.
    Start,
    /// Natural size, centered.
    Center,
    /// Natural size at the end.
    End,
}

impl Align {
    /// Offset of a child that leaves `free` units of its allocation unused.
    pub fn offset(self, free: u32) -> u32 {
        match self {
            Self::Start => 0,
            Self::Fill | Self::Center => free / 2,
            Self::End => free,
        }
    }

    /// Size of a child with natural size `natural` inside `available`.
    pub fn fit(self, natural: u32, available: u32) -> u32 {
        match self {
            Self::Fill => available,
            _ => natural.min(available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_natural_never_below_minimum() {
        assert_eq!(SizeRequest::new(10, 4), SizeRequest::new(10, 10));
        assert_eq!(
            SizeRequest::new(2, 5).with_overrides(Some(8), None),
            SizeRequest::new(8, 8)
        );
        assert_eq!(
            SizeRequest::new(2, 5).with_overrides(None, Some(3)),
            SizeRequest::new(2, 3)
        );
        assert_eq!(
            SizeRequest::new(2, 5).with_overrides(Some(1), Some(1)),
            SizeRequest::new(2, 2)
        );
    }

    #[test]
    fn union_and_sum() {
        let a = SizeRequest::new(1, 10);
        let b = SizeRequest::new(5, 6);
        assert_eq!(a.union(b), SizeRequest::new(5, 10));
        assert_eq!(a + b, SizeRequest::new(6, 16));
        assert_eq!(a.grow(2).shrink(3), SizeRequest::new(0, 9));
    }

    #[test]
    fn constraints_inset() {
        let c = Constraints::for_width(10).inset(Edges::all(3));
        assert_eq!(c, Constraints::for_width(4));
        let c = Constraints::for_height(2).inset(Edges::all(3));
        assert_eq!(c.height, Constraint::Exact(0));
    }

    #[test]
    fn size_mode_dependency() {
        assert!(SizeMode::HeightForWidth.depends(Orientation::Vertical));
        assert!(!SizeMode::HeightForWidth.depends(Orientation::Horizontal));
        assert!(SizeMode::WidthForHeight.depends(Orientation::Horizontal));
    }

    #[test]
    fn align_offsets() {
        assert_eq!(Align::Start.offset(10), 0);
        assert_eq!(Align::Center.offset(11), 5);
        assert_eq!(Align::End.offset(10), 10);
        assert_eq!(Align::Fill.fit(3, 10), 10);
        assert_eq!(Align::End.fit(30, 10), 10);
    }
}
