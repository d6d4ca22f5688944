//! Geometry primitives, re-exported from `trellis-geom`.

pub use trellis_geom::{Edges, Expanse, Orientation, Point, Rect};
