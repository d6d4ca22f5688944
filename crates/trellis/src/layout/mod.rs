//! Size types and the built-in containers.
//!
//! Containers never talk to native controls directly. They measure and
//! allocate their children through a [`LayoutPass`], which owns caching,
//! margins, alignment and error reporting.

/// Box packing along one axis.
pub mod boxed;
/// Size types shared by every container.
mod size;
/// Grid packing with cell spans.
pub mod table;
/// Top-level windows.
pub mod window;

pub use boxed::{BoxItem, BoxLayout, BoxPlacement, PackMode, PackOrigin, distribute};
pub use size::{Align, Constraint, Constraints, Measurement, SizeMode, SizeRequest};
pub use table::{AttachOptions, CellRequest, CellSizes, Cells, TableLayout, TablePlacement};
pub use window::WindowState;

use crate::{core::pass::LayoutPass, geom::Rect};

/// Layout behavior shared by built-in containers.
pub(crate) trait Container {
    /// Measure the container's content under a constraint pair. Margins and
    /// overrides of the container node itself are handled by the caller.
    fn measure(&self, pass: &mut LayoutPass<'_>, c: Constraints) -> Measurement;

    /// Distribute `rect` among the visible children and allocate each one.
    fn allocate(&mut self, pass: &mut LayoutPass<'_>, rect: Rect);
}

/// Split `total` units into `count` integer shares that differ by at most
/// one. Leftover units go to the earliest shares first.
pub fn split_evenly(total: u64, count: usize) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as u64;
    let base = total / n;
    let extra = total % n;
    (0..n)
        .map(|i| {
            let share = if i < extra { base + 1 } else { base };
            u32::try_from(share).unwrap_or(u32::MAX)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_evenly_sums() {
        assert_eq!(split_evenly(10, 3), vec![4, 3, 3]);
        assert_eq!(split_evenly(2, 3), vec![1, 1, 0]);
        assert_eq!(split_evenly(0, 2), vec![0, 0]);
        assert!(split_evenly(5, 0).is_empty());
    }

    #[test]
    fn split_evenly_leftmost_first() {
        let shares = split_evenly(7, 4);
        assert_eq!(shares, vec![2, 2, 2, 1]);
    }
}
