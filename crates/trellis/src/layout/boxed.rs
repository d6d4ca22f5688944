//! Box packing: one-dimensional distribution of an ordered child sequence.
//!
//! Children are packed from the start or the end of the main axis. When the
//! box has more room than its children's natural sizes, the surplus is split
//! evenly across expanding children. When it has less, every child shrinks
//! by an even share, children that would drop below their minimum are clamped,
//! and the deficit they could not absorb is spread once across the rest.

use crate::{
    core::{id::NodeId, pass::LayoutPass},
    geom::{Orientation, Rect},
    layout::{Constraints, Container, Measurement, SizeRequest, split_evenly},
};

/// How a child uses the space its box gives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackMode {
    /// Natural size, no share of surplus space.
    #[default]
    Natural,
    /// Fill the slot, no share of surplus space.
    Fill,
    /// Receive a share of surplus space, sized naturally and centered in it.
    Expand,
    /// Receive a share of surplus space and fill it.
    FillExpand,
}

impl PackMode {
    /// Build a mode from separate expand and fill flags.
    pub fn new(expand: bool, fill: bool) -> Self {
        match (expand, fill) {
            (false, false) => Self::Natural,
            (false, true) => Self::Fill,
            (true, false) => Self::Expand,
            (true, true) => Self::FillExpand,
        }
    }

    /// True if the child takes a share of surplus space.
    pub fn expands(self) -> bool {
        matches!(self, Self::Expand | Self::FillExpand)
    }

    /// True if the child fills its whole slot.
    pub fn fills(self) -> bool {
        matches!(self, Self::Fill | Self::FillExpand)
    }
}

/// The end of the main axis a child is packed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackOrigin {
    /// Packed forward from the left or top.
    #[default]
    Start,
    /// Packed backward from the right or bottom.
    End,
}

/// A child's packing parameters inside a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxPlacement {
    /// The packed child.
    pub(crate) child: NodeId,
    /// Expand and fill behaviour.
    pub(crate) pack: PackMode,
    /// Extra space on both sides along the main axis.
    pub(crate) padding: u32,
    /// Which end of the box the child is packed against.
    pub(crate) origin: PackOrigin,
    /// Slot size from the most recent distribution, padding included.
    pub(crate) next_size: u32,
}

impl BoxPlacement {
    /// Construct a placement.
    pub(crate) fn new(child: NodeId, pack: PackMode, padding: u32, origin: PackOrigin) -> Self {
        Self {
            child,
            pack,
            padding,
            origin,
            next_size: 0,
        }
    }

    /// The packed child.
    pub fn child(&self) -> NodeId {
        self.child
    }

    /// Expand and fill behaviour.
    pub fn pack(&self) -> PackMode {
        self.pack
    }

    /// Padding on both sides along the main axis.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Pack origin.
    pub fn origin(&self) -> PackOrigin {
        self.origin
    }

    /// Slot size assigned by the last distribution, padding included.
    pub fn next_size(&self) -> u32 {
        self.next_size
    }

    /// Padding on both sides.
    fn padding_total(&self) -> u32 {
        self.padding.saturating_mul(2)
    }
}

/// A box container: an orientation, spacing between children, and the
/// ordered placements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoxLayout {
    /// Main axis.
    pub(crate) orientation: Orientation,
    /// Space between adjacent visible children.
    pub(crate) spacing: u32,
    /// Placements in packing order.
    pub(crate) placements: Vec<BoxPlacement>,
}

impl BoxLayout {
    /// Construct an empty box.
    pub fn new(orientation: Orientation, spacing: u32) -> Self {
        Self {
            orientation,
            spacing,
            placements: Vec::new(),
        }
    }

    /// Main axis.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Spacing between adjacent visible children.
    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Placements in packing order.
    pub fn placements(&self) -> &[BoxPlacement] {
        &self.placements
    }

    /// The placement for a child, if it is packed in this box.
    pub fn placement(&self, child: NodeId) -> Option<&BoxPlacement> {
        self.placements.iter().find(|p| p.child == child)
    }

    /// Mutable placement for a child.
    pub(crate) fn placement_mut(&mut self, child: NodeId) -> Option<&mut BoxPlacement> {
        self.placements.iter_mut().find(|p| p.child == child)
    }

    /// Index of a child's placement.
    pub(crate) fn position(&self, child: NodeId) -> Option<usize> {
        self.placements.iter().position(|p| p.child == child)
    }

    /// Indices of placements whose child is visible.
    fn visible(&self, pass: &LayoutPass<'_>) -> Vec<usize> {
        (0..self.placements.len())
            .filter(|i| pass.visible(self.placements[*i].child))
            .collect()
    }

    /// Main-axis distribution inputs for the visible placements, given the
    /// cross extent when it is known.
    fn items(&self, pass: &mut LayoutPass<'_>, visible: &[usize], cross: Option<u32>) -> Vec<BoxItem> {
        let o = self.orientation;
        visible
            .iter()
            .map(|i| {
                let p = &self.placements[*i];
                let request = pass.request(p.child, o, cross).grow(p.padding_total());
                let expand = p.pack.expands() || pass.props(p.child).expands(o);
                BoxItem { request, expand }
            })
            .collect()
    }

    /// Total spacing between `count` visible children.
    fn gaps(&self, count: usize) -> u32 {
        let n = u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX);
        self.spacing.saturating_mul(n)
    }
}

impl Container for BoxLayout {
    fn measure(&self, pass: &mut LayoutPass<'_>, c: Constraints) -> Measurement {
        let o = self.orientation;
        let visible = self.visible(pass);
        if visible.is_empty() {
            return Measurement::ZERO;
        }
        let items = self.items(pass, &visible, c.along(o.flip()).exact());
        let main = items
            .iter()
            .fold(SizeRequest::ZERO, |acc, item| acc.sum(item.request))
            .grow(self.gaps(items.len()));

        let sizes = c
            .along(o)
            .exact()
            .map(|extent| distribute(&items, extent, self.spacing));
        let mut cross = SizeRequest::ZERO;
        for (n, i) in visible.iter().enumerate() {
            let p = &self.placements[*i];
            let main_size = sizes
                .as_ref()
                .map(|s| s[n].saturating_sub(p.padding_total()));
            cross = cross.union(pass.request(p.child, o.flip(), main_size));
        }
        Measurement::from_main_cross(o, main, cross)
    }

    fn allocate(&mut self, pass: &mut LayoutPass<'_>, rect: Rect) {
        let o = self.orientation;
        let visible = self.visible(pass);
        if visible.is_empty() {
            return;
        }
        let extent = rect.along(o);
        let items = self.items(pass, &visible, Some(rect.along(o.flip())));
        let sizes = distribute(&items, extent, self.spacing);

        let mut start = 0u32;
        let mut end = extent;
        for (n, i) in visible.iter().enumerate() {
            let p = &mut self.placements[*i];
            let slot = sizes[n];
            p.next_size = slot;
            let slot_offset = match p.origin {
                PackOrigin::Start => {
                    let offset = start;
                    start = start.saturating_add(slot).saturating_add(self.spacing);
                    offset
                }
                PackOrigin::End => {
                    end = end.saturating_sub(slot);
                    let offset = end;
                    end = end.saturating_sub(self.spacing);
                    offset
                }
            };

            let inner = slot.saturating_sub(p.padding_total());
            let inner_offset = slot_offset.saturating_add(p.padding);
            let (size, offset) = if p.pack.fills() || !items[n].expand {
                (inner, inner_offset)
            } else {
                let natural = items[n].request.natural.saturating_sub(p.padding_total());
                let size = natural.min(inner);
                (size, inner_offset + (inner - size) / 2)
            };
            let child = p.child;
            pass.allocate(child, rect.slice(o, offset, size));
        }
    }
}

/// One child's input to [`distribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxItem {
    /// Main-axis request, padding included.
    pub request: SizeRequest,
    /// Whether the child takes a share of surplus space.
    pub expand: bool,
}

/// Distribute `available` units along the main axis among `items`, with
/// `spacing` between adjacent items. Returns each item's size in order.
pub fn distribute(items: &[BoxItem], available: u32, spacing: u32) -> Vec<u32> {
    let mut sizes: Vec<u32> = items.iter().map(|i| i.request.natural).collect();
    if items.is_empty() {
        return sizes;
    }
    let gaps = i64::from(spacing) * (items.len() as i64 - 1);
    let natural: i64 = sizes.iter().map(|s| i64::from(*s)).sum();
    let remaining = i64::from(available) - natural - gaps;

    if remaining >= 0 {
        let expanders: Vec<usize> = (0..items.len()).filter(|i| items[*i].expand).collect();
        let shares = split_evenly(remaining.unsigned_abs(), expanders.len());
        for (i, share) in expanders.into_iter().zip(shares) {
            sizes[i] = sizes[i].saturating_add(share);
        }
    } else {
        shrink(&mut sizes, items, remaining.unsigned_abs());
    }
    sizes
}

/// Remove `deficit` units from `sizes`, respecting minimums with a single
/// redistribution round.
fn shrink(sizes: &mut [u32], items: &[BoxItem], deficit: u64) {
    let mut unabsorbed = 0u64;
    let mut clamped = vec![false; sizes.len()];
    for (i, cut) in split_evenly(deficit, sizes.len()).into_iter().enumerate() {
        let minimum = items[i].request.minimum;
        let target = i64::from(sizes[i]) - i64::from(cut);
        if target < i64::from(minimum) {
            unabsorbed += (i64::from(minimum) - target).unsigned_abs();
            sizes[i] = minimum;
            clamped[i] = true;
        } else {
            sizes[i] = target.unsigned_abs() as u32;
        }
    }

    let free: Vec<usize> = (0..sizes.len()).filter(|i| !clamped[*i]).collect();
    if unabsorbed == 0 || free.is_empty() {
        return;
    }
    let cuts = split_evenly(unabsorbed, free.len());
    for (i, cut) in free.into_iter().zip(cuts) {
        sizes[i] = sizes[i].saturating_sub(cut).max(items[i].request.minimum);
    }
}
