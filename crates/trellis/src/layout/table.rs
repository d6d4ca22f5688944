//! Grid packing with multi-cell spans.
//!
//! Each axis is solved independently, columns first. The per-axis result is
//! a [`CellSizes`] vector: single-cell requests fix cell sizes directly,
//! spanning requests add their unmet need across the cells they cover, and a
//! single conflict pass settles cells claimed by more than one span. The
//! vector is then resolved against the available extent.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    core::{
        error::{Error, Result},
        id::NodeId,
        pass::LayoutPass,
    },
    geom::{Orientation, Rect},
    layout::{Constraints, Container, Measurement, SizeRequest, split_evenly},
};

/// The cells a placement covers, as half-open ranges per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cells {
    /// First column.
    pub left: u32,
    /// One past the last column.
    pub right: u32,
    /// First row.
    pub top: u32,
    /// One past the last row.
    pub bottom: u32,
}

impl Cells {
    /// Construct a span.
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Largest accepted end index on either axis.
    pub const LIMIT: u32 = 65_535;

    /// A single cell. At `u32::MAX` the span saturates to empty and is
    /// rejected on attach.
    pub fn at(column: u32, row: u32) -> Self {
        Self::new(column, column.saturating_add(1), row, row.saturating_add(1))
    }

    /// The half-open range along an axis.
    pub fn along(&self, o: Orientation) -> (u32, u32) {
        match o {
            Orientation::Horizontal => (self.left, self.right),
            Orientation::Vertical => (self.top, self.bottom),
        }
    }

    /// Reject empty or inverted spans, and spans past [`Self::LIMIT`].
    pub(crate) fn validate(&self) -> Result<()> {
        for (start, end) in [(self.left, self.right), (self.top, self.bottom)] {
            if start >= end {
                return Err(Error::InvalidSpan { start, end });
            }
            if end > Self::LIMIT {
                return Err(Error::CellOutOfRange {
                    end,
                    limit: Self::LIMIT,
                });
            }
        }
        Ok(())
    }
}

/// Per-axis packing options for a table child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachOptions {
    /// Take a share of surplus width.
    pub expand_x: bool,
    /// Take a share of surplus height.
    pub expand_y: bool,
    /// Fill the whole column span.
    pub fill_x: bool,
    /// Fill the whole row span.
    pub fill_y: bool,
    /// Space left and right of the child inside its span.
    pub margin_x: u32,
    /// Space above and below the child inside its span.
    pub margin_y: u32,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            expand_x: false,
            expand_y: false,
            fill_x: true,
            fill_y: true,
            margin_x: 0,
            margin_y: 0,
        }
    }
}

impl AttachOptions {
    /// Set both expand flags.
    pub fn expand(mut self, x: bool, y: bool) -> Self {
        self.expand_x = x;
        self.expand_y = y;
        self
    }

    /// Set both fill flags.
    pub fn fill(mut self, x: bool, y: bool) -> Self {
        self.fill_x = x;
        self.fill_y = y;
        self
    }

    /// Set both margins.
    pub fn margin(mut self, x: u32, y: u32) -> Self {
        self.margin_x = x;
        self.margin_y = y;
        self
    }

    /// Expand flag along an axis.
    pub fn expands(&self, o: Orientation) -> bool {
        match o {
            Orientation::Horizontal => self.expand_x,
            Orientation::Vertical => self.expand_y,
        }
    }

    /// Fill flag along an axis.
    pub fn fills(&self, o: Orientation) -> bool {
        match o {
            Orientation::Horizontal => self.fill_x,
            Orientation::Vertical => self.fill_y,
        }
    }

    /// Margin along an axis, one side.
    pub fn margin_along(&self, o: Orientation) -> u32 {
        match o {
            Orientation::Horizontal => self.margin_x,
            Orientation::Vertical => self.margin_y,
        }
    }
}

/// A child attached to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlacement {
    /// The attached child.
    pub(crate) child: NodeId,
    /// Covered cells.
    pub(crate) cells: Cells,
    /// Packing options.
    pub(crate) options: AttachOptions,
    /// Offset from the table origin computed by the last allocation.
    pub(crate) offset: (u32, u32),
    /// Size computed by the last allocation.
    pub(crate) size: (u32, u32),
}

impl TablePlacement {
    /// Construct a placement.
    pub(crate) fn new(child: NodeId, cells: Cells, options: AttachOptions) -> Self {
        Self {
            child,
            cells,
            options,
            offset: (0, 0),
            size: (0, 0),
        }
    }

    /// The attached child.
    pub fn child(&self) -> NodeId {
        self.child
    }

    /// Covered cells.
    pub fn cells(&self) -> Cells {
        self.cells
    }

    /// Packing options.
    pub fn options(&self) -> AttachOptions {
        self.options
    }

    /// Offset and size from the last allocation, relative to the table.
    pub fn slot(&self) -> Rect {
        Rect::new(self.offset.0, self.offset.1, self.size.0, self.size.1)
    }

    /// Record the per-axis result of an allocation.
    fn set_slot(&mut self, o: Orientation, offset: u32, size: u32) {
        match o {
            Orientation::Horizontal => {
                self.offset.0 = offset;
                self.size.0 = size;
            }
            Orientation::Vertical => {
                self.offset.1 = offset;
                self.size.1 = size;
            }
        }
    }

    /// Size recorded by the last allocation along an axis.
    fn size_along(&self, o: Orientation) -> u32 {
        match o {
            Orientation::Horizontal => self.size.0,
            Orientation::Vertical => self.size.1,
        }
    }
}

/// One placement's request along one axis, margins included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRequest {
    /// First cell.
    pub start: usize,
    /// One past the last cell.
    pub end: usize,
    /// Requested extent of the whole span.
    pub size: u32,
    /// Whether the placement asks for surplus space.
    pub expand: bool,
}

impl CellRequest {
    /// Number of cells covered.
    fn span(&self) -> usize {
        self.end - self.start
    }
}

/// Resolved cell sizes for one axis of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellSizes {
    /// Size of each cell before resolving against the available extent.
    pub fixed: Vec<u32>,
    /// Cells that receive surplus space.
    pub expand: BTreeSet<usize>,
    /// Cells covered by at least one placement.
    pub occupied: Vec<bool>,
    /// Spacing between adjacent occupied cells.
    pub spacing: u32,
    /// The requests the sizes were derived from.
    pub requests: Vec<CellRequest>,
}

impl CellSizes {
    /// Derive cell sizes from a set of requests.
    pub fn compute(requests: Vec<CellRequest>, spacing: u32) -> Self {
        let count = requests.iter().map(|r| r.end).max().unwrap_or(0);
        let mut fixed = vec![0u32; count];
        let mut occupied = vec![false; count];
        let mut pinned = vec![false; count];
        let mut expand = BTreeSet::new();

        for r in &requests {
            for c in r.start..r.end {
                occupied[c] = true;
            }
            if r.span() == 1 {
                fixed[r.start] = fixed[r.start].max(r.size);
                pinned[r.start] = true;
                if r.expand {
                    expand.insert(r.start);
                }
            }
        }
        for r in requests.iter().filter(|r| r.span() > 1 && r.expand) {
            if !(r.start..r.end).any(|c| expand.contains(&c)) {
                expand.extend(r.start..r.end);
            }
        }

        let spans: Vec<&CellRequest> = requests.iter().filter(|r| r.span() > 1).collect();
        let mut growth: Vec<Vec<u32>> = spans
            .iter()
            .map(|r| span_growth(r, &fixed, &pinned, spacing))
            .collect();
        resolve_conflicts(&spans, &mut growth);

        let mut contribution: BTreeMap<usize, u32> = BTreeMap::new();
        for (r, g) in spans.iter().zip(&growth) {
            for (c, extra) in (r.start..r.end).zip(g) {
                let e = contribution.entry(c).or_default();
                *e = (*e).max(*extra);
            }
        }
        for (c, extra) in contribution {
            fixed[c] = fixed[c].saturating_add(extra);
        }

        Self {
            fixed,
            expand,
            occupied,
            spacing,
            requests,
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.fixed.len()
    }

    /// True if no placement contributed a cell.
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty()
    }

    /// Indices of occupied cells.
    fn occupied_cells(&self) -> Vec<usize> {
        (0..self.len()).filter(|c| self.occupied[*c]).collect()
    }

    /// Total spacing between occupied cells.
    fn gaps(&self) -> u32 {
        let n = self.occupied.iter().filter(|o| **o).count();
        let n = u32::try_from(n.saturating_sub(1)).unwrap_or(u32::MAX);
        self.spacing.saturating_mul(n)
    }

    /// Natural extent of the axis: cell sizes plus spacing.
    pub fn natural_total(&self) -> u32 {
        self.fixed
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(*s))
            .saturating_add(self.gaps())
    }

    /// Resolve cell sizes against an available extent.
    pub fn resolve(&self, available: u32) -> Vec<u32> {
        let mut sizes: Vec<u64> = self.fixed.iter().map(|s| u64::from(*s)).collect();
        let natural = self.natural_total();
        let occupied = self.occupied_cells();
        if available >= natural {
            let targets: Vec<usize> = if self.expand.is_empty() {
                occupied
            } else {
                self.expand.iter().copied().collect()
            };
            let shares = split_evenly(u64::from(available - natural), targets.len());
            for (c, share) in targets.into_iter().zip(shares) {
                sizes[c] += u64::from(share);
            }
        } else {
            let content: u64 = sizes.iter().sum();
            let deficit = u64::from(natural - available).min(content);
            shrink_cells(&mut sizes, &occupied, deficit);
        }
        sizes
            .into_iter()
            .map(|s| u32::try_from(s).unwrap_or(u32::MAX))
            .collect()
    }

    /// Offset of a cell from the start of the axis.
    pub fn offset(&self, sizes: &[u32], cell: usize) -> u32 {
        (0..cell.min(sizes.len())).fold(0u32, |acc, c| {
            let gap = if self.occupied[c] { self.spacing } else { 0 };
            acc.saturating_add(sizes[c]).saturating_add(gap)
        })
    }

    /// Extent of a span of cells, inner spacing included.
    pub fn extent(&self, sizes: &[u32], start: usize, end: usize) -> u32 {
        let end = end.min(sizes.len());
        if start >= end {
            return 0;
        }
        let cells = sizes[start..end]
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(*s));
        let inner = u32::try_from(end - start - 1).unwrap_or(u32::MAX);
        cells.saturating_add(self.spacing.saturating_mul(inner))
    }
}

/// The unmet need of a spanning request, split across the cells of the span
/// that no single-cell request fixed. If every cell is fixed, all of them
/// share it.
fn span_growth(r: &CellRequest, fixed: &[u32], pinned: &[bool], spacing: u32) -> Vec<u32> {
    let span = r.span();
    let have: u64 = fixed[r.start..r.end].iter().map(|s| u64::from(*s)).sum();
    let inner = u64::from(spacing) * (span as u64 - 1);
    let unmet = u64::from(r.size).saturating_sub(have + inner);

    let mut targets: Vec<usize> = (0..span).filter(|i| !pinned[r.start + i]).collect();
    if targets.is_empty() {
        targets = (0..span).collect();
    }
    let mut growth = vec![0u32; span];
    for (i, share) in targets.iter().zip(split_evenly(unmet, targets.len())) {
        growth[*i] = share;
    }
    growth
}

/// Single pass over every cell claimed by more than one span. The span with
/// the largest growth in the cell wins, first one on ties. Every other span
/// is raised to that growth in the cell and takes what it gained back off its
/// other cells, evenly.
fn resolve_conflicts(spans: &[&CellRequest], growth: &mut [Vec<u32>]) {
    let mut claims: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (s, r) in spans.iter().enumerate() {
        for c in r.start..r.end {
            claims.entry(c).or_default().push(s);
        }
    }
    for (c, touching) in claims {
        if touching.len() < 2 {
            continue;
        }
        let mut winner = touching[0];
        for s in &touching {
            if growth[*s][c - spans[*s].start] > growth[winner][c - spans[winner].start] {
                winner = *s;
            }
        }
        let max = growth[winner][c - spans[winner].start];
        for s in touching.into_iter().filter(|s| *s != winner) {
            let local = c - spans[s].start;
            let saved = max - growth[s][local];
            growth[s][local] = max;
            let others: Vec<usize> = (0..spans[s].span()).filter(|i| *i != local).collect();
            for (i, cut) in others.iter().zip(split_evenly(u64::from(saved), others.len())) {
                growth[s][*i] = growth[s][*i].saturating_sub(cut);
            }
        }
    }
}

/// Remove `deficit` units from the occupied cells. Cells above the even
/// share lose their excess first, proportionally; what remains comes off all
/// cells proportionally; rounding leftovers come off one unit at a time,
/// leftmost first.
fn shrink_cells(sizes: &mut [u64], cells: &[usize], deficit: u64) {
    if cells.is_empty() || deficit == 0 {
        return;
    }
    let mut left = deficit;

    let total: u64 = cells.iter().map(|c| sizes[*c]).sum();
    let share = total / cells.len() as u64;
    let excess: Vec<u64> = cells.iter().map(|c| sizes[*c].saturating_sub(share)).collect();
    let total_excess: u64 = excess.iter().sum();
    if total_excess > 0 {
        let first = left.min(total_excess);
        for (c, e) in cells.iter().zip(&excess) {
            let cut = first * e / total_excess;
            sizes[*c] -= cut;
            left -= cut;
        }
    }

    let total: u64 = cells.iter().map(|c| sizes[*c]).sum();
    if left > 0 && total > 0 {
        let pass = left;
        for c in cells {
            let cut = pass * sizes[*c] / total;
            sizes[*c] -= cut;
            left -= cut;
        }
    }

    while left > 0 {
        let mut progressed = false;
        for c in cells {
            if left == 0 {
                break;
            }
            if sizes[*c] > 0 {
                sizes[*c] -= 1;
                left -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
}

/// A table container: spacing per axis and the attached placements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableLayout {
    /// Spacing between columns.
    pub(crate) column_spacing: u32,
    /// Spacing between rows.
    pub(crate) row_spacing: u32,
    /// Placements in attach order.
    pub(crate) placements: Vec<TablePlacement>,
}

impl TableLayout {
    /// Construct an empty table.
    pub fn new(column_spacing: u32, row_spacing: u32) -> Self {
        Self {
            column_spacing,
            row_spacing,
            placements: Vec::new(),
        }
    }

    /// Spacing between columns or rows.
    pub fn spacing(&self, o: Orientation) -> u32 {
        match o {
            Orientation::Horizontal => self.column_spacing,
            Orientation::Vertical => self.row_spacing,
        }
    }

    /// Set spacing between columns and rows.
    pub(crate) fn set_spacing(&mut self, column_spacing: u32, row_spacing: u32) {
        self.column_spacing = column_spacing;
        self.row_spacing = row_spacing;
    }

    /// Placements in attach order.
    pub fn placements(&self) -> &[TablePlacement] {
        &self.placements
    }

    /// The placement of a child.
    pub fn placement(&self, child: NodeId) -> Option<&TablePlacement> {
        self.placements.iter().find(|p| p.child == child)
    }

    /// Mutable placement of a child.
    pub(crate) fn placement_mut(&mut self, child: NodeId) -> Option<&mut TablePlacement> {
        self.placements.iter_mut().find(|p| p.child == child)
    }

    /// Index of a child's placement.
    pub(crate) fn position(&self, child: NodeId) -> Option<usize> {
        self.placements.iter().position(|p| p.child == child)
    }

    /// Number of columns spanned by the attached children.
    pub fn columns(&self) -> u32 {
        self.placements.iter().map(|p| p.cells.right).max().unwrap_or(0)
    }

    /// Number of rows spanned by the attached children.
    pub fn rows(&self) -> u32 {
        self.placements.iter().map(|p| p.cells.bottom).max().unwrap_or(0)
    }

    /// Indices of placements whose child is visible.
    fn visible(&self, pass: &LayoutPass<'_>) -> Vec<usize> {
        (0..self.placements.len())
            .filter(|i| pass.visible(self.placements[*i].child))
            .collect()
    }

    /// Requests of the visible placements along an axis. `other` gives each
    /// placement's known extent on the other axis, if any.
    fn requests(
        &self,
        pass: &mut LayoutPass<'_>,
        visible: &[usize],
        o: Orientation,
        other: &[Option<u32>],
    ) -> Vec<SizeRequest> {
        visible
            .iter()
            .zip(other)
            .map(|(i, known)| {
                let p = &self.placements[*i];
                let margin = p.options.margin_along(o).saturating_mul(2);
                pass.request(p.child, o, *known).grow(margin)
            })
            .collect()
    }

    /// Build cell sizes from one component of each request.
    fn cell_sizes(
        &self,
        pass: &LayoutPass<'_>,
        visible: &[usize],
        o: Orientation,
        sizes: impl Iterator<Item = u32>,
    ) -> CellSizes {
        let requests = visible
            .iter()
            .zip(sizes)
            .map(|(i, size)| {
                let p = &self.placements[*i];
                let (start, end) = p.cells.along(o);
                CellRequest {
                    start: start as usize,
                    end: end as usize,
                    size,
                    expand: p.options.expands(o) || pass.props(p.child).expands(o),
                }
            })
            .collect();
        CellSizes::compute(requests, self.spacing(o))
    }

    /// Offset and size of a placement within resolved cells.
    fn place(
        &self,
        pass: &LayoutPass<'_>,
        cells: &CellSizes,
        sizes: &[u32],
        index: usize,
        request: SizeRequest,
        o: Orientation,
    ) -> (u32, u32) {
        let p = &self.placements[index];
        let (start, end) = p.cells.along(o);
        let (start, end) = (start as usize, end as usize);
        let margin = p.options.margin_along(o);
        let slot_offset = cells.offset(sizes, start);
        let inner = cells.extent(sizes, start, end).saturating_sub(margin * 2);
        let offset = slot_offset.saturating_add(margin);
        if p.options.fills(o) {
            return (offset, inner);
        }
        let own = request.natural.saturating_sub(margin * 2).min(inner);
        let shift = pass.props(p.child).align(o).offset(inner - own);
        (offset + shift, own)
    }
}

impl Container for TableLayout {
    fn measure(&self, pass: &mut LayoutPass<'_>, c: Constraints) -> Measurement {
        let visible = self.visible(pass);
        if visible.is_empty() {
            return Measurement::ZERO;
        }
        let h = Orientation::Horizontal;
        let v = Orientation::Vertical;
        let unknown = vec![None; visible.len()];

        let widths = self.requests(pass, &visible, h, &unknown);
        let min_cols = self.cell_sizes(pass, &visible, h, widths.iter().map(|r| r.minimum));
        let nat_cols = self.cell_sizes(pass, &visible, h, widths.iter().map(|r| r.natural));
        let width = SizeRequest::new(min_cols.natural_total(), nat_cols.natural_total());

        let known: Vec<Option<u32>> = match c.width.exact() {
            Some(w) => {
                let sizes = nat_cols.resolve(w);
                visible
                    .iter()
                    .zip(&widths)
                    .map(|(i, r)| Some(self.place(pass, &nat_cols, &sizes, *i, *r, h).1))
                    .collect()
            }
            None => unknown,
        };
        let heights = self.requests(pass, &visible, v, &known);
        let min_rows = self.cell_sizes(pass, &visible, v, heights.iter().map(|r| r.minimum));
        let nat_rows = self.cell_sizes(pass, &visible, v, heights.iter().map(|r| r.natural));
        let height = SizeRequest::new(min_rows.natural_total(), nat_rows.natural_total());

        Measurement::new(width, height)
    }

    fn allocate(&mut self, pass: &mut LayoutPass<'_>, rect: Rect) {
        let visible = self.visible(pass);
        if visible.is_empty() {
            return;
        }
        let mut known = vec![None; visible.len()];
        for o in [Orientation::Horizontal, Orientation::Vertical] {
            let requests = self.requests(pass, &visible, o, &known);
            let cells = self.cell_sizes(pass, &visible, o, requests.iter().map(|r| r.natural));
            let sizes = cells.resolve(rect.along(o));
            tracing::trace!(?o, ?sizes, "table cells resolved");
            for (i, request) in visible.iter().zip(requests) {
                let (offset, size) = self.place(pass, &cells, &sizes, *i, request, o);
                self.placements[*i].set_slot(o, offset, size);
            }
            known = visible
                .iter()
                .map(|i| Some(self.placements[*i].size_along(o)))
                .collect();
        }

        for i in visible {
            let p = &self.placements[i];
            let child_rect = Rect::new(
                rect.tl.x.saturating_add(p.offset.0),
                rect.tl.y.saturating_add(p.offset.1),
                p.size.0,
                p.size.1,
            );
            let child = p.child;
            pass.allocate(child, child_rect);
        }
    }
}
