//! Measurement and allocation traversal.
//!
//! A [`LayoutPass`] borrows the arena for the duration of one query or one
//! reallocation round. It owns the per-node cache protocol, applies margins,
//! explicit size overrides and alignment, and turns backend failures into
//! side-channel reports so that one failing widget never stops the pass.

use std::collections::HashSet;

use crate::{
    core::{
        error::Error,
        id::NodeId,
        node::{CacheEntry, NodeKind, Props},
        world::Core,
    },
    geom::{Orientation, Rect},
    layout::{Constraint, Constraints, Container, Measurement, SizeMode, SizeRequest},
    widget::Applied,
};

/// Layout traversal over the arena.
pub(crate) struct LayoutPass<'a> {
    /// Core state being measured or updated.
    core: &'a mut Core,
    /// Nodes allocated during this pass.
    allocated: HashSet<NodeId>,
}

impl<'a> LayoutPass<'a> {
    /// Create a new pass over the arena.
    pub(crate) fn new(core: &'a mut Core) -> Self {
        Self {
            core,
            allocated: HashSet::new(),
        }
    }

    /// Number of nodes allocated so far.
    pub(crate) fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    /// True if the node has already been allocated by this pass.
    pub(crate) fn was_allocated(&self, id: NodeId) -> bool {
        self.allocated.contains(&id)
    }

    /// Return the geometry properties of a node.
    pub(crate) fn props(&self, id: NodeId) -> Props {
        self.core
            .nodes
            .get(id)
            .map(|n| n.props)
            .unwrap_or_default()
    }

    /// True if the node exists and is visible.
    pub(crate) fn visible(&self, id: NodeId) -> bool {
        self.core.nodes.get(id).is_some_and(|n| n.visible)
    }

    /// The size mode a node declares.
    pub(crate) fn size_mode(&self, id: NodeId) -> SizeMode {
        self.core.size_mode_of(id)
    }

    /// Measure a node's outer size, margins included.
    pub(crate) fn measure(&mut self, id: NodeId, c: Constraints) -> Measurement {
        let margin = self.props(id).margin;
        self.measure_inner(id, c.inset(margin)).outset(margin)
    }

    /// Request along one axis. When the node's size along `axis` depends on
    /// the other axis and `other` is known, the query is constrained by it.
    pub(crate) fn request(&mut self, id: NodeId, axis: Orientation, other: Option<u32>) -> SizeRequest {
        let c = match other {
            Some(v) if self.size_mode(id).depends(axis) => {
                Constraints::from_main_cross(axis, Constraint::Unbounded, Constraint::Exact(v))
            }
            _ => Constraints::UNBOUNDED,
        };
        self.measure(id, c).along(axis)
    }

    /// Measure a node's content with overrides, excluding margins, through
    /// the node's cache.
    fn measure_inner(&mut self, id: NodeId, c: Constraints) -> Measurement {
        let host_driven = self.core.config.host_driven;
        let Some(node) = self.core.nodes.get(id) else {
            return Measurement::ZERO;
        };
        if !host_driven
            && let Some(entry) = node.cache
            && entry.constraints == c
        {
            return entry.measurement;
        }
        let props = node.props;
        let measured = props.apply_overrides(self.measure_content(id, c));
        if !host_driven && let Some(node) = self.core.nodes.get_mut(id) {
            node.cache = Some(CacheEntry {
                constraints: c,
                measurement: measured,
            });
        }
        tracing::trace!(?id, ?c, ?measured, "measured");
        measured
    }

    /// Dispatch content measurement on the node kind.
    fn measure_content(&mut self, id: NodeId, c: Constraints) -> Measurement {
        let Some(node) = self.core.nodes.get(id) else {
            return Measurement::ZERO;
        };
        match &node.kind {
            NodeKind::Leaf(widget) => match widget.measure(c) {
                Ok(m) => m,
                Err(e) => {
                    self.report(e.for_node(id));
                    Measurement::ZERO
                }
            },
            NodeKind::Box(layout) => layout.clone().measure(self, c),
            NodeKind::Table(layout) => layout.clone().measure(self, c),
            NodeKind::Window(state) => state.clone().measure(self, c),
        }
    }

    /// Allocate a node within `allocation`, applying margins and alignment,
    /// then recursively allocate its visible children.
    pub(crate) fn allocate(&mut self, id: NodeId, allocation: Rect) {
        let Some(node) = self.core.nodes.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let props = node.props;
        let area = allocation.inset(props.margin);
        let mode = self.size_mode(id);

        let leading = mode.leading_axis();
        let trailing = leading.flip();
        let unbounded = self.measure_inner(id, Constraints::UNBOUNDED);
        let lead_natural = unbounded.along(leading).natural;
        let lead_size = props.align(leading).fit(lead_natural, area.along(leading));
        let trail_natural = self
            .measure_inner(
                id,
                Constraints::from_main_cross(
                    trailing,
                    Constraint::Unbounded,
                    Constraint::Exact(lead_size),
                ),
            )
            .along(trailing)
            .natural;
        let trail_size = props.align(trailing).fit(trail_natural, area.along(trailing));

        let rect = area
            .slice(
                leading,
                props.align(leading).offset(area.along(leading) - lead_size),
                lead_size,
            )
            .slice(
                trailing,
                props.align(trailing).offset(area.along(trailing) - trail_size),
                trail_size,
            );

        if let Some(node) = self.core.nodes.get_mut(id) {
            node.allocation = Some(allocation);
            node.rect = rect;
            node.last_request = Some(unbounded.outset(props.margin));
        }
        self.allocated.insert(id);
        tracing::trace!(?id, ?allocation, ?rect, "allocated");
        self.allocate_content(id, rect);
    }

    /// Dispatch content allocation on the node kind.
    fn allocate_content(&mut self, id: NodeId, rect: Rect) {
        let Some(node) = self.core.nodes.get_mut(id) else {
            return;
        };
        match &mut node.kind {
            NodeKind::Leaf(widget) => match widget.apply(rect) {
                Ok(Applied::Settled) => {}
                Ok(Applied::Resize) => self.core.queue_resize_node(id),
                Err(e) => self.report(e.for_node(id)),
            },
            NodeKind::Box(layout) => {
                let mut layout = layout.clone();
                layout.allocate(self, rect);
                if let Some(NodeKind::Box(slot)) = self.core.nodes.get_mut(id).map(|n| &mut n.kind) {
                    *slot = layout;
                }
            }
            NodeKind::Table(layout) => {
                let mut layout = layout.clone();
                layout.allocate(self, rect);
                if let Some(NodeKind::Table(slot)) = self.core.nodes.get_mut(id).map(|n| &mut n.kind)
                {
                    *slot = layout;
                }
            }
            NodeKind::Window(state) => {
                let mut state = state.clone();
                state.allocate(self, rect);
                if let Some(NodeKind::Window(slot)) = self.core.nodes.get_mut(id).map(|n| &mut n.kind)
                {
                    *slot = state;
                }
            }
        }
    }

    /// Report an error through the core's side channel.
    pub(crate) fn report(&mut self, error: Error) {
        self.core.report(error);
    }
}
