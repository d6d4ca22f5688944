use serde::{Deserialize, Serialize};

use crate::{
    core::id::NodeId,
    geom::{Edges, Orientation, Rect},
    layout::{Align, BoxLayout, Constraints, Measurement, TableLayout, WindowState},
    widget::Widget,
};

/// What a node is: a backend leaf or one of the built-in containers.
pub enum NodeKind {
    /// A native control supplied by the host.
    Leaf(Box<dyn Widget>),
    /// One-dimensional packing container.
    Box(BoxLayout),
    /// Grid container with cell spans.
    Table(TableLayout),
    /// Top-level window with a single content child.
    Window(WindowState),
}

impl NodeKind {
    /// Short kind label for dumps and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Box(_) => "box",
            Self::Table(_) => "table",
            Self::Window(_) => "window",
        }
    }
}

/// Geometry-affecting properties of a node. Changing any of these
/// invalidates the node's cached size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Props {
    /// Space around the node, inside its parent's allocation.
    pub margin: Edges,
    /// Horizontal placement inside the allocation.
    pub halign: Align,
    /// Vertical placement inside the allocation.
    pub valign: Align,
    /// Ask the parent for extra horizontal space.
    pub hexpand: bool,
    /// Ask the parent for extra vertical space.
    pub vexpand: bool,
    /// Explicit minimum width.
    pub min_width: Option<u32>,
    /// Explicit minimum height.
    pub min_height: Option<u32>,
    /// Explicit natural width.
    pub natural_width: Option<u32>,
    /// Explicit natural height.
    pub natural_height: Option<u32>,
}

impl Props {
    /// Alignment along an axis.
    pub fn align(&self, o: Orientation) -> Align {
        match o {
            Orientation::Horizontal => self.halign,
            Orientation::Vertical => self.valign,
        }
    }

    /// Expand flag along an axis.
    pub fn expands(&self, o: Orientation) -> bool {
        match o {
            Orientation::Horizontal => self.hexpand,
            Orientation::Vertical => self.vexpand,
        }
    }

    /// Apply explicit size overrides to a content measurement.
    pub fn apply_overrides(&self, m: Measurement) -> Measurement {
        Measurement::new(
            m.width.with_overrides(self.min_width, self.natural_width),
            m.height.with_overrides(self.min_height, self.natural_height),
        )
    }
}

/// A cached measurement and the constraint pair it is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CacheEntry {
    /// Content constraints the measurement was computed under.
    pub(crate) constraints: Constraints,
    /// Content measurement, overrides applied, margins excluded.
    pub(crate) measurement: Measurement,
}

/// Core node data stored in the arena.
pub struct Node {
    /// Leaf backend or container state.
    pub(crate) kind: NodeKind,
    /// Display name.
    pub(crate) name: String,

    /// Parent in the arena tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree, in placement order.
    pub(crate) children: Vec<NodeId>,

    /// Geometry properties.
    pub(crate) props: Props,
    /// Node visibility. Invisible nodes are skipped by their containers.
    pub(crate) visible: bool,

    /// Single-entry measurement cache.
    pub(crate) cache: Option<CacheEntry>,
    /// Unconstrained measurement, margins included, that the last size
    /// check or allocation was based on.
    pub(crate) last_request: Option<Measurement>,

    /// Rectangle handed down by the parent on the last allocation.
    pub(crate) allocation: Option<Rect>,
    /// Final rectangle after margins and alignment.
    pub(crate) rect: Rect,
}

impl Node {
    /// Construct a detached node.
    pub(crate) fn new(kind: NodeKind, name: String) -> Self {
        Self {
            kind,
            name,
            parent: None,
            children: Vec::new(),
            props: Props::default(),
            visible: true,
            cache: None,
            last_request: None,
            allocation: None,
            rect: Rect::zero(),
        }
    }

    /// Return the node's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the node kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the geometry properties.
    pub fn props(&self) -> Props {
        self.props
    }

    /// Return true if the node is visible.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Return the allocation handed down by the parent, if the node has been
    /// allocated.
    pub fn allocation(&self) -> Option<Rect> {
        self.allocation
    }

    /// Return the final rectangle in window coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Return true if the node holds a valid cached measurement.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Return true if this is a top-level window.
    pub fn is_window(&self) -> bool {
        matches!(self.kind, NodeKind::Window(_))
    }

    /// Drop the cached measurement.
    pub(crate) fn invalidate(&mut self) {
        self.cache = None;
    }
}
