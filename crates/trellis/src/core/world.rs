use std::fmt;

use slotmap::SlotMap;

use crate::{
    core::{
        config::Config,
        error::{Error, Result},
        id::NodeId,
        node::{Node, NodeKind, Props},
        pass::LayoutPass,
        scheduler::{self, BatchStats, RunLoop, Scheduler},
    },
    geom::{Edges, Expanse, Orientation, Rect},
    layout::{
        Align, AttachOptions, BoxLayout, BoxPlacement, Cells, Constraints, Measurement,
        PackMode, PackOrigin, SizeMode, SizeRequest, TableLayout, TablePlacement, WindowState,
    },
    widget::Widget,
};

/// Callback receiving errors raised by widget backends during layout.
type ErrorHandler = Box<dyn FnMut(&Error)>;

/// The widget arena. Owns every node, the resize scheduler, and the host
/// hooks. All tree and geometry mutation goes through `Core`.
pub struct Core {
    /// Node storage.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Pending size checks, reallocations and window renegotiations.
    pub(crate) scheduler: Scheduler,
    /// Engine configuration.
    pub(crate) config: Config,
    /// Host run loop.
    run_loop: Box<dyn RunLoop>,
    /// Side channel for widget errors raised during a pass.
    error_handler: ErrorHandler,
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("nodes", &self.nodes.len())
            .field("scheduler", &self.scheduler)
            .field("config", &self.config)
            .finish()
    }
}

impl Core {
    /// Create an empty arena driven by a host run loop.
    pub fn new(run_loop: impl RunLoop + 'static) -> Self {
        Self::with_config(run_loop, Config::default())
    }

    /// Create an empty arena with explicit configuration.
    pub fn with_config(run_loop: impl RunLoop + 'static, config: Config) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            scheduler: Scheduler::default(),
            config,
            run_loop: Box::new(run_loop),
            error_handler: Box::new(|e| tracing::error!(error = %e, "widget error during layout")),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The resize scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Install the handler that receives widget errors raised during
    /// measurement or allocation. The default handler logs them.
    pub fn set_error_handler(&mut self, handler: impl FnMut(&Error) + 'static) {
        self.error_handler = Box::new(handler);
    }

    /// Deliver an error to the side channel.
    pub(crate) fn report(&mut self, error: Error) {
        (self.error_handler)(&error);
    }

    /// Return a node by id.
    pub fn node(&self, id: impl Into<NodeId>) -> Option<&Node> {
        self.nodes.get(id.into())
    }

    /// True if the node exists.
    pub fn contains(&self, id: impl Into<NodeId>) -> bool {
        self.nodes.contains_key(id.into())
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node, failing with `NodeNotFound`.
    fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::NodeNotFound(id))
    }

    /// Look up a node mutably, failing with `NodeNotFound`.
    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// Insert a detached node.
    fn insert(&mut self, kind: NodeKind, name: String) -> NodeId {
        let id = self.nodes.insert(Node::new(kind, name));
        tracing::trace!(?id, "node created");
        id
    }

    /// Add a detached leaf widget.
    pub fn add_leaf<W>(&mut self, widget: W) -> NodeId
    where
        W: Widget,
    {
        self.add_leaf_boxed(Box::new(widget))
    }

    /// Add a detached, already boxed leaf widget.
    pub fn add_leaf_boxed(&mut self, widget: Box<dyn Widget>) -> NodeId {
        let name = widget.name();
        self.insert(NodeKind::Leaf(widget), name)
    }

    /// Add a detached box container.
    pub fn add_box(&mut self, orientation: Orientation, spacing: u32) -> NodeId {
        let name = match orientation {
            Orientation::Horizontal => "hbox",
            Orientation::Vertical => "vbox",
        };
        self.insert(
            NodeKind::Box(BoxLayout::new(orientation, spacing)),
            name.into(),
        )
    }

    /// Add a detached table container.
    pub fn add_table(&mut self, column_spacing: u32, row_spacing: u32) -> NodeId {
        self.insert(
            NodeKind::Table(TableLayout::new(column_spacing, row_spacing)),
            "table".into(),
        )
    }

    /// Add a top-level window.
    pub fn add_window(&mut self) -> NodeId {
        self.insert(NodeKind::Window(WindowState::default()), "window".into())
    }

    /// Rename a node for dumps and logs.
    pub fn set_name(&mut self, id: impl Into<NodeId>, name: impl Into<String>) -> Result<()> {
        self.get_mut(id.into())?.name = name.into();
        Ok(())
    }

    /// The parent of a node.
    pub fn parent(&self, id: impl Into<NodeId>) -> Result<Option<NodeId>> {
        Ok(self.get(id.into())?.parent)
    }

    /// The children of a node, in placement order.
    pub fn children(&self, id: impl Into<NodeId>) -> Result<&[NodeId]> {
        Ok(&self.get(id.into())?.children)
    }

    /// Number of ancestors of a node.
    pub fn depth(&self, id: impl Into<NodeId>) -> Result<usize> {
        let id = id.into();
        self.get(id)?;
        Ok(scheduler::depth(&self.nodes, id))
    }

    /// Return true if `ancestor` appears in the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// True if the node and all of its ancestors are visible.
    pub(crate) fn is_shown(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// The final rectangle of a node from the last allocation.
    pub fn rect(&self, id: impl Into<NodeId>) -> Result<Rect> {
        Ok(self.get(id.into())?.rect)
    }

    /// The rectangle handed to a node by its parent on the last allocation.
    pub fn allocation(&self, id: impl Into<NodeId>) -> Result<Option<Rect>> {
        Ok(self.get(id.into())?.allocation)
    }

    /// Geometry properties of a node.
    pub fn props(&self, id: impl Into<NodeId>) -> Result<Props> {
        Ok(self.get(id.into())?.props)
    }

    /// Modify a node's geometry properties. The node is queued for a resize
    /// only if they actually changed. Returns true if they did.
    ///
    /// Alignment and expand flags are read by the parent when it distributes
    /// space, so changing them also queues the parent.
    pub fn with_props_of(
        &mut self,
        id: impl Into<NodeId>,
        f: impl FnOnce(&mut Props),
    ) -> Result<bool> {
        let id = id.into();
        let node = self.get_mut(id)?;
        let before = node.props;
        f(&mut node.props);
        let after = node.props;
        let parent = node.parent;
        if after == before {
            return Ok(false);
        }
        self.queue_resize_node(id);
        let placement = (after.halign, after.valign, after.hexpand, after.vexpand)
            != (before.halign, before.valign, before.hexpand, before.vexpand);
        if placement && let Some(parent) = parent {
            self.queue_resize_node(parent);
        }
        Ok(true)
    }

    /// Set the margin around a node.
    pub fn set_margin(&mut self, id: impl Into<NodeId>, margin: Edges) -> Result<()> {
        self.with_props_of(id, |p| p.margin = margin).map(drop)
    }

    /// Set horizontal alignment.
    pub fn set_halign(&mut self, id: impl Into<NodeId>, align: Align) -> Result<()> {
        self.with_props_of(id, |p| p.halign = align).map(drop)
    }

    /// Set vertical alignment.
    pub fn set_valign(&mut self, id: impl Into<NodeId>, align: Align) -> Result<()> {
        self.with_props_of(id, |p| p.valign = align).map(drop)
    }

    /// Ask the parent for surplus horizontal space.
    pub fn set_hexpand(&mut self, id: impl Into<NodeId>, expand: bool) -> Result<()> {
        self.with_props_of(id, |p| p.hexpand = expand).map(drop)
    }

    /// Ask the parent for surplus vertical space.
    pub fn set_vexpand(&mut self, id: impl Into<NodeId>, expand: bool) -> Result<()> {
        self.with_props_of(id, |p| p.vexpand = expand).map(drop)
    }

    /// Set explicit minimum sizes. `None` leaves the content's minimum.
    pub fn set_min_size(
        &mut self,
        id: impl Into<NodeId>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<()> {
        self.with_props_of(id, |p| {
            p.min_width = width;
            p.min_height = height;
        })
        .map(drop)
    }

    /// Set explicit natural sizes. `None` leaves the content's natural size.
    pub fn set_natural_size(
        &mut self,
        id: impl Into<NodeId>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<()> {
        self.with_props_of(id, |p| {
            p.natural_width = width;
            p.natural_height = height;
        })
        .map(drop)
    }

    /// Show or hide a node. Returns true if visibility changed.
    pub fn set_visible(&mut self, id: impl Into<NodeId>, visible: bool) -> Result<bool> {
        let id = id.into();
        let node = self.get_mut(id)?;
        if node.visible == visible {
            return Ok(false);
        }
        node.visible = visible;
        node.invalidate();
        let parent = node.parent;
        self.queue_resize_node(parent.unwrap_or(id));
        Ok(true)
    }

    /// Invalidate a node's cached size and queue it for a size check.
    pub fn queue_resize(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        self.get(id)?;
        self.queue_resize_node(id);
        Ok(())
    }

    /// Invalidate the cached sizes of a node and its ancestors, queue the
    /// node for a size check, and arm a checkpoint if none is pending.
    pub(crate) fn queue_resize_node(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(n) = current.and_then(|c| self.nodes.get_mut(c)) {
            n.invalidate();
            current = n.parent;
        }
        if self.config.host_driven || !self.nodes.contains_key(id) {
            return;
        }
        self.scheduler.queue_check(id);
        self.arm();
    }

    /// Queue a window for renegotiation.
    fn queue_window(&mut self, id: NodeId) {
        if self.config.host_driven {
            return;
        }
        self.scheduler.queue_window(id);
        self.arm();
    }

    /// Request a checkpoint if the scheduler was idle.
    fn arm(&mut self) {
        if self.scheduler.arm() {
            tracing::trace!("checkpoint requested");
            self.run_loop.request_checkpoint();
        }
    }

    /// Run the pending batch. Call this when the host fires the checkpoint
    /// requested through [`RunLoop::request_checkpoint`]. Returns `None` if no
    /// batch was pending.
    pub fn run_checkpoint(&mut self) -> Option<BatchStats> {
        if self.scheduler.state() != scheduler::BatchState::Pending {
            return None;
        }
        Some(scheduler::run_batch(self))
    }

    /// Measure a node under a constraint pair. The result includes margins
    /// and explicit size overrides.
    pub fn measure(&mut self, id: impl Into<NodeId>, c: Constraints) -> Result<Measurement> {
        let id = id.into();
        self.get(id)?;
        Ok(LayoutPass::new(self).measure(id, c))
    }

    /// Preferred width with no constraint.
    pub fn preferred_width(&mut self, id: impl Into<NodeId>) -> Result<SizeRequest> {
        Ok(self.measure(id, Constraints::UNBOUNDED)?.width)
    }

    /// Preferred height with no constraint.
    pub fn preferred_height(&mut self, id: impl Into<NodeId>) -> Result<SizeRequest> {
        Ok(self.measure(id, Constraints::UNBOUNDED)?.height)
    }

    /// Preferred height when allocated `width`.
    pub fn preferred_height_for_width(
        &mut self,
        id: impl Into<NodeId>,
        width: u32,
    ) -> Result<SizeRequest> {
        Ok(self.measure(id, Constraints::for_width(width))?.height)
    }

    /// Preferred width when allocated `height`.
    pub fn preferred_width_for_height(
        &mut self,
        id: impl Into<NodeId>,
        height: u32,
    ) -> Result<SizeRequest> {
        Ok(self.measure(id, Constraints::for_height(height))?.width)
    }

    /// The axis a node's natural size depends on.
    pub fn size_mode(&self, id: impl Into<NodeId>) -> Result<SizeMode> {
        let id = id.into();
        self.get(id)?;
        Ok(self.size_mode_of(id))
    }

    /// Size mode of a node; containers are height-for-width.
    pub(crate) fn size_mode_of(&self, id: NodeId) -> SizeMode {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Leaf(w)) => w.size_mode(),
            _ => SizeMode::HeightForWidth,
        }
    }

    /// Allocate a node and its visible descendants immediately, outside any
    /// batch.
    pub fn allocate(&mut self, id: impl Into<NodeId>, rect: Rect) -> Result<()> {
        let id = id.into();
        self.get(id)?;
        LayoutPass::new(self).allocate(id, rect);
        Ok(())
    }

    /// Re-run a window's size adjustment. Returns true if its size changed.
    pub(crate) fn renegotiate_window(&mut self, id: NodeId) -> bool {
        let Some(NodeKind::Window(state)) = self.nodes.get(id).map(|n| &n.kind) else {
            return false;
        };
        let mut state = state.clone();
        let changed = state.adjust(&mut LayoutPass::new(self));
        tracing::trace!(?id, size = ?state.size, changed, "window renegotiated");
        if let Some(NodeKind::Window(slot)) = self.nodes.get_mut(id).map(|n| &mut n.kind) {
            *slot = state;
        }
        changed
    }

    /// The rectangle a queued node is reallocated into.
    pub(crate) fn realloc_target(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        match &node.kind {
            NodeKind::Window(state) => Some(state.area()),
            _ => node.allocation,
        }
    }

    /// Validate that `child` can be placed under `parent`.
    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        let node = self.get(child)?;
        if node.is_window() {
            return Err(Error::InvalidOperation(
                "a window cannot be placed in a container".into(),
            ));
        }
        if node.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        Ok(())
    }

    /// Record the parent/child link after a container accepted a child.
    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Run `f` on a box container.
    fn with_box<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut BoxLayout) -> Result<R>,
    ) -> Result<R> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Box(layout) => f(layout),
            _ => Err(Error::NotAContainer {
                node: id,
                expected: "box",
            }),
        }
    }

    /// Run `f` on a table container.
    fn with_table<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut TableLayout) -> Result<R>,
    ) -> Result<R> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Table(layout) => f(layout),
            _ => Err(Error::NotAContainer {
                node: id,
                expected: "table",
            }),
        }
    }

    /// Run `f` on a window.
    fn with_window<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut WindowState) -> Result<R>,
    ) -> Result<R> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Window(state) => f(state),
            _ => Err(Error::NotAContainer {
                node: id,
                expected: "window",
            }),
        }
    }

    /// The layout of a box container.
    pub fn box_layout(&self, id: impl Into<NodeId>) -> Result<&BoxLayout> {
        let id = id.into();
        match &self.get(id)?.kind {
            NodeKind::Box(layout) => Ok(layout),
            _ => Err(Error::NotAContainer {
                node: id,
                expected: "box",
            }),
        }
    }

    /// The layout of a table container.
    pub fn table_layout(&self, id: impl Into<NodeId>) -> Result<&TableLayout> {
        let id = id.into();
        match &self.get(id)?.kind {
            NodeKind::Table(layout) => Ok(layout),
            _ => Err(Error::NotAContainer {
                node: id,
                expected: "table",
            }),
        }
    }

    /// The state of a window.
    pub fn window_state(&self, id: impl Into<NodeId>) -> Result<&WindowState> {
        let id = id.into();
        match &self.get(id)?.kind {
            NodeKind::Window(state) => Ok(state),
            _ => Err(Error::NotAContainer {
                node: id,
                expected: "window",
            }),
        }
    }

    /// Pack a child against the start of a box.
    pub fn pack_start(
        &mut self,
        parent: impl Into<NodeId>,
        child: impl Into<NodeId>,
        pack: PackMode,
        padding: u32,
    ) -> Result<()> {
        self.pack(parent.into(), child.into(), pack, padding, PackOrigin::Start)
    }

    /// Pack a child against the end of a box.
    pub fn pack_end(
        &mut self,
        parent: impl Into<NodeId>,
        child: impl Into<NodeId>,
        pack: PackMode,
        padding: u32,
    ) -> Result<()> {
        self.pack(parent.into(), child.into(), pack, padding, PackOrigin::End)
    }

    /// Append a box placement.
    fn pack(
        &mut self,
        parent: NodeId,
        child: NodeId,
        pack: PackMode,
        padding: u32,
        origin: PackOrigin,
    ) -> Result<()> {
        self.box_layout(parent)?;
        self.check_attachable(parent, child)?;
        self.with_box(parent, |layout| {
            layout
                .placements
                .push(BoxPlacement::new(child, pack, padding, origin));
            Ok(())
        })?;
        self.link(parent, child);
        self.queue_resize_node(parent);
        Ok(())
    }

    /// Change how a packed child uses its box.
    pub fn set_packing(
        &mut self,
        parent: impl Into<NodeId>,
        child: impl Into<NodeId>,
        pack: PackMode,
        padding: u32,
        origin: PackOrigin,
    ) -> Result<()> {
        let (parent, child) = (parent.into(), child.into());
        let changed = self.with_box(parent, |layout| {
            let p = layout
                .placement_mut(child)
                .ok_or(Error::NotAChild { parent, child })?;
            let changed = (p.pack, p.padding, p.origin) != (pack, padding, origin);
            p.pack = pack;
            p.padding = padding;
            p.origin = origin;
            Ok(changed)
        })?;
        if changed {
            self.queue_resize_node(parent);
        }
        Ok(())
    }

    /// Change the spacing between a box's children.
    pub fn set_box_spacing(&mut self, id: impl Into<NodeId>, spacing: u32) -> Result<()> {
        let id = id.into();
        let changed = self.with_box(id, |layout| {
            let changed = layout.spacing != spacing;
            layout.spacing = spacing;
            Ok(changed)
        })?;
        if changed {
            self.queue_resize_node(id);
        }
        Ok(())
    }

    /// Move a packed child to `position` in the packing order. Positions past
    /// the end move the child last.
    pub fn reorder_child(
        &mut self,
        parent: impl Into<NodeId>,
        child: impl Into<NodeId>,
        position: usize,
    ) -> Result<()> {
        let (parent, child) = (parent.into(), child.into());
        self.with_box(parent, |layout| {
            let from = layout
                .position(child)
                .ok_or(Error::NotAChild { parent, child })?;
            let placement = layout.placements.remove(from);
            let to = position.min(layout.placements.len());
            layout.placements.insert(to, placement);
            Ok(())
        })?;
        let node = self.get_mut(parent)?;
        node.children.retain(|c| *c != child);
        let to = position.min(node.children.len());
        node.children.insert(to, child);
        self.queue_resize_node(parent);
        Ok(())
    }

    /// Attach a child to a table, covering `cells`.
    pub fn attach(
        &mut self,
        table: impl Into<NodeId>,
        child: impl Into<NodeId>,
        cells: Cells,
        options: AttachOptions,
    ) -> Result<()> {
        let (table, child) = (table.into(), child.into());
        self.table_layout(table)?;
        cells.validate()?;
        self.check_attachable(table, child)?;
        self.with_table(table, |layout| {
            layout
                .placements
                .push(TablePlacement::new(child, cells, options));
            Ok(())
        })?;
        self.link(table, child);
        self.queue_resize_node(table);
        Ok(())
    }

    /// Move an attached child to different cells.
    pub fn set_attach(
        &mut self,
        table: impl Into<NodeId>,
        child: impl Into<NodeId>,
        cells: Cells,
    ) -> Result<()> {
        let (table, child) = (table.into(), child.into());
        cells.validate()?;
        let changed = self.with_table(table, |layout| {
            let p = layout
                .placement_mut(child)
                .ok_or(Error::NotAChild {
                    parent: table,
                    child,
                })?;
            let changed = p.cells != cells;
            p.cells = cells;
            Ok(changed)
        })?;
        if changed {
            self.queue_resize_node(table);
        }
        Ok(())
    }

    /// Change an attached child's packing options.
    pub fn set_attach_options(
        &mut self,
        table: impl Into<NodeId>,
        child: impl Into<NodeId>,
        options: AttachOptions,
    ) -> Result<()> {
        let (table, child) = (table.into(), child.into());
        let changed = self.with_table(table, |layout| {
            let p = layout
                .placement_mut(child)
                .ok_or(Error::NotAChild {
                    parent: table,
                    child,
                })?;
            let changed = p.options != options;
            p.options = options;
            Ok(changed)
        })?;
        if changed {
            self.queue_resize_node(table);
        }
        Ok(())
    }

    /// Change an attached child's expand and fill flags along one axis,
    /// keeping its margins and the other axis.
    pub fn set_child_options(
        &mut self,
        table: impl Into<NodeId>,
        child: impl Into<NodeId>,
        o: Orientation,
        expand: bool,
        fill: bool,
    ) -> Result<()> {
        let (table, child) = (table.into(), child.into());
        let mut options = self
            .table_layout(table)?
            .placement(child)
            .ok_or(Error::NotAChild {
                parent: table,
                child,
            })?
            .options;
        match o {
            Orientation::Horizontal => {
                options.expand_x = expand;
                options.fill_x = fill;
            }
            Orientation::Vertical => {
                options.expand_y = expand;
                options.fill_y = fill;
            }
        }
        self.set_attach_options(table, child, options)
    }

    /// Change column and row spacing.
    pub fn set_table_spacing(
        &mut self,
        table: impl Into<NodeId>,
        column_spacing: u32,
        row_spacing: u32,
    ) -> Result<()> {
        let table = table.into();
        let changed = self.with_table(table, |layout| {
            let before = (layout.column_spacing, layout.row_spacing);
            layout.set_spacing(column_spacing, row_spacing);
            Ok(before != (column_spacing, row_spacing))
        })?;
        if changed {
            self.queue_resize_node(table);
        }
        Ok(())
    }

    /// Set a window's content, detaching any previous content.
    pub fn set_content(&mut self, window: impl Into<NodeId>, child: impl Into<NodeId>) -> Result<()> {
        let (window, child) = (window.into(), child.into());
        let previous = self.window_state(window)?.content;
        if previous == Some(child) {
            return Ok(());
        }
        self.check_attachable(window, child)?;
        if let Some(previous) = previous {
            self.remove_child(window, previous)?;
        }
        self.with_window(window, |state| {
            state.content = Some(child);
            Ok(())
        })?;
        self.link(window, child);
        self.queue_resize_node(window);
        Ok(())
    }

    /// Set the size a window uses in place of its content's natural size.
    pub fn set_default_size(&mut self, window: impl Into<NodeId>, size: Option<Expanse>) -> Result<()> {
        let window = window.into();
        self.with_window(window, |state| {
            state.default_size = size;
            Ok(())
        })?;
        self.queue_window(window);
        Ok(())
    }

    /// Report a size change made by the host, such as the user dragging the
    /// window frame. The window renegotiates in the next batch.
    pub fn resize_window(&mut self, window: impl Into<NodeId>, size: Expanse) -> Result<()> {
        let window = window.into();
        self.with_window(window, |state| {
            state.user_size = Some(size);
            Ok(())
        })?;
        self.queue_window(window);
        Ok(())
    }

    /// Remove a child from its container, leaving it detached in the arena.
    pub fn remove_child(&mut self, parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Result<()> {
        let (parent, child) = (parent.into(), child.into());
        if self.get(child)?.parent != Some(parent) {
            self.get(parent)?;
            return Err(Error::NotAChild { parent, child });
        }
        let node = self.get_mut(parent)?;
        match &mut node.kind {
            NodeKind::Box(layout) => {
                if let Some(i) = layout.position(child) {
                    layout.placements.remove(i);
                }
            }
            NodeKind::Table(layout) => {
                if let Some(i) = layout.position(child) {
                    layout.placements.remove(i);
                }
            }
            NodeKind::Window(state) => {
                state.content = None;
            }
            NodeKind::Leaf(_) => {}
        }
        node.children.retain(|c| *c != child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            node.allocation = None;
        }
        self.queue_resize_node(parent);
        Ok(())
    }

    /// Detach a node from its parent, if it has one.
    pub fn detach(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        match self.get(id)?.parent {
            Some(parent) => self.remove_child(parent, id),
            None => Ok(()),
        }
    }

    /// Remove a node and all of its descendants from the arena.
    pub fn remove_subtree(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        self.detach(id)?;
        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes.remove(n) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        tracing::trace!(?id, removed, "subtree removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedWidget, ManualLoop};

    fn core() -> Core {
        Core::new(ManualLoop::default())
    }

    #[test]
    fn attach_rejects_second_parent() -> Result<()> {
        let mut core = core();
        let a = core.add_box(Orientation::Horizontal, 0);
        let b = core.add_box(Orientation::Vertical, 0);
        let leaf = core.add_leaf(FixedWidget::new(1, 1));
        core.pack_start(a, leaf, PackMode::Natural, 0)?;
        assert!(matches!(
            core.pack_start(b, leaf, PackMode::Natural, 0),
            Err(Error::AlreadyAttached(id)) if id == leaf
        ));
        assert_eq!(core.children(a)?, &[leaf]);
        assert!(core.children(b)?.is_empty());
        Ok(())
    }

    #[test]
    fn attach_rejects_cycles() -> Result<()> {
        let mut core = core();
        let outer = core.add_box(Orientation::Horizontal, 0);
        let inner = core.add_box(Orientation::Horizontal, 0);
        core.pack_start(outer, inner, PackMode::Natural, 0)?;
        assert!(matches!(
            core.pack_start(inner, outer, PackMode::Natural, 0),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            core.pack_start(inner, inner, PackMode::Natural, 0),
            Err(Error::WouldCreateCycle { .. })
        ));
        Ok(())
    }

    #[test]
    fn windows_are_top_level() {
        let mut core = core();
        let b = core.add_box(Orientation::Horizontal, 0);
        let w = core.add_window();
        assert!(matches!(
            core.pack_start(b, w, PackMode::Natural, 0),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn container_kind_is_checked() {
        let mut core = core();
        let t = core.add_table(0, 0);
        let leaf = core.add_leaf(FixedWidget::new(1, 1));
        assert!(matches!(
            core.pack_start(t, leaf, PackMode::Natural, 0),
            Err(Error::NotAContainer { expected: "box", .. })
        ));
        assert!(core.node(leaf).is_some_and(|n| n.parent().is_none()));
    }

    #[test]
    fn invalid_span_rejected_before_queueing() {
        let mut core = core();
        let t = core.add_table(0, 0);
        let leaf = core.add_leaf(FixedWidget::new(1, 1));
        assert!(matches!(
            core.attach(t, leaf, Cells::new(1, 1, 0, 1), AttachOptions::default()),
            Err(Error::InvalidSpan { start: 1, end: 1 })
        ));
        assert!(core.scheduler().is_empty());
    }

    #[test]
    fn reorder_moves_placement_and_child() -> Result<()> {
        let mut core = core();
        let b = core.add_box(Orientation::Horizontal, 0);
        let ids: Vec<NodeId> = (0..3).map(|_| core.add_leaf(FixedWidget::new(1, 1))).collect();
        for id in &ids {
            core.pack_start(b, *id, PackMode::Natural, 0)?;
        }
        core.reorder_child(b, ids[2], 0)?;
        assert_eq!(core.children(b)?, &[ids[2], ids[0], ids[1]]);
        let order: Vec<NodeId> = core
            .box_layout(b)?
            .placements()
            .iter()
            .map(|p| p.child())
            .collect();
        assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
        Ok(())
    }

    #[test]
    fn remove_subtree_drops_descendants() -> Result<()> {
        let mut core = core();
        let w = core.add_window();
        let b = core.add_box(Orientation::Vertical, 0);
        let leaf = core.add_leaf(FixedWidget::new(1, 1));
        core.set_content(w, b)?;
        core.pack_start(b, leaf, PackMode::Natural, 0)?;
        core.remove_subtree(b)?;
        assert!(!core.contains(b));
        assert!(!core.contains(leaf));
        assert_eq!(core.window_state(w)?.content(), None);
        assert!(core.children(w)?.is_empty());
        Ok(())
    }

    #[test]
    fn unchanged_props_do_not_queue() -> Result<()> {
        let mut core = core();
        let leaf = core.add_leaf(FixedWidget::new(1, 1));
        assert!(!core.with_props_of(leaf, |p| p.hexpand = false)?);
        assert!(core.scheduler().is_empty());
        assert!(core.with_props_of(leaf, |p| p.hexpand = true)?);
        assert_eq!(core.scheduler().pending_checks(), &[leaf]);
        Ok(())
    }
}
