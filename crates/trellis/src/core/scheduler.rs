//! Deferred, depth-ordered resize batching.
//!
//! Geometry mutations enqueue the affected node for a size check and arm a
//! single checkpoint request with the host [`RunLoop`]. When the host fires the
//! checkpoint, [`Core::run_checkpoint`] drains the queues:
//!
//! 1. **Size check**, deepest nodes first. A node whose unconstrained
//!    measurement changed pushes its parent onto the check queue; a stable
//!    node is queued for reallocation instead.
//! 2. **Reallocate**, shallowest nodes first. Windows awaiting renegotiation
//!    re-run their size adjustment before being reallocated. Allocating a node
//!    allocates its visible descendants, so those are skipped if queued.
//!
//! Work queued while the batch runs is picked up by re-scanning the queues,
//! never by a nested batch. All queues are cleared when the batch ends, even
//! if a participant panics.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
    mem,
};

use scopeguard::guard;
use slotmap::SlotMap;

use crate::{
    core::{id::NodeId, node::Node, pass::LayoutPass, world::Core},
    geom::Rect,
    layout::Constraints,
};

/// The host run loop, as seen by the scheduler.
pub trait RunLoop {
    /// Arrange for [`Core::run_checkpoint`] to be called exactly once, after
    /// the currently pending handlers and before the loop's next iteration.
    /// The scheduler never has more than one request outstanding.
    fn request_checkpoint(&mut self);
}

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    /// Nothing queued.
    #[default]
    Idle,
    /// A checkpoint has been requested and not yet fired.
    Pending,
    /// A batch is draining the queues.
    Running,
}

/// Counters describing one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    /// Size checks performed.
    pub checks: usize,
    /// Nodes allocated, including descendants reached transitively.
    pub reallocations: usize,
    /// Windows that re-ran their size adjustment.
    pub renegotiations: usize,
    /// Size-check/reallocate rounds.
    pub passes: usize,
}

/// An insertion-ordered queue holding each node at most once.
#[derive(Debug, Default)]
struct Queue {
    /// Nodes in queue order.
    items: Vec<NodeId>,
    /// Membership of `items`.
    members: HashSet<NodeId>,
}

impl Queue {
    /// Push an id if absent.
    fn push(&mut self, id: NodeId) -> bool {
        if self.members.insert(id) {
            self.items.push(id);
            true
        } else {
            false
        }
    }

    /// Remove and return every queued id, in queue order.
    fn take(&mut self) -> Vec<NodeId> {
        self.members.clear();
        mem::take(&mut self.items)
    }

    /// Drop every queued id.
    fn clear(&mut self) {
        self.items.clear();
        self.members.clear();
    }
}

/// A size check ranked for popping: deepest first, then earliest queued.
type Ranked = (usize, Reverse<u64>, NodeId);

/// Queues of nodes awaiting a size check, reallocation or window
/// renegotiation. Each queue holds a node at most once.
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Size checks queued since the last pop, in queue order.
    check: Vec<NodeId>,
    /// Size checks ranked by depth, filled from `check` when popping.
    ranked: BinaryHeap<Ranked>,
    /// Membership of `check` and `ranked`.
    checking: HashSet<NodeId>,
    /// Queue sequence of each entry in `check`, parallel to it.
    check_seq: Vec<u64>,
    /// Next sequence number.
    seq: u64,
    /// Nodes awaiting reallocation.
    realloc: Queue,
    /// Windows awaiting size renegotiation.
    windows: Queue,
    /// Lifecycle state.
    state: BatchState,
}

impl Scheduler {
    /// Current lifecycle state.
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Nodes awaiting a size check, in queue order. Outside a batch this is
    /// every queued check.
    pub fn pending_checks(&self) -> &[NodeId] {
        &self.check
    }

    /// Nodes awaiting reallocation, in queue order.
    pub fn pending_reallocations(&self) -> &[NodeId] {
        &self.realloc.items
    }

    /// Windows awaiting renegotiation, in queue order.
    pub fn pending_windows(&self) -> &[NodeId] {
        &self.windows.items
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.checking.is_empty()
            && self.realloc.items.is_empty()
            && self.windows.items.is_empty()
    }

    /// Queue a size check. Returns false if the node was already queued.
    pub(crate) fn queue_check(&mut self, id: NodeId) -> bool {
        if !self.checking.insert(id) {
            return false;
        }
        self.check.push(id);
        self.check_seq.push(self.seq);
        self.seq += 1;
        true
    }

    /// Queue a reallocation. Returns false if the node was already queued.
    pub(crate) fn queue_realloc(&mut self, id: NodeId) -> bool {
        self.realloc.push(id)
    }

    /// Queue a window renegotiation. Returns false if already queued.
    pub(crate) fn queue_window(&mut self, id: NodeId) -> bool {
        self.windows.push(id)
    }

    /// Move from idle to pending. Returns true if the caller must request a
    /// checkpoint from the host.
    pub(crate) fn arm(&mut self) -> bool {
        if self.state == BatchState::Idle {
            self.state = BatchState::Pending;
            true
        } else {
            false
        }
    }

    /// Remove and return the deepest queued check. Ties go to the node queued
    /// first. Each node's depth is computed once, when it is ranked. Nodes no
    /// longer in the arena are dropped.
    fn pop_deepest(&mut self, nodes: &SlotMap<NodeId, Node>) -> Option<NodeId> {
        let seqs = mem::take(&mut self.check_seq);
        for (id, seq) in self.check.drain(..).zip(seqs) {
            if nodes.contains_key(id) {
                self.ranked.push((depth(nodes, id), Reverse(seq), id));
            } else {
                self.checking.remove(&id);
            }
        }
        while let Some((_, _, id)) = self.ranked.pop() {
            self.checking.remove(&id);
            if nodes.contains_key(id) {
                return Some(id);
            }
        }
        None
    }

    /// Number of queued size checks.
    fn check_len(&self) -> usize {
        self.checking.len()
    }

    /// Clear every queue and return to idle.
    fn reset(&mut self) {
        self.check.clear();
        self.check_seq.clear();
        self.ranked.clear();
        self.checking.clear();
        self.realloc.clear();
        self.windows.clear();
        self.state = BatchState::Idle;
    }
}

/// Number of ancestors of a node.
pub(crate) fn depth(nodes: &SlotMap<NodeId, Node>, id: NodeId) -> usize {
    let mut d = 0;
    let mut current = nodes.get(id).and_then(|n| n.parent);
    while let Some(p) = current {
        d += 1;
        current = nodes.get(p).and_then(|n| n.parent);
    }
    d
}

/// Run one batch. Called by [`Core::run_checkpoint`].
pub(crate) fn run_batch(core: &mut Core) -> BatchStats {
    core.scheduler.state = BatchState::Running;
    let max_passes = core.config.max_batch_passes.max(1);
    let mut core = guard(core, |core| core.scheduler.reset());
    let mut stats = BatchStats::default();

    while !core.scheduler.is_empty() {
        if stats.passes >= max_passes {
            tracing::warn!(
                passes = stats.passes,
                checks = core.scheduler.check_len(),
                reallocations = core.scheduler.realloc.items.len(),
                "resize batch did not settle; dropping queued work"
            );
            break;
        }
        stats.passes += 1;
        check_phase(&mut core, &mut stats);
        reallocate_phase(&mut core, &mut stats);
    }

    tracing::debug!(
        checks = stats.checks,
        reallocations = stats.reallocations,
        renegotiations = stats.renegotiations,
        passes = stats.passes,
        "resize batch complete"
    );
    stats
}

/// Drain the check queue, deepest first, re-scanning as checks enqueue
/// parents.
fn check_phase(core: &mut Core, stats: &mut BatchStats) {
    while let Some(id) = core.scheduler.pop_deepest(&core.nodes) {
        stats.checks += 1;
        check_node(core, id);
    }
}

/// Re-measure one node and decide where its change propagates.
fn check_node(core: &mut Core, id: NodeId) {
    let Some(previous) = core.nodes.get(id).map(|n| n.last_request) else {
        return;
    };
    let current = LayoutPass::new(core).measure(id, Constraints::UNBOUNDED);
    let Some(node) = core.nodes.get_mut(id) else {
        return;
    };
    node.last_request = Some(current);
    let parent = node.parent;
    let is_window = node.is_window();

    if previous == Some(current) {
        tracing::trace!(?id, "size stable");
        core.scheduler.queue_realloc(id);
        return;
    }
    tracing::trace!(?id, ?previous, ?current, "size changed");
    match parent {
        Some(parent) => {
            if let Some(p) = core.nodes.get_mut(parent) {
                p.invalidate();
            }
            core.scheduler.queue_check(parent);
        }
        None if is_window => {
            core.scheduler.queue_window(id);
        }
        None => {
            core.scheduler.queue_realloc(id);
        }
    }
}

/// Renegotiate queued windows, then reallocate queued nodes shallowest first.
fn reallocate_phase(core: &mut Core, stats: &mut BatchStats) {
    let windows = core.scheduler.windows.take();
    for id in windows {
        if !core.contains(id) {
            continue;
        }
        stats.renegotiations += 1;
        core.renegotiate_window(id);
        core.scheduler.queue_realloc(id);
    }

    let mut queued = core.scheduler.realloc.take();
    queued.retain(|id| core.is_shown(*id));
    let depths: Vec<usize> = queued.iter().map(|id| depth(&core.nodes, *id)).collect();
    let mut order: Vec<usize> = (0..queued.len()).collect();
    order.sort_by_key(|i| depths[*i]);

    let targets: Vec<(NodeId, Rect)> = order
        .into_iter()
        .filter_map(|i| {
            let id = queued[i];
            core.realloc_target(id).map(|rect| (id, rect))
        })
        .collect();

    let mut pass = LayoutPass::new(core);
    let mut seen = HashSet::new();
    for (id, rect) in targets {
        if pass.was_allocated(id) || !seen.insert(id) {
            continue;
        }
        pass.allocate(id, rect);
    }
    stats.reallocations += pass.allocated_count();
}
