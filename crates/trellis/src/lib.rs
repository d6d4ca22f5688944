//! Trellis: the geometry negotiation engine of a widget toolkit.
//!
//! Trellis computes preferred sizes for a widget tree bottom-up, distributes
//! space inside box and table containers, and reallocates dirty widgets in a
//! deferred, depth-ordered batch. Native controls are supplied by the host
//! through the [`Widget`] trait, and the host run loop through [`RunLoop`].
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Core`] - The widget arena, query protocol and scheduler
//! - [`Widget`] - The trait implemented by leaf widget backends
//! - [`RunLoop`] - The host checkpoint hook that drives batches
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Expanse, Edges)
//! - [`layout`] - Size types and the box, table and window containers
//! - `testing` - Instrumented widgets and run loops for tests (`testing` feature)

#![warn(missing_docs)]

// Internal core module - re-export specific items below
mod core;

// Public modules
pub mod geom;
pub mod layout;
pub mod widget;

pub use core::{
    BatchState, BatchStats, Config, Core, Node, NodeId, NodeKind, Props, RunLoop, Scheduler,
};
pub use core::{dump, error};
#[cfg(any(test, feature = "testing"))]
pub use core::testing;

pub use widget::{Applied, Widget};
