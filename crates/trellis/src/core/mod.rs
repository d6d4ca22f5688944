#![allow(clippy::new_without_default)]
//! Core types for the trellis geometry engine.

// Core modules - public
/// Engine configuration.
pub mod config;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
/// Node data stored in the arena.
pub mod node;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Core modules - internal
/// Node ID types.
pub mod id;
/// Measurement and allocation traversal.
pub mod pass;
/// Deferred resize batching.
pub mod scheduler;
/// Arena, tree and container operations.
pub mod world;

// Public exports from internal modules
pub use config::Config;
pub use id::NodeId;
pub use node::{Node, NodeKind, Props};
pub use scheduler::{BatchState, BatchStats, RunLoop, Scheduler};
pub use world::Core;
