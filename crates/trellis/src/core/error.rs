use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::NodeId;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// The node does not exist in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The node already has a parent.
    #[error("node already attached: {0:?}")]
    AlreadyAttached(NodeId),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Proposed parent.
        parent: NodeId,
        /// Proposed child.
        child: NodeId,
    },

    /// The node is not a direct child of the container.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Container node.
        parent: NodeId,
        /// Node that was expected to be a child.
        child: NodeId,
    },

    /// A container operation was applied to the wrong kind of node.
    #[error("{node:?} is not a {expected}")]
    NotAContainer {
        /// Offending node.
        node: NodeId,
        /// The kind of node the operation needs.
        expected: &'static str,
    },

    /// A table span is empty or reversed.
    #[error("invalid span {start}..{end}")]
    InvalidSpan {
        /// First cell index.
        start: u32,
        /// One past the last cell index.
        end: u32,
    },

    /// A table span reaches past the largest supported cell index.
    #[error("span end {end} exceeds cell limit {limit}")]
    CellOutOfRange {
        /// One past the last cell index.
        end: u32,
        /// Largest accepted end index.
        limit: u32,
    },

    /// Invalid operation error.
    #[error("invalid: {0}")]
    InvalidOperation(String),

    /// Failure reported by a leaf widget backend, before it is tied to a node.
    #[error("backend: {0}")]
    Backend(String),

    /// Failure from a leaf widget backend during measurement or allocation.
    #[error("widget {node:?}: {message}")]
    Widget {
        /// Node whose backend failed.
        node: NodeId,
        /// Backend error message.
        message: String,
    },

    /// Internal error.
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// Attribute a backend failure to a node.
    pub fn for_node(self, node: NodeId) -> Self {
        match self {
            Self::Backend(message) => Self::Widget { node, message },
            Self::Widget { .. } => self,
            other => Self::Widget {
                node,
                message: other.to_string(),
            },
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
