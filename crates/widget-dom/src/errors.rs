//! Error types surfaced by the document model.

use thiserror::Error;

use crate::node::NodeId;

/// Errors returned while parsing, mutating or serialising a [`crate::Document`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    /// The markup is not well formed.
    #[error("malformed XML at byte {position}: {message}")]
    Syntax {
        /// Byte offset reported by the reader.
        position: u64,
        /// Reader diagnostic.
        message: String,
    },

    /// The document contains no root element.
    #[error("document has no root element")]
    MissingRoot,

    /// The node cannot be inserted at the requested position.
    #[error("node {child} cannot be inserted under {parent}: {reason}")]
    HierarchyRequest {
        /// Prospective parent.
        parent: NodeId,
        /// Node being inserted.
        child: NodeId,
        /// Why the insertion was refused.
        reason: &'static str,
    },

    /// The node is not a child of the supplied parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Parent that was searched.
        parent: NodeId,
        /// Node that was expected under it.
        child: NodeId,
    },

    /// The identifier does not name a node owned by this document.
    #[error("node {0} does not belong to this document")]
    UnknownNode(NodeId),

    /// Serialisation failed.
    #[error("failed to write XML: {message}")]
    Write {
        /// Writer diagnostic.
        message: String,
    },
}

impl DomError {
    pub(crate) fn syntax(position: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn hierarchy(parent: NodeId, child: NodeId, reason: &'static str) -> Self {
        Self::HierarchyRequest {
            parent,
            child,
            reason,
        }
    }
}
