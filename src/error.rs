//! Error types for overlay tree operations.

use crate::store::StoreError;
use crate::tree::NodeId;
use std::fmt;

/// Result type alias for overlay tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for overlay tree operations.
///
/// Every variant surfaces to the caller; nothing is absorbed inside the
/// tree. A store rejection, or bookkeeping found inconsistent after a pass,
/// additionally poisons the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An identity-defining field changed after construction.
    InvariantViolation { node: NodeId, detail: String },
    /// The store refused an operation. Indicates broken offset bookkeeping.
    StoreRejection {
        node: Option<NodeId>,
        source: StoreError,
    },
    /// The id is stale or was never issued by this tree.
    UnknownNode(NodeId),
    /// `child` is not a direct child of `parent`.
    NotAChild { parent: NodeId, child: NodeId },
    /// `child` cannot be placed under `parent`.
    InvalidChild {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },
    /// The operation needs a different kind of node.
    WrongKind {
        node: NodeId,
        expected: &'static str,
    },
    /// Binding `node` would register a tag id some other bound tag
    /// already holds. Nothing was changed.
    DuplicateTagId { node: NodeId, id: String },
    /// The tree is already bound to a store.
    AlreadyBound,
    /// The store's anchor width differs from the tree's.
    AnchorWidthMismatch { tree: usize, store: usize },
    /// A previous store rejection left the tree in an unknown state.
    Poisoned,
    /// Cached offsets or lengths disagree with the tree shape.
    Inconsistent { node: NodeId, detail: String },
}

impl Error {
    /// Whether this error poisons the tree.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StoreRejection { .. } | Self::Poisoned | Self::Inconsistent { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvariantViolation { node, detail } => {
                write!(f, "invariant violation on {node}: {detail}")
            }
            Self::StoreRejection {
                node: Some(node),
                source,
            } => write!(f, "store rejected operation for {node}: {source}"),
            Self::StoreRejection { node: None, source } => {
                write!(f, "store rejected operation: {source}")
            }
            Self::UnknownNode(node) => write!(f, "unknown node {node}"),
            Self::NotAChild { parent, child } => {
                write!(f, "{child} is not a child of {parent}")
            }
            Self::InvalidChild {
                parent,
                child,
                reason,
            } => write!(f, "cannot place {child} under {parent}: {reason}"),
            Self::WrongKind { node, expected } => write!(f, "{node} is not a {expected} node"),
            Self::DuplicateTagId { node, id } => {
                write!(f, "tag id '{id}' of {node} is already bound")
            }
            Self::AlreadyBound => write!(f, "tree is already bound to a store"),
            Self::AnchorWidthMismatch { tree, store } => write!(
                f,
                "anchor width mismatch: tree uses {tree}, store uses {store}"
            ),
            Self::Poisoned => write!(f, "tree poisoned by an earlier store rejection"),
            Self::Inconsistent { node, detail } => {
                write!(f, "inconsistent bookkeeping at {node}: {detail}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreRejection { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(source: StoreError) -> Self {
        Self::StoreRejection { node: None, source }
    }
}
