//! Declarative driver entry points.
//!
//! A reconciler that diffs a declarative tree hands the overlay tree plain
//! property records. `mount` creates a detached node from them, `update`
//! applies the difference between two records, and `unmount` disposes the
//! node. Placement goes through the structural calls on [`OverlayTree`].

use crate::error::{Error, Result};
use crate::store::TextStore;
use crate::style::TagStyle;
use crate::tree::{NodeId, NodeType, OverlayTree};

/// Properties of one declarative node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeProps {
    Tag(TagStyle),
    Content { text: String },
    Anchor,
}

impl NodeProps {
    #[must_use]
    pub const fn tag(style: TagStyle) -> Self {
        Self::Tag(style)
    }

    #[must_use]
    pub fn content(text: impl Into<String>) -> Self {
        Self::Content { text: text.into() }
    }

    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Tag(_) => NodeType::Tag,
            Self::Content { .. } => NodeType::Content,
            Self::Anchor => NodeType::Anchor,
        }
    }
}

impl<S: TextStore> OverlayTree<S> {
    /// Create a detached node described by `props`.
    pub fn mount(&mut self, props: &NodeProps) -> NodeId {
        match props {
            NodeProps::Tag(style) => self.create_tag(style.clone()),
            NodeProps::Content { text } => self.create_content(text.as_str()),
            NodeProps::Anchor => self.create_anchor(),
        }
    }

    /// Apply the change from `old` to `new` to a mounted node.
    ///
    /// A changed tag id is an [`Error::InvariantViolation`] and nothing is
    /// applied. Anchors have nothing to update.
    pub fn update(&mut self, id: NodeId, old: &NodeProps, new: &NodeProps) -> Result<()> {
        let actual = self.node_type(id)?;
        if old.node_type() != actual || new.node_type() != actual {
            return Err(Error::WrongKind {
                node: id,
                expected: actual.name(),
            });
        }
        match (old, new) {
            (NodeProps::Tag(old), NodeProps::Tag(new)) => {
                if old == new {
                    return Ok(());
                }
                if !old.same_identity(new) {
                    return Err(Error::InvariantViolation {
                        node: id,
                        detail: format!("tag id changed from '{}' to '{}'", old.id(), new.id()),
                    });
                }
                self.restyle(id, new)
            }
            (NodeProps::Content { text: old }, NodeProps::Content { text: new }) => {
                if old == new {
                    return Ok(());
                }
                self.set_text(id, new.as_str())
            }
            _ => Ok(()),
        }
    }

    /// Dispose a mounted node and its subtree.
    pub fn unmount(&mut self, id: NodeId) -> Result<()> {
        self.dispose(id)
    }
}
