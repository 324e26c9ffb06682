//! Tag nodes: composites that own children and one style object.

use crate::store::StyleHandle;
use crate::style::TagStyle;
use crate::tree::node::NodeId;
use std::ops::Range;

/// Ordered child list plus the cached sum of the children's lengths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Children {
    pub(crate) ids: Vec<NodeId>,
    pub(crate) length: usize,
}

impl Children {
    pub(crate) fn position(&self, id: NodeId) -> Option<usize> {
        self.ids.iter().position(|&child| child == id)
    }
}

/// The store-side state of a bound tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) handle: StyleHandle,
    /// Range last written to the store; `None` when nothing is applied.
    pub(crate) applied: Option<Range<usize>>,
}

/// Composite node carrying a style descriptor over its whole extent.
#[derive(Clone, Debug)]
pub struct TagNode {
    pub(crate) children: Children,
    descriptor: TagStyle,
    pub(crate) binding: Option<Binding>,
}

impl TagNode {
    #[must_use]
    pub fn new(descriptor: TagStyle) -> Self {
        Self {
            children: Children::default(),
            descriptor,
            binding: None,
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &TagStyle {
        &self.descriptor
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Sum of the children's lengths.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.children.length
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.children.length == 0
    }

    /// Swap in a new descriptor with the same identity. Returns whether
    /// anything changed.
    pub(crate) fn restyle(&mut self, descriptor: &TagStyle) -> bool {
        debug_assert!(self.descriptor.same_identity(descriptor));
        if self.descriptor == *descriptor {
            return false;
        }
        self.descriptor = descriptor.clone();
        true
    }

    /// The range this tag must cover when it starts at `offset`.
    pub(crate) const fn target_range(&self, offset: usize) -> Option<Range<usize>> {
        if self.children.length == 0 {
            None
        } else {
            Some(offset..offset + self.children.length)
        }
    }
}
