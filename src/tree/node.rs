//! Node storage: ids, the node enum, and the generational arena that owns
//! every node of a tree.

use crate::error::{Error, Result};
use crate::tree::content::{AnchorNode, ContentNode};
use crate::tree::tag::{Children, TagNode};
use std::fmt;

/// Handle to a node in an [`OverlayTree`](crate::OverlayTree).
///
/// Ids carry a generation, so an id kept after its node was disposed never
/// aliases a node created later in the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the tree's arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}v{}", self.index, self.generation)
    }
}

/// The four kinds of node, as reported by
/// [`OverlayTree::node_type`](crate::OverlayTree::node_type).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Tag,
    Content,
    Anchor,
}

impl NodeType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Tag => "tag",
            Self::Content => "content",
            Self::Anchor => "anchor",
        }
    }

    /// Whether nodes of this type own children.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Root | Self::Tag)
    }
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Root(Children),
    Tag(TagNode),
    Content(ContentNode),
    Anchor(AnchorNode),
}

/// A node plus the bookkeeping every node carries.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    /// Non-owning link to the composite holding this node.
    pub(crate) parent: Option<NodeId>,
    /// Absolute char offset into the backing store.
    pub(crate) offset: usize,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) const fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            offset: 0,
            kind,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Root(children) => children.length,
            NodeKind::Tag(tag) => tag.children.length,
            NodeKind::Content(content) => content.len(),
            NodeKind::Anchor(anchor) => anchor.len(),
        }
    }

    pub(crate) const fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::Root(_) => NodeType::Root,
            NodeKind::Tag(_) => NodeType::Tag,
            NodeKind::Content(_) => NodeType::Content,
            NodeKind::Anchor(_) => NodeType::Anchor,
        }
    }

    pub(crate) const fn children(&self) -> Option<&Children> {
        match &self.kind {
            NodeKind::Root(children) => Some(children),
            NodeKind::Tag(tag) => Some(&tag.children),
            NodeKind::Content(_) | NodeKind::Anchor(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        match &mut self.kind {
            NodeKind::Root(children) => Some(children),
            NodeKind::Tag(tag) => Some(&mut tag.children),
            NodeKind::Content(_) | NodeKind::Anchor(_) => None,
        }
    }

    pub(crate) const fn as_tag(&self) -> Option<&TagNode> {
        match &self.kind {
            NodeKind::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn as_tag_mut(&mut self) -> Option<&mut TagNode> {
        match &mut self.kind {
            NodeKind::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Generational arena owning every node of one tree.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
}

impl NodeArena {
    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::new(index, 0)
    }

    /// Free a slot. The next node stored there gets a new generation.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.live -= 1;
        Some(node)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(Error::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(Error::UnknownNode(id))
    }

    /// Length of a live node, 0 for stale ids.
    pub(crate) fn len_of(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, Node::len)
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.get(id).and_then(Node::children) {
            Some(children) => &children.ids,
            None => &[],
        }
    }

    /// Every live node id, in slot order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|_| NodeId::new(index as u32, slot.generation))
        })
    }

    pub(crate) const fn live(&self) -> usize {
        self.live
    }

    /// `id` followed by all its descendants, parents before children.
    pub(crate) fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children_of(next).iter().rev());
        }
        out
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.get(current).and_then(|node| node.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str) -> Node {
        Node::new(NodeKind::Content(ContentNode::new(text)))
    }

    #[test]
    fn test_stale_ids_are_rejected() {
        let mut arena = NodeArena::default();
        let first = arena.insert(content("a"));
        assert!(arena.remove(first).is_some());

        let second = arena.insert(content("b"));
        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
        assert!(arena.remove(first).is_none());
        assert_eq!(arena.node(first).unwrap_err(), Error::UnknownNode(first));
        assert_eq!(arena.len_of(second), 1);
        assert_eq!(arena.live(), 1);
    }

    #[test]
    fn test_subtree_order_and_ancestry() {
        let mut arena = NodeArena::default();
        let root = arena.insert(Node::new(NodeKind::Root(Children::default())));
        let a = arena.insert(content("a"));
        let b = arena.insert(content("b"));
        for child in [a, b] {
            arena.get_mut(child).unwrap().parent = Some(root);
            arena
                .get_mut(root)
                .unwrap()
                .children_mut()
                .unwrap()
                .ids
                .push(child);
        }

        assert_eq!(arena.subtree(root), vec![root, a, b]);
        assert!(arena.is_ancestor_or_self(root, b));
        assert!(arena.is_ancestor_or_self(b, b));
        assert!(!arena.is_ancestor_or_self(a, root));
        assert_eq!(arena.ids().count(), 3);
    }

    #[test]
    fn test_node_type_names() {
        assert_eq!(NodeType::Anchor.name(), "anchor");
        assert!(NodeType::Tag.is_composite());
        assert!(!NodeType::Content.is_composite());
    }
}
