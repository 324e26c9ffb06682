//! The overlay tree: nodes, offsets, and reconciliation against a store.
//!
//! [`OverlayTree`] owns every node in an arena and plays the role of the root
//! composite. Each public mutating call is one reconciliation pass: the tree
//! shape is edited, the change climbs the [`ContentParent`] chain fixing
//! cached lengths and offsets, the root mirrors text into the store, and the
//! materialization pass brings every affected tag's style range up to date.

mod content;
mod materialize;
mod node;
mod offsets;
mod parent;
mod props;
mod tag;
mod verify;

pub use content::{AnchorNode, ContentNode};
pub use node::{NodeId, NodeType};
pub use offsets::OffsetStrategy;
pub use parent::ContentParent;
pub use props::NodeProps;
pub use tag::TagNode;

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log, log_with};
use crate::store::{StyleHandle, TextStore};
use crate::style::TagStyle;
use content::shared_affixes;
use materialize::{
    BoundIds, PassStats, bind_subtree, check_unique_ids, materialize, reapply, unbind_subtree,
};
use node::{Node, NodeArena, NodeKind};
use offsets::shift_subtree;
use parent::{Edit, EditKind, Notifier};
use std::ops::Range;
use tag::Children;

/// Tree configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeOptions {
    /// Width of every anchor node in chars. Must match the store's
    /// [`TextStore::anchor_len`].
    pub anchor_len: usize,
    /// How offsets are re-derived after an edit.
    pub offset_strategy: OffsetStrategy,
    /// Run [`OverlayTree::verify`] after every pass.
    pub verify_each_pass: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            anchor_len: 1,
            offset_strategy: OffsetStrategy::Shift,
            verify_each_pass: cfg!(debug_assertions),
        }
    }
}

impl TreeOptions {
    #[must_use]
    pub const fn with_anchor_len(mut self, anchor_len: usize) -> Self {
        self.anchor_len = anchor_len;
        self
    }

    #[must_use]
    pub const fn with_offset_strategy(mut self, strategy: OffsetStrategy) -> Self {
        self.offset_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_verify_each_pass(mut self, verify: bool) -> Self {
        self.verify_each_pass = verify;
        self
    }
}

/// A tree of styled text regions reconciled against one [`TextStore`].
///
/// ```
/// use text_overlay::{OverlayTree, Style, TagStyle};
/// use text_overlay::store::RopeStore;
///
/// let mut tree = OverlayTree::new();
/// tree.attach_store(RopeStore::new()).unwrap();
///
/// let bold = tree.create_tag(TagStyle::new("bold").with_style(Style::bold()));
/// let hello = tree.create_content("hello");
/// tree.append_child(bold, hello).unwrap();
/// tree.append_child(tree.root(), bold).unwrap();
///
/// let store = tree.store().unwrap();
/// assert_eq!(store.text(), "hello");
/// let handle = tree.style_handle(bold).unwrap().unwrap();
/// assert_eq!(store.style_ranges(handle), vec![0..5]);
/// ```
#[derive(Debug)]
pub struct OverlayTree<S: TextStore> {
    pub(crate) arena: NodeArena,
    root: NodeId,
    pub(crate) store: Option<S>,
    /// Tag ids registered with the store.
    pub(crate) bound_ids: BoundIds,
    pub(crate) options: TreeOptions,
    /// Tags whose offset or length changed during the current pass.
    pub(crate) dirty: Vec<NodeId>,
    poisoned: bool,
}

impl<S: TextStore> Default for OverlayTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TextStore> OverlayTree<S> {
    /// Create an empty, unbound tree with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TreeOptions::default())
    }

    #[must_use]
    pub fn with_options(options: TreeOptions) -> Self {
        let mut arena = NodeArena::default();
        let root = arena.insert(Node::new(NodeKind::Root(Children::default())));
        Self {
            arena,
            root,
            store: None,
            bound_ids: BoundIds::new(),
            options,
            dirty: Vec::new(),
            poisoned: false,
        }
    }

    #[must_use]
    pub const fn options(&self) -> TreeOptions {
        self.options
    }

    /// The root composite. Its offset is always 0.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.store.is_some()
    }

    #[must_use]
    pub const fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    /// Live nodes, the root included.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.arena.live()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a detached content node.
    pub fn create_content(&mut self, text: impl Into<String>) -> NodeId {
        self.arena
            .insert(Node::new(NodeKind::Content(ContentNode::new(text))))
    }

    /// Create a detached anchor of the configured width.
    pub fn create_anchor(&mut self) -> NodeId {
        let anchor = AnchorNode::new(self.options.anchor_len);
        self.arena.insert(Node::new(NodeKind::Anchor(anchor)))
    }

    /// Create a detached, unbound tag.
    pub fn create_tag(&mut self, style: TagStyle) -> NodeId {
        self.arena.insert(Node::new(NodeKind::Tag(TagNode::new(style))))
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append `child` to `parent`. A child that already has a parent is
    /// moved.
    ///
    /// Into a bound tree, a tag whose id is already bound elsewhere fails
    /// with [`Error::DuplicateTagId`] and nothing changes.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.run(|tree| tree.insert_at(parent, child, None))
    }

    /// Insert `child` before `before` in `parent`. When `before` is not a
    /// child of `parent`, `child` is appended.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<()> {
        self.run(|tree| tree.insert_at(parent, child, Some(before)))
    }

    /// Detach `child` from `parent`. The child keeps its subtree and can be
    /// inserted again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.run(|tree| tree.unlink(parent, child))
    }

    /// Remove `id` from its parent and free it with its whole subtree.
    ///
    /// Stale ids are ignored. Disposing the root disposes all its children.
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        self.run(|tree| tree.dispose_node(id))
    }

    /// Replace the text of a content node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.run(|tree| tree.replace_text(id, text))
    }

    /// Change the visual fields of a tag. Its id must stay the same.
    pub fn restyle(&mut self, id: NodeId, style: &TagStyle) -> Result<()> {
        self.run(|tree| tree.restyle_tag(id, style))
    }

    /// Bring one tag's store range up to date with its offset and length.
    ///
    /// Idempotent. On an unbound tag this does nothing.
    pub fn reapply_tag(&mut self, id: NodeId) -> Result<()> {
        self.run(|tree| {
            tree.arena
                .node(id)?
                .as_tag()
                .ok_or(Error::WrongKind {
                    node: id,
                    expected: NodeType::Tag.name(),
                })?;
            let Some(store) = tree.store.as_mut() else {
                log_with(LogLevel::Debug, || format!("reapply on unbound {id} ignored"));
                return Ok(());
            };
            let mut stats = PassStats::default();
            reapply(&mut tree.arena, store, id, &mut stats)
        })
    }

    // ------------------------------------------------------------------
    // Store binding
    // ------------------------------------------------------------------

    /// Bind the tree to `store`.
    ///
    /// Whatever text the store holds is replaced by the tree's text, every
    /// tag gets a registered style handle, and every non-empty tag is applied.
    ///
    /// Two tags sharing an id fail with [`Error::DuplicateTagId`] before the
    /// store is touched; the tree stays unbound.
    pub fn attach_store(&mut self, store: S) -> Result<()> {
        if self.store.is_some() {
            return Err(Error::AlreadyBound);
        }
        if store.anchor_len() != self.options.anchor_len {
            return Err(Error::AnchorWidthMismatch {
                tree: self.options.anchor_len,
                store: store.anchor_len(),
            });
        }
        self.run(|tree| {
            check_unique_ids(&tree.arena, &tree.bound_ids, tree.root)?;
            let mut store = store;
            let existing = store.total_length();
            if existing > 0 {
                store.delete_text(0, existing)?;
            }
            let text = tree.text();
            store.insert_text(0, &text)?;
            let store = tree.store.insert(store);
            bind_subtree(
                &mut tree.arena,
                store,
                &mut tree.bound_ids,
                tree.root,
                &mut tree.dirty,
            )?;
            emit_log(LogLevel::Info, "store attached");
            Ok(())
        })
    }

    /// Unbind every tag and hand the store back. Its text stays in place;
    /// the tree keeps its nodes and can be bound again.
    pub fn detach_store(&mut self) -> Result<Option<S>> {
        self.run(|tree| {
            if let Some(store) = tree.store.as_mut() {
                unbind_subtree(&mut tree.arena, store, &mut tree.bound_ids, tree.root)?;
                emit_log(LogLevel::Info, "store detached");
            }
            Ok(tree.store.take())
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Combined text of `id` and its descendants.
    pub fn get_text(&self, id: NodeId) -> Result<String> {
        self.text_of(id)
    }

    /// Length of `id` in chars.
    pub fn get_length(&self, id: NodeId) -> Result<usize> {
        self.arena.node(id).map(Node::len)
    }

    /// Direct children of `id`; empty for leaves.
    pub fn get_children(&self, id: NodeId) -> Result<&[NodeId]> {
        self.arena.node(id)?;
        Ok(self.arena.children_of(id))
    }

    /// Absolute offset of `id`. Detached subtrees are based at 0.
    pub fn buffer_offset(&self, id: NodeId) -> Result<usize> {
        self.arena.node(id).map(|node| node.offset)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.arena.node(id).map(|node| node.parent)
    }

    pub fn node_type(&self, id: NodeId) -> Result<NodeType> {
        self.arena.node(id).map(Node::node_type)
    }

    /// The style descriptor of a tag, `None` for other nodes.
    pub fn descriptor(&self, id: NodeId) -> Result<Option<&TagStyle>> {
        Ok(self.arena.node(id)?.as_tag().map(TagNode::descriptor))
    }

    /// The store handle of a bound tag.
    pub fn style_handle(&self, id: NodeId) -> Result<Option<StyleHandle>> {
        Ok(self
            .arena
            .node(id)?
            .as_tag()
            .and_then(|tag| tag.binding.as_ref())
            .map(|binding| binding.handle))
    }

    /// The range a bound tag last wrote to the store.
    pub fn applied_range(&self, id: NodeId) -> Result<Option<Range<usize>>> {
        Ok(self
            .arena
            .node(id)?
            .as_tag()
            .and_then(|tag| tag.binding.as_ref())
            .and_then(|binding| binding.applied.clone()))
    }

    /// Combined text of the whole tree.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.len());
        self.collect_text(self.root, &mut out);
        out
    }

    /// Length of the whole tree in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len_of(self.root)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every offset, length, parent link and applied range.
    pub fn verify(&self) -> Result<()> {
        verify::verify_tree(self)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn text_of(&self, id: NodeId) -> Result<String> {
        let node = self.arena.node(id)?;
        let mut out = String::with_capacity(node.len());
        self.collect_text(id, &mut out);
        Ok(out)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Content(content) => out.push_str(content.text()),
            NodeKind::Anchor(anchor) => out.push_str(&anchor.text()),
            NodeKind::Root(_) | NodeKind::Tag(_) => {
                for &child in self.arena.children_of(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Whether tags under `id` should hold store handles.
    fn is_bound_composite(&self, id: NodeId) -> bool {
        match self.arena.get(id).map(|node| &node.kind) {
            Some(NodeKind::Root(_)) => self.store.is_some(),
            Some(NodeKind::Tag(tag)) => tag.is_bound(),
            _ => false,
        }
    }

    /// Run one pass: the edit, then materialization. Store rejections
    /// poison the tree.
    fn run<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        let outcome = op(self).and_then(|value| self.finish_pass().map(|()| value));
        if let Err(err) = &outcome {
            if err.is_fatal() {
                self.poisoned = true;
                emit_log(LogLevel::Error, &format!("overlay tree poisoned: {err}"));
            } else {
                log_with(LogLevel::Debug, || format!("operation rejected: {err}"));
            }
            self.dirty.clear();
        }
        outcome
    }

    /// Materialize every dirty tag.
    fn flush(&mut self) -> Result<()> {
        match self.store.as_mut() {
            Some(store) => {
                let stats = materialize(&mut self.arena, store, &mut self.dirty)?;
                stats.emit(store.total_length());
            }
            None => self.dirty.clear(),
        }
        Ok(())
    }

    fn finish_pass(&mut self) -> Result<()> {
        self.flush()?;
        if self.options.verify_each_pass {
            self.verify()?;
        }
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.arena.node(parent)?;
        let child_node = self.arena.node(child)?;
        let reject = |reason| {
            Err(Error::InvalidChild {
                parent,
                child,
                reason,
            })
        };
        if parent_node.children().is_none() {
            return reject("leaf nodes cannot have children");
        }
        if matches!(child_node.kind, NodeKind::Root(_)) {
            return reject("the root cannot be a child");
        }
        if self.arena.is_ancestor_or_self(child, parent) {
            return reject("a node cannot be placed inside its own subtree");
        }
        Ok(())
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> Result<()> {
        self.check_insertable(parent, child)?;
        if self.is_bound_composite(parent) {
            check_unique_ids(&self.arena, &self.bound_ids, child)?;
        }
        if let Some(old_parent) = self.arena.node(child)?.parent {
            log_with(LogLevel::Debug, || {
                format!("moving {child} from {old_parent} to {parent}")
            });
            self.unlink(old_parent, child)?;
            // The deletion truncated overlays in the store; settle them
            // before the text is inserted again.
            self.flush()?;
        }

        let len = self.arena.len_of(child);
        let children = self
            .arena
            .node_mut(parent)?
            .children_mut()
            .ok_or(Error::InvalidChild {
                parent,
                child,
                reason: "leaf nodes cannot have children",
            })?;
        let index = before
            .and_then(|before| children.position(before))
            .unwrap_or(children.ids.len());
        children.ids.insert(index, child);
        self.arena.node_mut(child)?.parent = Some(parent);

        let edit = Edit {
            origin: child,
            kind: EditKind::Inserted { len },
        };
        Notifier::new(self, parent, edit).on_child_inserted(child)?;

        if self.is_bound_composite(parent) {
            if let Some(store) = self.store.as_mut() {
                bind_subtree(
                    &mut self.arena,
                    store,
                    &mut self.bound_ids,
                    child,
                    &mut self.dirty,
                )?;
            }
        }
        Ok(())
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self
            .arena
            .node(parent)?
            .children()
            .and_then(|children| children.position(child))
            .ok_or(Error::NotAChild { parent, child })?;

        if let Some(store) = self.store.as_mut() {
            unbind_subtree(&mut self.arena, store, &mut self.bound_ids, child)?;
        }

        let node = self.arena.node_mut(child)?;
        let offset = node.offset;
        let len = node.len();
        node.parent = None;
        if let Some(children) = self.arena.node_mut(parent)?.children_mut() {
            children.ids.remove(index);
        }

        let edit = Edit {
            origin: child,
            kind: EditKind::Removed { index, offset, len },
        };
        Notifier::new(self, parent, edit).on_child_removed(child)?;

        // Detached subtrees are based at 0 and no longer bound.
        shift_subtree(&mut self.arena, child, 0usize.wrapping_sub(offset), &mut Vec::new());
        Ok(())
    }

    fn dispose_node(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.arena.get(id).map(|node| node.parent) else {
            log_with(LogLevel::Debug, || format!("dispose of stale {id} ignored"));
            return Ok(());
        };
        if id == self.root {
            let children = self.arena.children_of(id).to_vec();
            for child in children {
                self.dispose_node(child)?;
            }
            return Ok(());
        }
        if let Some(parent) = parent {
            self.unlink(parent, id)?;
        }
        let subtree = self.arena.subtree(id);
        for next in &subtree {
            self.arena.remove(*next);
        }
        log_with(LogLevel::Debug, || {
            format!("disposed {id} ({} nodes)", subtree.len())
        });
        Ok(())
    }

    fn replace_text(&mut self, id: NodeId, text: String) -> Result<()> {
        let node = self.arena.node_mut(id)?;
        let NodeKind::Content(content) = &mut node.kind else {
            return Err(Error::WrongKind {
                node: id,
                expected: NodeType::Content.name(),
            });
        };
        if content.text() == text {
            return Ok(());
        }
        let (prefix, suffix) = shared_affixes(content.text(), &text);
        let (old_len, new_len) = content.replace(text);
        let Some(parent) = node.parent else {
            return Ok(());
        };

        let edit = Edit {
            origin: id,
            kind: EditKind::TextChanged {
                old_len,
                prefix,
                suffix,
            },
        };
        Notifier::new(self, parent, edit).on_child_text_changed(id, old_len, new_len)
    }

    fn restyle_tag(&mut self, id: NodeId, style: &TagStyle) -> Result<()> {
        let tag = self
            .arena
            .node_mut(id)?
            .as_tag_mut()
            .ok_or(Error::WrongKind {
                node: id,
                expected: NodeType::Tag.name(),
            })?;
        if !tag.descriptor().same_identity(style) {
            return Err(Error::InvariantViolation {
                node: id,
                detail: format!(
                    "tag id changed from '{}' to '{}'",
                    tag.descriptor().id(),
                    style.id()
                ),
            });
        }
        if !tag.restyle(style) {
            return Ok(());
        }
        if let (Some(binding), Some(store)) = (tag.binding.as_ref(), self.store.as_mut()) {
            store
                .update_style_handle(binding.handle, style)
                .map_err(|source| Error::StoreRejection {
                    node: Some(id),
                    source,
                })?;
        }
        Ok(())
    }
}
