//! The content-parent protocol: how a change deep in the tree reaches every
//! ancestor.
//!
//! A composite that receives a notification fixes its own cached length,
//! re-derives the offsets of the children after the changed one, and then
//! forwards the notification to its own parent, naming itself as the changed
//! child. When the chain reaches a bound root, the root turns the edit into
//! text operations on the store. A leaf never needs to know how deep it sits.

use crate::error::{Error, Result};
use crate::event::{LogLevel, log_with};
use crate::store::TextStore;
use crate::tree::OverlayTree;
use crate::tree::node::{NodeId, NodeKind};
use crate::tree::offsets::update_child_offsets;

/// Upward notifications implemented by every composite.
///
/// `child` is always a direct child of the receiver whose subtree changed.
pub trait ContentParent {
    /// A node was inserted into `child`'s subtree (or `child` itself was
    /// inserted).
    fn on_child_inserted(&mut self, child: NodeId) -> Result<()>;

    /// A node was removed from `child`'s subtree (or `child` itself was
    /// removed).
    fn on_child_removed(&mut self, child: NodeId) -> Result<()>;

    /// `child`'s length went from `old_len` to `new_len` because text inside
    /// it was replaced.
    fn on_child_text_changed(&mut self, child: NodeId, old_len: usize, new_len: usize)
    -> Result<()>;
}

/// What happened at the bottom of the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Edit {
    /// The node that was inserted, removed, or had its text replaced.
    pub(crate) origin: NodeId,
    pub(crate) kind: EditKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EditKind {
    Inserted {
        len: usize,
    },
    /// `index` and `offset` are where the origin sat before it was unlinked.
    Removed {
        index: usize,
        offset: usize,
        len: usize,
    },
    /// `prefix` and `suffix` chars are the same in the old and new text.
    TextChanged {
        old_len: usize,
        prefix: usize,
        suffix: usize,
    },
}

/// Walks one edit up the parent chain of a tree.
pub(crate) struct Notifier<'t, S: TextStore> {
    tree: &'t mut OverlayTree<S>,
    /// The composite currently receiving the notification.
    at: NodeId,
    edit: Edit,
}

impl<'t, S: TextStore> Notifier<'t, S> {
    pub(crate) fn new(tree: &'t mut OverlayTree<S>, at: NodeId, edit: Edit) -> Self {
        Self { tree, at, edit }
    }

    fn index_of(&self, child: NodeId) -> Result<usize> {
        self.tree
            .arena
            .node(self.at)?
            .children()
            .and_then(|children| children.position(child))
            .ok_or(Error::NotAChild {
                parent: self.at,
                child,
            })
    }

    /// Fix the receiver's cached length and the offsets of its children from
    /// `start`. Returns the receiver's `(old_len, new_len)`.
    fn absorb(&mut self, start: usize, removed: usize, added: usize) -> Result<(usize, usize)> {
        let at = self.at;
        let node = self.tree.arena.node_mut(at)?;
        let is_tag = node.as_tag().is_some();
        let children = node.children_mut().ok_or(Error::InvalidChild {
            parent: at,
            child: self.edit.origin,
            reason: "leaf nodes cannot have children",
        })?;
        let old_len = children.length;
        children.length = old_len - removed + added;
        let new_len = children.length;

        update_child_offsets(
            &mut self.tree.arena,
            at,
            start,
            self.tree.options.offset_strategy,
            &mut self.tree.dirty,
        );
        if is_tag && old_len != new_len {
            self.tree.dirty.push(at);
        }
        Ok((old_len, new_len))
    }

    /// Move one level up. Returns the previous receiver, or `None` when the
    /// chain ended (at the root, after committing the edit to the store, or
    /// at the top of a detached subtree).
    fn ascend(&mut self) -> Result<Option<NodeId>> {
        let node = self.tree.arena.node(self.at)?;
        if let Some(parent) = node.parent {
            let child = self.at;
            self.at = parent;
            return Ok(Some(child));
        }
        if matches!(node.kind, NodeKind::Root(_)) {
            self.commit_to_store()?;
        }
        Ok(None)
    }

    /// Mirror the edit into the store's text. Runs once the whole chain has
    /// been updated, so the origin's offset is final.
    fn commit_to_store(&mut self) -> Result<()> {
        if self.tree.store.is_none() {
            return Ok(());
        }
        let origin = self.edit.origin;
        let reject = |source| Error::StoreRejection {
            node: Some(origin),
            source,
        };

        match self.edit.kind {
            EditKind::Inserted { len } => {
                let offset = self.tree.arena.node(origin)?.offset;
                let text = self.tree.text_of(origin)?;
                log_with(LogLevel::Debug, || {
                    format!("insert {len} chars at {offset} for {origin}")
                });
                if let Some(store) = self.tree.store.as_mut() {
                    store.insert_text(offset, &text).map_err(reject)?;
                }
            }
            EditKind::Removed { offset, len, .. } => {
                log_with(LogLevel::Debug, || {
                    format!("delete {len} chars at {offset} for {origin}")
                });
                if let Some(store) = self.tree.store.as_mut() {
                    store.delete_text(offset, offset + len).map_err(reject)?;
                }
            }
            EditKind::TextChanged {
                old_len,
                prefix,
                suffix,
            } => {
                let offset = self.tree.arena.node(origin)?.offset;
                let text = self.tree.text_of(origin)?;
                let fresh_len = text.chars().count() - prefix - suffix;
                let fresh: String = text.chars().skip(prefix).take(fresh_len).collect();
                let start = offset + prefix;
                let stale_end = offset + old_len - suffix;
                log_with(LogLevel::Debug, || {
                    format!(
                        "replace {start}..{stale_end} with {fresh_len} chars for {origin}"
                    )
                });
                if let Some(store) = self.tree.store.as_mut() {
                    // Insert behind the stale chars before deleting them, so
                    // the buffer never shrinks below its final length mid-edit.
                    if !fresh.is_empty() {
                        store.insert_text(stale_end, &fresh).map_err(reject)?;
                    }
                    if stale_end > start {
                        store.delete_text(start, stale_end).map_err(reject)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<S: TextStore> ContentParent for Notifier<'_, S> {
    fn on_child_inserted(&mut self, child: NodeId) -> Result<()> {
        let EditKind::Inserted { len } = self.edit.kind else {
            return Err(Error::Inconsistent {
                node: self.at,
                detail: "insert notification for a different edit".to_string(),
            });
        };
        let index = self.index_of(child)?;
        // The inserted node itself needs an offset; ancestors only shift the
        // siblings after the child that grew.
        let start = if child == self.edit.origin {
            index
        } else {
            index + 1
        };
        self.absorb(start, 0, len)?;
        match self.ascend()? {
            Some(me) => self.on_child_inserted(me),
            None => Ok(()),
        }
    }

    fn on_child_removed(&mut self, child: NodeId) -> Result<()> {
        let EditKind::Removed { index, len, .. } = self.edit.kind else {
            return Err(Error::Inconsistent {
                node: self.at,
                detail: "remove notification for a different edit".to_string(),
            });
        };
        // The removed node is already unlinked from its direct parent.
        let start = if child == self.edit.origin {
            index
        } else {
            self.index_of(child)? + 1
        };
        self.absorb(start, len, 0)?;
        match self.ascend()? {
            Some(me) => self.on_child_removed(me),
            None => Ok(()),
        }
    }

    fn on_child_text_changed(
        &mut self,
        child: NodeId,
        old_len: usize,
        new_len: usize,
    ) -> Result<()> {
        let index = self.index_of(child)?;
        let (own_old, own_new) = self.absorb(index + 1, old_len, new_len)?;
        match self.ascend()? {
            Some(me) => self.on_child_text_changed(me, own_old, own_new),
            None => Ok(()),
        }
    }
}
