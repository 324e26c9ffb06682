//! The materialization pass: bring the store's style ranges in line with the
//! offsets computed by the offset pass.
//!
//! Each bound tag remembers the range it last wrote. Reapplying diffs that
//! against the range it should cover now and only touches the difference,
//! so a tag that merely grew at its end costs one `apply_style` call.

use crate::error::{Error, Result};
use crate::event::{LogLevel, RECONCILE_EVENT, emit_event, log_with};
use crate::store::{StoreError, TextStore};
use crate::tree::node::{Node, NodeArena, NodeId};
use crate::tree::tag::Binding;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Tag ids currently registered with the store, and the tag holding each.
pub(crate) type BoundIds = HashMap<String, NodeId>;

/// Counters for one pass, reported in the reconcile event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PassStats {
    pub(crate) visited: usize,
    pub(crate) applied: usize,
    pub(crate) removed: usize,
}

impl PassStats {
    pub(crate) fn emit(self, total_length: usize) {
        emit_event(
            RECONCILE_EVENT,
            &format!(
                "visited={} applied={} removed={} length={total_length}",
                self.visited, self.applied, self.removed
            ),
        );
    }
}

fn rejection(node: NodeId) -> impl Fn(StoreError) -> Error {
    move |source| Error::StoreRejection {
        node: Some(node),
        source,
    }
}

/// The parts of `from` not covered by `minus`.
fn subtract(from: &Range<usize>, minus: Option<&Range<usize>>) -> Vec<Range<usize>> {
    let Some(minus) = minus else {
        return vec![from.clone()];
    };
    if minus.end <= from.start || minus.start >= from.end {
        return vec![from.clone()];
    }
    let mut out = Vec::with_capacity(2);
    if from.start < minus.start {
        out.push(from.start..minus.start);
    }
    if minus.end < from.end {
        out.push(minus.end..from.end);
    }
    out
}

/// `(stale, fresh)`: ranges to remove and ranges to apply when moving an
/// application from `previous` to `target`.
pub(crate) fn range_diff(
    previous: Option<&Range<usize>>,
    target: Option<&Range<usize>>,
) -> (Vec<Range<usize>>, Vec<Range<usize>>) {
    let stale = previous.map_or_else(Vec::new, |prev| subtract(prev, target));
    let fresh = target.map_or_else(Vec::new, |next| subtract(next, previous));
    (stale, fresh)
}

fn clip(range: Range<usize>, len: usize) -> Range<usize> {
    range.start.min(len)..range.end.min(len)
}

/// Reapply one tag. Stale or unbound ids are skipped.
pub(crate) fn reapply<S: TextStore>(
    arena: &mut NodeArena,
    store: &mut S,
    id: NodeId,
    stats: &mut PassStats,
) -> Result<()> {
    let Some(node) = arena.get_mut(id) else {
        return Ok(());
    };
    let offset = node.offset;
    let Some(tag) = node.as_tag_mut() else {
        return Ok(());
    };
    let target = tag.target_range(offset);
    let Some(binding) = tag.binding.as_mut() else {
        return Ok(());
    };
    stats.visited += 1;
    if binding.applied == target {
        return Ok(());
    }

    let (stale, fresh) = range_diff(binding.applied.as_ref(), target.as_ref());
    // Text deletions already clipped the store's copy of the old range.
    let total = store.total_length();
    for range in stale {
        let range = clip(range, total);
        if range.is_empty() {
            continue;
        }
        store
            .remove_style(binding.handle, range.start, range.end)
            .map_err(rejection(id))?;
        stats.removed += 1;
    }
    for range in fresh {
        store
            .apply_style(binding.handle, range.start, range.end)
            .map_err(rejection(id))?;
        stats.applied += 1;
    }
    binding.applied = target;
    Ok(())
}

/// Reapply every tag in `dirty`, draining it.
pub(crate) fn materialize<S: TextStore>(
    arena: &mut NodeArena,
    store: &mut S,
    dirty: &mut Vec<NodeId>,
) -> Result<PassStats> {
    dirty.sort_unstable();
    dirty.dedup();
    let mut stats = PassStats::default();
    for id in dirty.drain(..) {
        reapply(arena, store, id, &mut stats)?;
    }
    Ok(stats)
}

/// Fail with [`Error::DuplicateTagId`] if binding `id`'s subtree would
/// register a tag id twice. Tags bound inside the subtree itself are about
/// to be rebound and do not clash with themselves.
pub(crate) fn check_unique_ids(arena: &NodeArena, bound: &BoundIds, id: NodeId) -> Result<()> {
    let mut seen = HashSet::new();
    for next in arena.subtree(id) {
        let Some(tag) = arena.get(next).and_then(Node::as_tag) else {
            continue;
        };
        let name = tag.descriptor().id();
        let clash = bound
            .get(name)
            .is_some_and(|&owner| !arena.is_ancestor_or_self(id, owner));
        if clash || !seen.insert(name) {
            return Err(Error::DuplicateTagId {
                node: next,
                id: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Create and register a handle for every unbound tag in `id`'s subtree,
/// queueing each for its first application.
///
/// Callers run [`check_unique_ids`] first; a duplicate reaching the store
/// here is a rejection like any other.
pub(crate) fn bind_subtree<S: TextStore>(
    arena: &mut NodeArena,
    store: &mut S,
    bound: &mut BoundIds,
    id: NodeId,
    dirty: &mut Vec<NodeId>,
) -> Result<()> {
    for next in arena.subtree(id) {
        let Some(tag) = arena.get_mut(next).and_then(|node| node.as_tag_mut()) else {
            continue;
        };
        if tag.binding.is_some() {
            continue;
        }
        let handle = store.create_style_handle(tag.descriptor());
        store
            .register_style_handle(handle)
            .map_err(rejection(next))?;
        tag.binding = Some(Binding {
            handle,
            applied: None,
        });
        bound.insert(tag.descriptor().id().to_string(), next);
        log_with(LogLevel::Debug, || {
            format!("bound {next} '{}' to {handle}", tag.descriptor().id())
        });
        dirty.push(next);
    }
    Ok(())
}

/// Strip the store effects of every bound tag in `id`'s subtree and release
/// their handles.
pub(crate) fn unbind_subtree<S: TextStore>(
    arena: &mut NodeArena,
    store: &mut S,
    bound: &mut BoundIds,
    id: NodeId,
) -> Result<()> {
    for next in arena.subtree(id) {
        let Some(tag) = arena.get_mut(next).and_then(|node| node.as_tag_mut()) else {
            continue;
        };
        let Some(binding) = tag.binding.take() else {
            continue;
        };
        bound.remove(tag.descriptor().id());
        if let Some(applied) = binding.applied {
            let range = clip(applied, store.total_length());
            if !range.is_empty() {
                store
                    .remove_style(binding.handle, range.start, range.end)
                    .map_err(rejection(next))?;
            }
        }
        store
            .unregister_style_handle(binding.handle)
            .map_err(rejection(next))?;
        log_with(LogLevel::Debug, || {
            format!("unbound {next} from {}", binding.handle)
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_growth_at_end() {
        let (stale, fresh) = range_diff(Some(&(2..5)), Some(&(2..8)));
        assert!(stale.is_empty());
        assert_eq!(fresh, vec![5..8]);
    }

    #[test]
    fn test_diff_shift_right() {
        let (stale, fresh) = range_diff(Some(&(2..5)), Some(&(4..7)));
        assert_eq!(stale, vec![2..4]);
        assert_eq!(fresh, vec![5..7]);
    }

    #[test]
    fn test_diff_disjoint_and_empty() {
        let (stale, fresh) = range_diff(Some(&(0..2)), Some(&(5..6)));
        assert_eq!(stale, vec![0..2]);
        assert_eq!(fresh, vec![5..6]);

        let (stale, fresh) = range_diff(Some(&(1..3)), None);
        assert_eq!(stale, vec![1..3]);
        assert!(fresh.is_empty());

        let (stale, fresh) = range_diff(None, Some(&(1..3)));
        assert!(stale.is_empty());
        assert_eq!(fresh, vec![1..3]);
    }

    #[test]
    fn test_diff_shrink_inside() {
        let (stale, fresh) = range_diff(Some(&(0..10)), Some(&(3..6)));
        assert_eq!(stale, vec![0..3, 6..10]);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_clip_to_length() {
        assert_eq!(clip(2..9, 5), 2..5);
        assert!(clip(7..9, 5).is_empty());
    }
}
