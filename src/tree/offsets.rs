//! The pure offset pass.
//!
//! Nothing here touches a store. Both strategies leave every node in the
//! affected range at `parent.offset + sum(len of earlier siblings)`; they
//! only differ in how much of each child's subtree they visit.

use crate::tree::node::{NodeArena, NodeId};

/// How [`update_child_offsets`] re-derives the offsets inside a moved child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OffsetStrategy {
    /// Add the child's offset delta to every node of its subtree, skipping
    /// subtrees that did not move.
    #[default]
    Shift,
    /// Recompute every descendant offset from prefix sums.
    Recompute,
}

/// Re-derive the offsets of `parent`'s children from `start` onward.
///
/// Tags whose offset changes are pushed onto `dirty` so the materialization
/// pass can reapply them.
pub(crate) fn update_child_offsets(
    arena: &mut NodeArena,
    parent: NodeId,
    start: usize,
    strategy: OffsetStrategy,
    dirty: &mut Vec<NodeId>,
) {
    let Some(base) = arena.get(parent).map(|node| node.offset) else {
        return;
    };
    let count = arena.children_of(parent).len();
    let mut running = base
        + arena.children_of(parent)[..start.min(count)]
            .iter()
            .map(|&child| arena.len_of(child))
            .sum::<usize>();

    for index in start..count {
        let child = arena.children_of(parent)[index];
        match strategy {
            OffsetStrategy::Shift => {
                let old = arena.get(child).map_or(running, |node| node.offset);
                if old != running {
                    shift_subtree(arena, child, running.wrapping_sub(old), dirty);
                }
            }
            OffsetStrategy::Recompute => {
                set_offset(arena, child, running, dirty);
                if arena.get(child).is_some_and(|node| node.children().is_some()) {
                    update_child_offsets(arena, child, 0, strategy, dirty);
                }
            }
        }
        running += arena.len_of(child);
    }
}

/// Add `delta` (two's-complement, so shifts left wrap back) to the offset of
/// `id` and every descendant.
pub(crate) fn shift_subtree(
    arena: &mut NodeArena,
    id: NodeId,
    delta: usize,
    dirty: &mut Vec<NodeId>,
) {
    if delta == 0 {
        return;
    }
    let mut stack = vec![id];
    while let Some(next) = stack.pop() {
        let Some(node) = arena.get_mut(next) else {
            continue;
        };
        node.offset = node.offset.wrapping_add(delta);
        if node.as_tag().is_some() {
            dirty.push(next);
        }
        stack.extend(arena.children_of(next));
    }
}

fn set_offset(arena: &mut NodeArena, id: NodeId, offset: usize, dirty: &mut Vec<NodeId>) {
    if let Some(node) = arena.get_mut(id) {
        if node.offset != offset {
            node.offset = offset;
            if node.as_tag().is_some() {
                dirty.push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TagStyle;
    use crate::tree::content::ContentNode;
    use crate::tree::node::{Node, NodeKind};
    use crate::tree::tag::{Children, TagNode};

    fn attach(arena: &mut NodeArena, parent: NodeId, child: NodeId) {
        let len = arena.len_of(child);
        arena.get_mut(child).unwrap().parent = Some(parent);
        let children = arena.get_mut(parent).unwrap().children_mut().unwrap();
        children.ids.push(child);
        children.length += len;
    }

    /// root: [ "abc", tag[ "de", tag[ "f" ] ], "gh" ] with every offset 0.
    fn fixture() -> (NodeArena, NodeId, Vec<NodeId>) {
        let mut arena = NodeArena::default();
        let root = arena.insert(Node::new(NodeKind::Root(Children::default())));
        let abc = arena.insert(Node::new(NodeKind::Content(ContentNode::new("abc"))));
        let outer = arena.insert(Node::new(NodeKind::Tag(TagNode::new(TagStyle::new("o")))));
        let de = arena.insert(Node::new(NodeKind::Content(ContentNode::new("de"))));
        let inner = arena.insert(Node::new(NodeKind::Tag(TagNode::new(TagStyle::new("i")))));
        let f = arena.insert(Node::new(NodeKind::Content(ContentNode::new("f"))));
        let gh = arena.insert(Node::new(NodeKind::Content(ContentNode::new("gh"))));

        attach(&mut arena, inner, f);
        attach(&mut arena, outer, de);
        attach(&mut arena, outer, inner);
        attach(&mut arena, root, abc);
        attach(&mut arena, root, outer);
        attach(&mut arena, root, gh);
        (arena, root, vec![abc, outer, de, inner, f, gh])
    }

    fn offsets(arena: &NodeArena, ids: &[NodeId]) -> Vec<usize> {
        ids.iter().map(|&id| arena.get(id).unwrap().offset).collect()
    }

    #[test]
    fn test_recompute_from_scratch() {
        let (mut arena, root, ids) = fixture();
        let mut dirty = Vec::new();
        update_child_offsets(&mut arena, root, 0, OffsetStrategy::Recompute, &mut dirty);

        assert_eq!(offsets(&arena, &ids), vec![0, 3, 3, 5, 5, 6]);
        dirty.sort();
        assert_eq!(dirty, vec![ids[1], ids[3]]);
    }

    #[test]
    fn test_shift_moves_whole_subtree() {
        let (mut arena, root, ids) = fixture();
        let mut dirty = Vec::new();
        update_child_offsets(&mut arena, root, 0, OffsetStrategy::Recompute, &mut dirty);

        // Pretend "abc" grew by two chars.
        arena.get_mut(root).unwrap().children_mut().unwrap().length += 2;
        if let NodeKind::Content(content) = &mut arena.get_mut(ids[0]).unwrap().kind {
            content.replace("abcxy");
        }

        let mut shifted = arena.clone();
        let mut recomputed = arena.clone();
        dirty.clear();
        update_child_offsets(&mut shifted, root, 1, OffsetStrategy::Shift, &mut dirty);
        assert_eq!(offsets(&shifted, &ids), vec![0, 5, 5, 7, 7, 8]);

        update_child_offsets(&mut recomputed, root, 1, OffsetStrategy::Recompute, &mut Vec::new());
        assert_eq!(offsets(&recomputed, &ids), offsets(&shifted, &ids));
    }

    #[test]
    fn test_shift_left_wraps_back() {
        let (mut arena, root, ids) = fixture();
        update_child_offsets(&mut arena, root, 0, OffsetStrategy::Recompute, &mut Vec::new());
        assert_eq!(offsets(&arena, &ids), vec![0, 3, 3, 5, 5, 6]);

        shift_subtree(&mut arena, ids[1], 0usize.wrapping_sub(3), &mut Vec::new());
        assert_eq!(arena.get(ids[1]).unwrap().offset, 0);
        assert_eq!(arena.get(ids[4]).unwrap().offset, 2);
    }
}
