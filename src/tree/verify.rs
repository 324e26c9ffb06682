//! Full consistency check of a tree against its cached bookkeeping.

use crate::error::{Error, Result};
use crate::store::TextStore;
use crate::tree::OverlayTree;
use crate::tree::node::{Node, NodeArena, NodeId, NodeKind};

fn inconsistent(node: NodeId, detail: String) -> Error {
    Error::Inconsistent { node, detail }
}

/// Walk `id`'s subtree checking parent links, offsets, cached lengths and
/// bindings. `bound` says whether tags here must hold a handle.
fn check_subtree(arena: &NodeArena, id: NodeId, bound: bool) -> Result<()> {
    let node = arena.node(id)?;
    if let NodeKind::Tag(tag) = &node.kind {
        match (&tag.binding, bound) {
            (Some(binding), true) => {
                let target = tag.target_range(node.offset);
                if binding.applied != target {
                    return Err(inconsistent(
                        id,
                        format!("applied {:?}, expected {target:?}", binding.applied),
                    ));
                }
            }
            (None, false) => {}
            (Some(_), false) => {
                return Err(inconsistent(id, "bound tag outside a bound tree".into()));
            }
            (None, true) => return Err(inconsistent(id, "unbound tag in a bound tree".into())),
        }
    }

    let Some(children) = node.children() else {
        return Ok(());
    };
    let mut running = node.offset;
    for &child in &children.ids {
        let child_node = arena.node(child)?;
        if child_node.parent != Some(id) {
            return Err(inconsistent(
                child,
                format!("parent link {:?}, expected {id}", child_node.parent),
            ));
        }
        if child_node.offset != running {
            return Err(inconsistent(
                child,
                format!("offset {}, expected {running}", child_node.offset),
            ));
        }
        check_subtree(arena, child, bound)?;
        running += child_node.len();
    }
    let sum = running - node.offset;
    if sum != children.length {
        return Err(inconsistent(
            id,
            format!("cached length {}, children sum to {sum}", children.length),
        ));
    }
    Ok(())
}

pub(crate) fn verify_tree<S: TextStore>(tree: &OverlayTree<S>) -> Result<()> {
    let root = tree.root();
    let root_node = tree.arena.node(root)?;
    if root_node.offset != 0 {
        return Err(inconsistent(root, format!("root offset {}", root_node.offset)));
    }
    check_subtree(&tree.arena, root, tree.is_bound())?;

    // Detached subtrees are based at 0 and never bound.
    for id in tree.arena.ids() {
        let Some(node) = tree.arena.get(id) else {
            continue;
        };
        if id != root && node.parent.is_none() {
            if node.offset != 0 {
                return Err(inconsistent(
                    id,
                    format!("detached node at offset {}", node.offset),
                ));
            }
            check_subtree(&tree.arena, id, false)?;
        }
    }

    // The bound-id index names exactly the bound tags.
    let mut bound_tags = 0;
    for id in tree.arena.subtree(root) {
        let Some(tag) = tree.arena.get(id).and_then(Node::as_tag) else {
            continue;
        };
        if !tag.is_bound() {
            continue;
        }
        bound_tags += 1;
        let name = tag.descriptor().id();
        if tree.bound_ids.get(name) != Some(&id) {
            return Err(inconsistent(id, format!("tag id '{name}' missing from index")));
        }
    }
    if bound_tags != tree.bound_ids.len() {
        return Err(inconsistent(
            root,
            format!(
                "{} indexed tag ids, {bound_tags} bound tags",
                tree.bound_ids.len()
            ),
        ));
    }

    if let Some(store) = tree.store() {
        let len = tree.len();
        if store.total_length() != len {
            return Err(inconsistent(
                root,
                format!("store holds {} chars, tree {len}", store.total_length()),
            ));
        }
    }
    Ok(())
}
