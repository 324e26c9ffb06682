#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Shared test helper; not every integration test uses every utility

pub mod logging;
pub mod recording;

use std::ops::Range;
use text_overlay::{NodeId, OverlayTree, RopeStore, TextStore, TreeOptions};

pub use logging::init_logging;
pub use recording::{RecordingStore, StoreCall};

/// A tree bound to an empty rope store, verifying after every pass.
pub fn bound_tree() -> OverlayTree<RopeStore> {
    let mut tree = OverlayTree::with_options(TreeOptions::default().with_verify_each_pass(true));
    tree.attach_store(RopeStore::new())
        .expect("attach to empty store");
    tree
}

/// A tree bound to an empty recording store.
pub fn recording_tree() -> OverlayTree<RecordingStore> {
    let mut tree = OverlayTree::with_options(TreeOptions::default().with_verify_each_pass(true));
    tree.attach_store(RecordingStore::new())
        .expect("attach to empty store");
    tree
}

/// Ranges the rope store holds for a bound tag.
pub fn store_ranges(tree: &OverlayTree<RopeStore>, tag: NodeId) -> Vec<Range<usize>> {
    let handle = tree
        .style_handle(tag)
        .expect("live node")
        .expect("bound tag");
    tree.store().expect("bound tree").style_ranges(handle)
}

/// Offset of every node in preorder, the root first.
pub fn offsets<S: TextStore>(tree: &OverlayTree<S>) -> Vec<(NodeId, usize)> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        out.push((id, tree.buffer_offset(id).expect("live node")));
        let children = tree.get_children(id).expect("live node");
        stack.extend(children.iter().rev());
    }
    out
}
