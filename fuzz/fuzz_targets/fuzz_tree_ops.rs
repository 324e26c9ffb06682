//! Fuzz target for overlay tree edits.
//!
//! Replays arbitrary edit sequences against a bound tree. No sequence may
//! poison the tree, and the bookkeeping must verify after every step.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use text_overlay::{NodeId, OffsetStrategy, OverlayTree, RopeStore, TagStyle, TreeOptions};

#[derive(Arbitrary, Debug)]
enum Op {
    Content(String),
    Tag,
    RepeatTag(u8),
    Anchor,
    Append(u8, u8),
    InsertBefore(u8, u8, u8),
    Remove(u8),
    SetText(u8, String),
    Dispose(u8),
}

#[derive(Arbitrary, Debug)]
struct Input {
    recompute: bool,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let strategy = if input.recompute {
        OffsetStrategy::Recompute
    } else {
        OffsetStrategy::Shift
    };
    let options = TreeOptions::default()
        .with_offset_strategy(strategy)
        .with_verify_each_pass(true);
    let mut tree = OverlayTree::with_options(options);
    if tree.attach_store(RopeStore::new()).is_err() {
        return;
    }

    let mut ids: Vec<NodeId> = vec![tree.root()];
    let pick = |ids: &[NodeId], i: u8| ids[usize::from(i) % ids.len()];

    for (n, op) in input.ops.iter().take(64).enumerate() {
        let result = match op {
            Op::Content(text) => {
                ids.push(tree.create_content(text.as_str()));
                Ok(())
            }
            Op::Tag => {
                ids.push(tree.create_tag(TagStyle::new(format!("tag{n}"))));
                Ok(())
            }
            Op::RepeatTag(n) => {
                ids.push(tree.create_tag(TagStyle::new(format!("tag{}", n % 8))));
                Ok(())
            }
            Op::Anchor => {
                ids.push(tree.create_anchor());
                Ok(())
            }
            Op::Append(p, c) => tree.append_child(pick(&ids, *p), pick(&ids, *c)),
            Op::InsertBefore(p, c, b) => {
                tree.insert_before(pick(&ids, *p), pick(&ids, *c), pick(&ids, *b))
            }
            Op::Remove(c) => {
                let child = pick(&ids, *c);
                match tree.parent(child) {
                    Ok(Some(parent)) => tree.remove_child(parent, child),
                    _ => Ok(()),
                }
            }
            Op::SetText(c, text) => tree.set_text(pick(&ids, *c), text.as_str()),
            Op::Dispose(c) => tree.dispose(pick(&ids, *c)),
        };
        if let Err(err) = result {
            assert!(!err.is_fatal(), "{op:?} failed fatally: {err}");
        }
    }

    let store = tree.store().expect("still bound");
    assert_eq!(store.text(), tree.text());
});
