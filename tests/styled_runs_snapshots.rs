//! Snapshot tests of the flattened styled runs a store ends up holding.

mod common;

use common::bound_tree;
use text_overlay::{Rgba, RopeStore, Style, TagStyle};

/// One line per run: char range, text, covering style ids, merged style.
fn render(store: &RopeStore) -> String {
    store
        .styled_runs()
        .iter()
        .map(|run| {
            let ids: Vec<&str> = run
                .handles
                .iter()
                .filter_map(|&handle| store.descriptor(handle).map(TagStyle::id))
                .collect();
            let attrs: Vec<&str> = run.style.attributes.iter_names().map(|(name, _)| name).collect();
            let mut line = format!(
                "{}..{} {:?} [{}] {}",
                run.chars.start,
                run.chars.end,
                store.text_in(run.chars.clone()),
                ids.join(","),
                attrs.join("|"),
            );
            if let Some(fg) = run.style.fg {
                line.push_str(&format!(" fg={fg}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn snapshot_nested_tags() {
    let mut tree = bound_tree();
    let root = tree.root();

    let bold = tree.create_tag(TagStyle::new("bold").with_style(Style::bold()));
    let italic = tree.create_tag(
        TagStyle::new("italic")
            .with_style(Style::italic().with_fg(Rgba::from_hex("#3366cc").unwrap()))
            .with_priority(1),
    );
    let hi = tree.create_content("Hi ");
    let big = tree.create_content("big ");
    let deep = tree.create_content("deep");
    let bang = tree.create_content("!");
    let end = tree.create_content(" end");

    tree.append_child(italic, deep).unwrap();
    for child in [big, italic, bang] {
        tree.append_child(bold, child).unwrap();
    }
    for child in [hi, bold, end] {
        tree.append_child(root, child).unwrap();
    }

    assert_eq!(tree.text(), "Hi big deep! end");
    insta::assert_snapshot!(render(tree.store().unwrap()), @r#"
    3..7 "big " [bold] BOLD
    7..11 "deep" [bold,italic] BOLD|ITALIC fg=#3366cc
    11..12 "!" [bold] BOLD
    "#);

    tree.set_text(deep, "d").unwrap();
    insta::assert_snapshot!(render(tree.store().unwrap()), @r#"
    3..7 "big " [bold] BOLD
    7..8 "d" [bold,italic] BOLD|ITALIC fg=#3366cc
    8..9 "!" [bold] BOLD
    "#);

    tree.remove_child(bold, big).unwrap();
    insta::assert_snapshot!(render(tree.store().unwrap()), @r#"
    3..4 "d" [bold,italic] BOLD|ITALIC fg=#3366cc
    4..5 "!" [bold] BOLD
    "#);
}

#[test]
fn styled_runs_report_byte_ranges() {
    let mut tree = bound_tree();
    let root = tree.root();
    let lead = tree.create_content("aé");
    let tag = tree.create_tag(TagStyle::new("emoji").with_style(Style::underline()));
    let emoji = tree.create_content("😀b");
    tree.append_child(tag, emoji).unwrap();
    tree.append_child(root, lead).unwrap();
    tree.append_child(root, tag).unwrap();

    let runs = tree.store().unwrap().styled_runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].chars, 2..4);
    assert_eq!(runs[0].bytes, 3..8);
    assert_eq!(runs[0].style, Style::underline());
}
