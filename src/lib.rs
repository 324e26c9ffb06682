//! `text_overlay` - rich-text overlay trees over a flat text buffer
//!
//! A declarative description of styled text (tags wrapping literal runs and
//! embedded anchors) is kept as a tree. Every node knows its absolute char
//! offset in one backing [`TextStore`](store::TextStore); edits to the tree
//! update those offsets incrementally and push the minimal set of style range
//! changes into the store.
//!
//! # Example
//!
//! ```
//! use text_overlay::store::RopeStore;
//! use text_overlay::{OverlayTree, Style, TagStyle};
//!
//! let mut tree = OverlayTree::new();
//! tree.attach_store(RopeStore::new()).unwrap();
//! let root = tree.root();
//!
//! let em = tree.create_tag(TagStyle::new("em").with_style(Style::italic()));
//! let ab = tree.create_content("ab");
//! let cd = tree.create_content("cd");
//! tree.append_child(em, ab).unwrap();
//! tree.append_child(root, em).unwrap();
//! tree.append_child(root, cd).unwrap();
//!
//! let lead = tree.create_content("xyz");
//! tree.insert_before(root, lead, em).unwrap();
//!
//! assert_eq!(tree.text(), "xyzabcd");
//! assert_eq!(tree.buffer_offset(em).unwrap(), 3);
//! assert_eq!(tree.applied_range(em).unwrap(), Some(3..5));
//! ```

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Arena slot indices are u32
#![allow(clippy::module_name_repetitions)] // Allow store::StoreError etc
#![allow(clippy::missing_errors_doc)] // Error variants document themselves
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine

pub mod color;
pub mod error;
pub mod event;
pub mod store;
pub mod style;
pub mod tree;

// Re-export core types at crate root
pub use color::Rgba;
pub use error::{Error, Result};
pub use event::{
    LogLevel, RECONCILE_EVENT, clear_event_callback, clear_log_callback, emit_event, emit_log,
    set_event_callback, set_log_callback,
};
pub use style::{Style, StyleBuilder, TagStyle, TextAttributes};

// Re-export tree types
pub use tree::{
    AnchorNode, ContentNode, ContentParent, NodeId, NodeProps, NodeType, OffsetStrategy,
    OverlayTree, TagNode, TreeOptions,
};

// Re-export store types
pub use store::{RopeStore, StoreError, StoreOptions, StyleHandle, TextStore};
