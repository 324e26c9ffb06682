//! Backing text store boundary.
//!
//! The overlay tree never owns text storage directly. It drives a
//! [`TextStore`], a flat character sequence that can hold named style objects
//! and the character ranges they cover. Offsets are char indices.
//!
//! [`RopeStore`] is the reference implementation, built on `ropey`.
//!
//! ```
//! use text_overlay::store::{RopeStore, TextStore};
//! use text_overlay::{Style, TagStyle};
//!
//! let mut store = RopeStore::new();
//! store.insert_text(0, "hello").unwrap();
//!
//! let bold = store.create_style_handle(&TagStyle::new("bold").with_style(Style::bold()));
//! store.register_style_handle(bold).unwrap();
//! store.apply_style(bold, 0, 5).unwrap();
//!
//! assert_eq!(store.style_ranges(bold), vec![0..5]);
//! ```

mod ranges;
mod rope;
mod rope_store;
mod segment;

pub use ranges::RangeSet;
pub use rope::RopeText;
pub use rope_store::{RopeStore, StoreOptions};
pub use segment::StyledRun;

use crate::style::TagStyle;
use std::fmt;

/// The Unicode OBJECT REPLACEMENT CHARACTER stored for an anchor of width 1.
pub const ANCHOR_PLACEHOLDER: char = '\u{FFFC}';

/// Opaque handle for a style object created by a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleHandle(u32);

impl StyleHandle {
    /// Wrap a store-specific raw id.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StyleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "style#{}", self.0)
    }
}

/// Reasons a store refuses an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// A range endpoint lies past the end of the buffer.
    OutOfRange { start: usize, end: usize, len: usize },
    /// `start > end`.
    InvalidRange { start: usize, end: usize },
    /// The handle was never created by this store, or has been released.
    UnknownHandle(StyleHandle),
    /// The handle exists but is not registered.
    NotRegistered(StyleHandle),
    /// The handle is already registered.
    AlreadyRegistered(StyleHandle),
    /// Another registered style object already uses this id.
    DuplicateName(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { start, end, len } => {
                write!(f, "range {start}..{end} out of bounds for length {len}")
            }
            Self::InvalidRange { start, end } => write!(f, "invalid range {start}..{end}"),
            Self::UnknownHandle(handle) => write!(f, "unknown style handle {handle}"),
            Self::NotRegistered(handle) => write!(f, "style handle {handle} is not registered"),
            Self::AlreadyRegistered(handle) => {
                write!(f, "style handle {handle} is already registered")
            }
            Self::DuplicateName(id) => write!(f, "a style named '{id}' is already registered"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Capabilities the overlay tree needs from a backing text buffer.
///
/// Offsets passed in are char indices. They are valid for the duration of
/// one reconciliation pass; the store must not be mutated by anyone else
/// while a pass runs. Any `Err` is treated by the tree as fatal.
///
/// Style ranges are plain numbers: text edits must not shift them, and a
/// deletion may only clip them to the new length. The tree rewrites every
/// range whose position changed.
pub trait TextStore {
    /// Create a style object for `style`. The handle is not yet registered.
    fn create_style_handle(&mut self, style: &TagStyle) -> StyleHandle;

    /// Make a created handle live so ranges can be applied with it.
    fn register_style_handle(&mut self, handle: StyleHandle) -> Result<(), StoreError>;

    /// Drop a handle and every range it covers.
    fn unregister_style_handle(&mut self, handle: StyleHandle) -> Result<(), StoreError>;

    /// Replace the non-identity fields of a registered style object.
    fn update_style_handle(
        &mut self,
        handle: StyleHandle,
        style: &TagStyle,
    ) -> Result<(), StoreError>;

    /// Style `[start, end)` with `handle`.
    fn apply_style(&mut self, handle: StyleHandle, start: usize, end: usize)
    -> Result<(), StoreError>;

    /// Remove `handle` from `[start, end)`.
    fn remove_style(
        &mut self,
        handle: StyleHandle,
        start: usize,
        end: usize,
    ) -> Result<(), StoreError>;

    /// Insert `text` before char `offset`.
    fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), StoreError>;

    /// Delete chars `[start, end)`.
    fn delete_text(&mut self, start: usize, end: usize) -> Result<(), StoreError>;

    /// Number of chars in the buffer.
    fn total_length(&self) -> usize;

    /// Width in chars of an embedded anchor in this store (0 or 1).
    fn anchor_len(&self) -> usize {
        1
    }
}

pub(crate) fn check_range(start: usize, end: usize, len: usize) -> Result<(), StoreError> {
    if start > end {
        return Err(StoreError::InvalidRange { start, end });
    }
    if end > len {
        return Err(StoreError::OutOfRange { start, end, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(2, 5, 5).is_ok());
        assert_eq!(
            check_range(4, 2, 10),
            Err(StoreError::InvalidRange { start: 4, end: 2 })
        );
        assert_eq!(
            check_range(3, 6, 5),
            Err(StoreError::OutOfRange {
                start: 3,
                end: 6,
                len: 5
            })
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::OutOfRange {
            start: 1,
            end: 9,
            len: 4,
        };
        assert!(err.to_string().contains("1..9"));
        let err = StoreError::UnknownHandle(StyleHandle::from_raw(7));
        assert!(err.to_string().contains("style#7"));
    }
}
