//! Rope-backed reference implementation of [`TextStore`].
//!
//! [`RopeStore`] keeps text in a `ropey` rope and every style object's
//! coverage as a [`RangeSet`] of char ranges. Style ranges are numeric
//! overlays: inserting text does not move them, and deleting text only clips
//! them to the new length. Keeping ranges in step with the text is the
//! overlay tree's job.

use crate::store::ranges::RangeSet;
use crate::store::rope::RopeText;
use crate::store::segment::StyledRun;
use crate::store::{StoreError, StyleHandle, TextStore, check_range};
use crate::style::{Style, TagStyle};
use std::ops::Range;

/// Options for a [`RopeStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Width in chars of an embedded anchor (0 or 1).
    pub anchor_len: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { anchor_len: 1 }
    }
}

impl StoreOptions {
    #[must_use]
    pub fn with_anchor_len(mut self, anchor_len: usize) -> Self {
        self.anchor_len = anchor_len;
        self
    }
}

#[derive(Clone, Debug)]
struct StyleEntry {
    style: TagStyle,
    registered: bool,
    ranges: RangeSet,
}

/// Slot registry for style objects. Handle ids are 1-based slot indices;
/// released slots are reused.
#[derive(Clone, Debug, Default)]
struct StyleRegistry {
    entries: Vec<Option<StyleEntry>>,
    free_list: Vec<u32>,
}

impl StyleRegistry {
    fn create(&mut self, style: TagStyle) -> StyleHandle {
        let entry = StyleEntry {
            style,
            registered: false,
            ranges: RangeSet::new(),
        };
        if let Some(id) = self.free_list.pop() {
            self.entries[(id - 1) as usize] = Some(entry);
            return StyleHandle::from_raw(id);
        }

        self.entries.push(Some(entry));
        StyleHandle::from_raw(self.entries.len() as u32)
    }

    fn get(&self, handle: StyleHandle) -> Option<&StyleEntry> {
        let idx = handle.raw().checked_sub(1)? as usize;
        self.entries.get(idx).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, handle: StyleHandle) -> Option<&mut StyleEntry> {
        let idx = handle.raw().checked_sub(1)? as usize;
        self.entries.get_mut(idx).and_then(Option::as_mut)
    }

    fn registered_mut(&mut self, handle: StyleHandle) -> Result<&mut StyleEntry, StoreError> {
        match self.get_mut(handle) {
            Some(entry) if entry.registered => Ok(entry),
            Some(_) => Err(StoreError::NotRegistered(handle)),
            None => Err(StoreError::UnknownHandle(handle)),
        }
    }

    fn release(&mut self, handle: StyleHandle) {
        let Some(idx) = handle.raw().checked_sub(1) else {
            return;
        };
        if let Some(slot) = self.entries.get_mut(idx as usize) {
            if slot.take().is_some() {
                self.free_list.push(handle.raw());
            }
        }
    }

    fn registered(&self) -> impl Iterator<Item = (StyleHandle, &StyleEntry)> {
        self.entries.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .filter(|entry| entry.registered)
                .map(|entry| (StyleHandle::from_raw(idx as u32 + 1), entry))
        })
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = &mut StyleEntry> {
        self.entries.iter_mut().flatten()
    }
}

/// Text buffer with named style objects over char ranges.
///
/// Mirrors a toolkit text buffer with a tag table: style objects are created,
/// registered under a unique id, and applied to or removed from ranges.
#[derive(Clone, Debug, Default)]
pub struct RopeStore {
    rope: RopeText,
    styles: StyleRegistry,
    options: StoreOptions,
    revision: u64,
}

impl RopeStore {
    /// Create an empty store with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    #[must_use]
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            rope: RopeText::new(),
            styles: StyleRegistry::default(),
            options,
            revision: 0,
        }
    }

    #[must_use]
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// The full buffer text.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of a char range, empty when out of bounds.
    #[must_use]
    pub fn text_in(&self, range: Range<usize>) -> String {
        self.rope.slice(range).to_string()
    }

    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// Get the underlying rope.
    #[must_use]
    pub fn rope(&self) -> &RopeText {
        &self.rope
    }

    /// Incremented on every text or style change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Char ranges covered by `handle` (empty for unknown handles).
    #[must_use]
    pub fn style_ranges(&self, handle: StyleHandle) -> Vec<Range<usize>> {
        self.styles
            .get(handle)
            .map(|entry| entry.ranges.to_vec())
            .unwrap_or_default()
    }

    /// Look up a registered style object by id.
    #[must_use]
    pub fn handle_for(&self, id: &str) -> Option<StyleHandle> {
        self.styles
            .registered()
            .find(|(_, entry)| entry.style.id() == id)
            .map(|(handle, _)| handle)
    }

    /// The descriptor stored for `handle`.
    #[must_use]
    pub fn descriptor(&self, handle: StyleHandle) -> Option<&TagStyle> {
        self.styles.get(handle).map(|entry| &entry.style)
    }

    #[must_use]
    pub fn is_registered(&self, handle: StyleHandle) -> bool {
        self.styles.get(handle).is_some_and(|entry| entry.registered)
    }

    /// Handles of all registered style objects, in handle order.
    #[must_use]
    pub fn handles(&self) -> Vec<StyleHandle> {
        self.styles.registered().map(|(handle, _)| handle).collect()
    }

    /// Split the buffer into maximal runs covered by the same style objects.
    ///
    /// Unstyled text produces no run.
    #[must_use]
    pub fn styled_runs(&self) -> Vec<StyledRun> {
        let mut entries: Vec<(StyleHandle, &StyleEntry)> = self.styles.registered().collect();
        entries.sort_by_key(|(handle, entry)| (entry.style.priority(), *handle));

        let mut bounds: Vec<usize> = entries
            .iter()
            .flat_map(|(_, entry)| entry.ranges.iter().flat_map(|r| [r.start, r.end]))
            .collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut runs: Vec<StyledRun> = Vec::new();
        for pair in bounds.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let covering: Vec<&(StyleHandle, &StyleEntry)> = entries
                .iter()
                .filter(|(_, entry)| entry.ranges.contains(start))
                .collect();
            if covering.is_empty() {
                continue;
            }
            let style = covering
                .iter()
                .fold(Style::NONE, |acc, (_, entry)| acc.merge(entry.style.style()));
            runs.push(StyledRun {
                chars: start..end,
                bytes: self.rope.char_range_to_bytes(start..end),
                handles: covering.iter().map(|(handle, _)| *handle).collect(),
                style,
            });
        }
        runs
    }

    /// Merged style at a char position, higher priorities winning.
    #[must_use]
    pub fn style_at(&self, pos: usize) -> Style {
        let mut covering: Vec<&StyleEntry> = self
            .styles
            .registered()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.ranges.contains(pos))
            .collect();
        covering.sort_by_key(|entry| entry.style.priority());
        covering
            .into_iter()
            .fold(Style::NONE, |acc, entry| acc.merge(entry.style.style()))
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl TextStore for RopeStore {
    fn create_style_handle(&mut self, style: &TagStyle) -> StyleHandle {
        self.styles.create(style.clone())
    }

    fn register_style_handle(&mut self, handle: StyleHandle) -> Result<(), StoreError> {
        let Some(entry) = self.styles.get(handle) else {
            return Err(StoreError::UnknownHandle(handle));
        };
        if entry.registered {
            return Err(StoreError::AlreadyRegistered(handle));
        }
        let id = entry.style.id();
        if self.handle_for(id).is_some() {
            return Err(StoreError::DuplicateName(id.to_string()));
        }
        if let Some(entry) = self.styles.get_mut(handle) {
            entry.registered = true;
        }
        self.bump_revision();
        Ok(())
    }

    fn unregister_style_handle(&mut self, handle: StyleHandle) -> Result<(), StoreError> {
        self.styles.registered_mut(handle)?;
        self.styles.release(handle);
        self.bump_revision();
        Ok(())
    }

    fn update_style_handle(
        &mut self,
        handle: StyleHandle,
        style: &TagStyle,
    ) -> Result<(), StoreError> {
        let entry = self.styles.registered_mut(handle)?;
        entry.style = TagStyle::new(entry.style.id())
            .with_priority(style.priority())
            .with_style(style.style());
        self.bump_revision();
        Ok(())
    }

    fn apply_style(
        &mut self,
        handle: StyleHandle,
        start: usize,
        end: usize,
    ) -> Result<(), StoreError> {
        check_range(start, end, self.rope.len_chars())?;
        self.styles.registered_mut(handle)?.ranges.insert(start..end);
        self.bump_revision();
        Ok(())
    }

    fn remove_style(
        &mut self,
        handle: StyleHandle,
        start: usize,
        end: usize,
    ) -> Result<(), StoreError> {
        check_range(start, end, self.rope.len_chars())?;
        self.styles.registered_mut(handle)?.ranges.remove(start..end);
        self.bump_revision();
        Ok(())
    }

    fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), StoreError> {
        check_range(offset, offset, self.rope.len_chars())?;
        self.rope.insert(offset, text);
        self.bump_revision();
        Ok(())
    }

    fn delete_text(&mut self, start: usize, end: usize) -> Result<(), StoreError> {
        check_range(start, end, self.rope.len_chars())?;
        self.rope.remove(start..end);
        let len = self.rope.len_chars();
        for entry in self.styles.entries_mut() {
            entry.ranges.truncate(len);
        }
        self.bump_revision();
        Ok(())
    }

    fn total_length(&self) -> usize {
        self.rope.len_chars()
    }

    fn anchor_len(&self) -> usize {
        self.options.anchor_len
    }
}
