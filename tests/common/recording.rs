//! A [`TextStore`] wrapper that records every call and can be told to reject
//! one, for asserting exactly what a pass sends to the store.

use std::fmt;
use std::ops::Range;
use text_overlay::{RopeStore, StoreError, StyleHandle, TagStyle, TextStore};

/// One call made against the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Create(String),
    Register(StyleHandle),
    Unregister(StyleHandle),
    Update(StyleHandle),
    Apply(StyleHandle, Range<usize>),
    Remove(StyleHandle, Range<usize>),
    Insert(usize, String),
    Delete(Range<usize>),
}

impl StoreCall {
    /// The style handle this call touches, if any.
    pub fn handle(&self) -> Option<StyleHandle> {
        match self {
            Self::Register(h) | Self::Unregister(h) | Self::Update(h) => Some(*h),
            Self::Apply(h, _) | Self::Remove(h, _) => Some(*h),
            Self::Create(_) | Self::Insert(..) | Self::Delete(_) => None,
        }
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub inner: RopeStore,
    pub calls: Vec<StoreCall>,
    reject: Option<fn(&StoreCall) -> bool>,
}

impl fmt::Debug for RecordingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingStore")
            .field("inner", &self.inner)
            .field("calls", &self.calls.len())
            .field("rejecting", &self.reject.is_some())
            .finish()
    }
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every call matching `predicate` with an out-of-range error.
    pub fn reject_when(&mut self, predicate: fn(&StoreCall) -> bool) {
        self.reject = Some(predicate);
    }

    /// Calls recorded after the first `mark` ones.
    pub fn calls_since(&self, mark: usize) -> &[StoreCall] {
        &self.calls[mark.min(self.calls.len())..]
    }

    fn record(&mut self, call: StoreCall) -> Result<(), StoreError> {
        let rejected = self.reject.is_some_and(|predicate| predicate(&call));
        self.calls.push(call);
        if rejected {
            return Err(StoreError::OutOfRange {
                start: 0,
                end: usize::MAX,
                len: self.inner.len_chars(),
            });
        }
        Ok(())
    }
}

impl TextStore for RecordingStore {
    fn create_style_handle(&mut self, style: &TagStyle) -> StyleHandle {
        self.calls.push(StoreCall::Create(style.id().to_string()));
        self.inner.create_style_handle(style)
    }

    fn register_style_handle(&mut self, handle: StyleHandle) -> Result<(), StoreError> {
        self.record(StoreCall::Register(handle))?;
        self.inner.register_style_handle(handle)
    }

    fn unregister_style_handle(&mut self, handle: StyleHandle) -> Result<(), StoreError> {
        self.record(StoreCall::Unregister(handle))?;
        self.inner.unregister_style_handle(handle)
    }

    fn update_style_handle(
        &mut self,
        handle: StyleHandle,
        style: &TagStyle,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::Update(handle))?;
        self.inner.update_style_handle(handle, style)
    }

    fn apply_style(
        &mut self,
        handle: StyleHandle,
        start: usize,
        end: usize,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::Apply(handle, start..end))?;
        self.inner.apply_style(handle, start, end)
    }

    fn remove_style(
        &mut self,
        handle: StyleHandle,
        start: usize,
        end: usize,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::Remove(handle, start..end))?;
        self.inner.remove_style(handle, start, end)
    }

    fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Insert(offset, text.to_string()))?;
        self.inner.insert_text(offset, text)
    }

    fn delete_text(&mut self, start: usize, end: usize) -> Result<(), StoreError> {
        self.record(StoreCall::Delete(start..end))?;
        self.inner.delete_text(start, end)
    }

    fn total_length(&self) -> usize {
        self.inner.total_length()
    }

    fn anchor_len(&self) -> usize {
        self.inner.anchor_len()
    }
}
