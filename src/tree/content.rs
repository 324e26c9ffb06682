//! Leaf nodes: literal text runs and embedded anchors.

use crate::store::ANCHOR_PLACEHOLDER;

/// Leaf holding a literal run of text. Length is counted in chars.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentNode {
    text: String,
    len: usize,
}

impl ContentNode {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self { text, len }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replace the text, returning `(old_len, new_len)`.
    pub(crate) fn replace(&mut self, text: impl Into<String>) -> (usize, usize) {
        let old_len = self.len;
        *self = Self::new(text);
        (old_len, self.len)
    }
}

/// Chars `old` and `new` share at the front and at the back, as
/// `(prefix, suffix)`. The two never overlap in either string.
pub(crate) fn shared_affixes(old: &str, new: &str) -> (usize, usize) {
    let prefix = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let room = old.chars().count().min(new.chars().count()) - prefix;
    let suffix = old
        .chars()
        .rev()
        .zip(new.chars().rev())
        .take(room)
        .take_while(|(a, b)| a == b)
        .count();
    (prefix, suffix)
}

/// Leaf standing for an embedded non-text object at one position.
///
/// Its width is fixed when it is created and never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorNode {
    len: usize,
}

impl AnchorNode {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Placeholder text written to the store for this anchor.
    #[must_use]
    pub fn text(&self) -> String {
        std::iter::repeat_n(ANCHOR_PLACEHOLDER, self.len).collect()
    }
}
