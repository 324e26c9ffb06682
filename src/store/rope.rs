//! Char-indexed text storage using the ropey crate.

use ropey::{Rope, RopeSlice};
use std::ops::Range;

/// Rope wrapper addressing text by char index.
#[derive(Clone, Debug, Default)]
pub struct RopeText {
    rope: Rope,
}

impl RopeText {
    /// Create an empty rope.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a rope from a string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    /// Get the number of bytes.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Get the number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Slice by char range, empty when out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> RopeSlice<'_> {
        self.rope
            .get_slice(range)
            .unwrap_or_else(|| self.rope.slice(..0))
    }

    /// Insert text at a char position. Callers validate `char_idx`.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if char_idx <= self.len_chars() && !text.is_empty() {
            self.rope.insert(char_idx, text);
        }
    }

    /// Remove a char range. Callers validate the range.
    pub fn remove(&mut self, range: Range<usize>) {
        if range.start < range.end && range.end <= self.len_chars() {
            self.rope.remove(range);
        }
    }

    /// Convert char index to byte index, clamped to the end.
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        self.rope.char_to_byte(char_idx.min(self.len_chars()))
    }

    /// Convert a char range to the byte range it spans.
    #[must_use]
    pub fn char_range_to_bytes(&self, range: Range<usize>) -> Range<usize> {
        self.char_to_byte(range.start)..self.char_to_byte(range.end)
    }

    /// Convert to string.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Get access to the underlying rope.
    #[must_use]
    pub fn inner(&self) -> &Rope {
        &self.rope
    }
}

impl From<&str> for RopeText {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove_by_char() {
        let mut rope = RopeText::from_str("héllo");
        assert_eq!(rope.len_chars(), 5);
        assert_eq!(rope.len_bytes(), 6);

        rope.insert(1, "ÿ");
        assert_eq!(rope.to_string(), "hÿéllo");

        rope.remove(1..3);
        assert_eq!(rope.to_string(), "hllo");
    }

    #[test]
    fn test_out_of_bounds_edits_are_ignored() {
        let mut rope = RopeText::from_str("abc");
        rope.insert(10, "x");
        rope.remove(2..9);
        assert_eq!(rope.to_string(), "abc");
    }

    #[test]
    fn test_char_range_to_bytes() {
        let rope = RopeText::from_str("aé😀b");
        assert_eq!(rope.char_range_to_bytes(1..3), 1..7);
        assert_eq!(rope.slice(2..4).to_string(), "😀b");
        assert_eq!(rope.slice(3..9).to_string(), "");
    }
}
