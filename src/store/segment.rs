//! Styled runs: the flattened view of which style objects cover which text.

use crate::store::StyleHandle;
use crate::style::Style;
use std::ops::Range;

/// A maximal stretch of text covered by the same set of style objects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    /// Char range in the buffer.
    pub chars: Range<usize>,
    /// Byte range of the same text.
    pub bytes: Range<usize>,
    /// Covering handles, lowest priority first.
    pub handles: Vec<StyleHandle>,
    /// Merged style, higher priorities winning.
    pub style: Style,
}

impl StyledRun {
    /// Check if this run overlaps with another.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.chars.start < other.chars.end && other.chars.start < self.chars.end
    }

    /// Check if this run contains a char position.
    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        self.chars.contains(&pos)
    }

    /// Get the length in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.end - self.chars.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.start >= self.chars.end
    }

    #[must_use]
    pub fn has(&self, handle: StyleHandle) -> bool {
        self.handles.contains(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(chars: Range<usize>) -> StyledRun {
        StyledRun {
            bytes: chars.clone(),
            chars,
            handles: vec![StyleHandle::from_raw(1)],
            style: Style::NONE,
        }
    }

    #[test]
    fn test_run_overlap() {
        let a = run(0..10);
        let b = run(5..15);
        let c = run(10..20);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn test_run_contains_and_len() {
        let r = run(5..10);
        assert!(!r.contains(4));
        assert!(r.contains(5));
        assert!(!r.contains(10));
        assert_eq!(r.len(), 5);
        assert!(r.has(StyleHandle::from_raw(1)));
        assert!(!r.has(StyleHandle::from_raw(2)));
    }
}
