//! Normalized sets of half-open char ranges.

use std::ops::Range;

/// Sorted, disjoint, non-adjacent ranges.
///
/// Inserting unions with what is already present; removing subtracts.
/// Empty ranges are never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<Range<usize>>,
}

impl RangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `range` into the set.
    pub fn insert(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let mut start = range.start;
        let mut end = range.end;

        // First range that touches or follows `range`.
        let first = self.ranges.partition_point(|r| r.end < start);
        let mut last = first;
        while last < self.ranges.len() && self.ranges[last].start <= end {
            start = start.min(self.ranges[last].start);
            end = end.max(self.ranges[last].end);
            last += 1;
        }
        self.ranges.splice(first..last, std::iter::once(start..end));
    }

    /// Subtract `range` from the set.
    pub fn remove(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let first = self.ranges.partition_point(|r| r.end <= range.start);
        let mut last = first;
        let mut kept = Vec::with_capacity(2);
        while last < self.ranges.len() && self.ranges[last].start < range.end {
            let existing = &self.ranges[last];
            if existing.start < range.start {
                kept.push(existing.start..range.start);
            }
            if existing.end > range.end {
                kept.push(range.end..existing.end);
            }
            last += 1;
        }
        self.ranges.splice(first..last, kept);
    }

    /// Drop everything at or past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.ranges.retain(|r| r.start < len);
        if let Some(last) = self.ranges.last_mut() {
            last.end = last.end.min(len);
        }
    }

    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= pos);
        self.ranges.get(idx).is_some_and(|r| r.start <= pos)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of covered positions.
    #[must_use]
    pub fn covered_len(&self) -> usize {
        self.ranges.iter().map(|r| r.end - r.start).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.ranges.iter().cloned()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Range<usize>> {
        self.ranges.clone()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ranges: &[Range<usize>]) -> RangeSet {
        let mut out = RangeSet::new();
        for r in ranges {
            out.insert(r.clone());
        }
        out
    }

    #[test]
    fn test_insert_merges_overlapping_and_adjacent() {
        let s = set(&[0..2, 5..7, 2..3, 6..9]);
        assert_eq!(s.to_vec(), vec![0..3, 5..9]);

        let s = set(&[4..6, 0..1, 1..5]);
        assert_eq!(s.to_vec(), vec![0..6]);
    }

    #[test]
    fn test_insert_ignores_empty() {
        let s = set(&[3..3]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_remove_splits() {
        let mut s = set(&[0..10]);
        s.remove(3..5);
        assert_eq!(s.to_vec(), vec![0..3, 5..10]);

        s.remove(0..4);
        assert_eq!(s.to_vec(), vec![5..10]);

        s.remove(8..20);
        assert_eq!(s.to_vec(), vec![5..8]);

        s.remove(0..100);
        assert!(s.is_empty());
    }

    #[test]
    fn test_remove_across_several_ranges() {
        let mut s = set(&[0..2, 4..6, 8..10]);
        s.remove(1..9);
        assert_eq!(s.to_vec(), vec![0..1, 9..10]);
    }

    #[test]
    fn test_truncate_and_contains() {
        let mut s = set(&[0..2, 4..8]);
        s.truncate(5);
        assert_eq!(s.to_vec(), vec![0..2, 4..5]);
        assert!(s.contains(4));
        assert!(!s.contains(5));
        assert!(!s.contains(2));
        assert_eq!(s.covered_len(), 3);

        s.truncate(3);
        assert_eq!(s.to_vec(), vec![0..2]);
    }
}
