// Chunk: docs/chunks/invalidation_tracking - Dirty range tracking across edits and scrolls
//!
//! Byte-space dirty range bookkeeping.
//!
//! A `DirtyRangeSet` holds the byte spans whose rendered highlighting is out
//! of date. Ranges are kept sorted and disjoint: inserting a range that
//! overlaps or touches an existing one merges them, so two adjacent edits
//! before a highlight pass become a single request.

use std::ops::Range;

use neon_buffer::Edit;

/// A sorted set of disjoint, non-adjacent, non-empty byte ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRangeSet {
    ranges: Vec<Range<usize>>,
}

impl DirtyRangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing is dirty
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of disjoint ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = &Range<usize>> {
        self.ranges.iter()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Adds `range`, merging it with every range it overlaps or touches.
    /// Empty ranges are ignored.
    pub fn insert(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        // First range that could merge: its end reaches the new start
        let first = self.ranges.partition_point(|r| r.end < range.start);
        // One past the last range that could merge: its start is within reach
        let last = self.ranges.partition_point(|r| r.start <= range.end);

        let mut merged = range;
        if first < last {
            merged.start = merged.start.min(self.ranges[first].start);
            merged.end = merged.end.max(self.ranges[last - 1].end);
        }
        self.ranges.splice(first..last, std::iter::once(merged));
    }

    /// Removes `range` from the set, splitting ranges that straddle it.
    pub fn remove(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let mut kept = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if r.end <= range.start || r.start >= range.end {
                kept.push(r);
                continue;
            }
            if r.start < range.start {
                kept.push(r.start..range.start);
            }
            if r.end > range.end {
                kept.push(range.end..r.end);
            }
        }
        self.ranges = kept;
    }

    /// True if `offset` lies inside a dirty range.
    pub fn contains(&self, offset: usize) -> bool {
        let index = self.ranges.partition_point(|r| r.end <= offset);
        self.ranges
            .get(index)
            .is_some_and(|r| r.start <= offset)
    }

    /// Returns the parts of dirty ranges inside `window`, in order.
    pub fn intersecting(&self, window: &Range<usize>) -> Vec<Range<usize>> {
        self.ranges
            .iter()
            .filter_map(|r| {
                let start = r.start.max(window.start);
                let end = r.end.min(window.end);
                (start < end).then_some(start..end)
            })
            .collect()
    }

    /// True if any dirty range overlaps `window`.
    pub fn intersects(&self, window: &Range<usize>) -> bool {
        !self.intersecting(window).is_empty()
    }

    /// Moves every range into post-edit coordinates.
    ///
    /// Ranges after the edit shift by its delta; ranges inside the replaced
    /// text collapse onto the edit start and may disappear. The edited text
    /// itself is not marked here.
    pub fn shift(&mut self, edit: &Edit) {
        let old = std::mem::take(&mut self.ranges);
        for r in old {
            self.insert(edit.map_offset(r.start)..edit.map_offset(r.end));
        }
    }
}
