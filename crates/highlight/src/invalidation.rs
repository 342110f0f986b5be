// Chunk: docs/chunks/invalidation_tracking - Dirty range tracking across edits and scrolls
//!
//! Invalidation tracking for highlight requests.
//!
//! Every byte of the document is in one of three states:
//!
//! - **Clean**: the canvas shows highlighting for the current generation.
//! - **Dirty**: highlighting is out of date and nobody is working on it.
//! - **Pending**: a request tagged with a generation is in flight.
//!
//! Edits bump the generation. Anything pending at that moment goes back to
//! Dirty, which is what makes late results harmless: a completion is only
//! applied when its generation is still the current one.

use std::ops::Range;

use log::debug;
use neon_buffer::Edit;

use crate::dirty_ranges::DirtyRangeSet;

/// Monotonic edit-state version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Generation {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen {}", self.0)
    }
}

/// Highlight state of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    Clean,
    Dirty,
    Pending(Generation),
}

/// What the tracker decided about a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The result is current: apply it, the range is now Clean.
    Applied,
    /// The result predates a newer edit and must be discarded.
    Stale,
    /// The request failed while current; the range is Dirty again.
    Retry,
}

/// A range handed to the scheduler for querying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedRange {
    pub range: Range<usize>,
    pub generation: Generation,
}

/// Maps edits and viewport changes to the ranges that need highlighting.
#[derive(Debug, Default)]
pub struct InvalidationTracker {
    dirty: DirtyRangeSet,
    /// In-flight ranges, all tagged with the current generation.
    pending: Vec<QueuedRange>,
    generation: Generation,
    visible: Range<usize>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn dirty(&self) -> &DirtyRangeSet {
        &self.dirty
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn visible(&self) -> Range<usize> {
        self.visible.clone()
    }

    /// Records an edit.
    ///
    /// Existing dirty ranges shift through the edit, in-flight ranges are
    /// shifted and returned to Dirty, `affected` (post-edit coordinates) is
    /// marked Dirty, and the generation advances.
    pub fn did_edit<I>(&mut self, edit: &Edit, affected: I)
    where
        I: IntoIterator<Item = Range<usize>>,
    {
        self.dirty.shift(edit);
        for queued in self.pending.drain(..) {
            self.dirty
                .insert(edit.map_offset(queued.range.start)..edit.map_offset(queued.range.end));
        }
        for range in affected {
            self.dirty.insert(range);
        }
        self.visible = edit.map_offset(self.visible.start)..edit.map_offset(self.visible.end);
        self.generation = self.generation.next();
        debug!(
            "edit at {}..{} -> {}: {} dirty range(s), now {}",
            edit.start_byte,
            edit.old_end_byte,
            edit.new_end_byte,
            self.dirty.len(),
            self.generation
        );
    }

    /// Marks the whole document Dirty, for initial load or resynchronisation.
    pub fn invalidate_all(&mut self, len: usize) {
        self.pending.clear();
        self.dirty.clear();
        self.dirty.insert(0..len);
        self.generation = self.generation.next();
    }

    /// Sets the visible byte range.
    pub fn set_visible(&mut self, visible: Range<usize>) {
        self.visible = visible;
    }

    /// True if some Dirty range is visible.
    pub fn has_visible_dirty(&self) -> bool {
        self.dirty.intersects(&self.visible)
    }

    /// Moves the visible part of every Dirty range to Pending with the
    /// current generation and returns those parts. Dirty ranges outside the
    /// visible range stay Dirty.
    pub fn queue_visible(&mut self) -> Vec<QueuedRange> {
        let queued: Vec<QueuedRange> = self
            .dirty
            .intersecting(&self.visible)
            .into_iter()
            .map(|range| QueuedRange {
                range,
                generation: self.generation,
            })
            .collect();
        for q in &queued {
            self.dirty.remove(q.range.clone());
        }
        self.pending.extend(queued.iter().cloned());
        queued
    }

    /// Settles a request for `range` issued at `generation`.
    pub fn complete(
        &mut self,
        generation: Generation,
        range: &Range<usize>,
        succeeded: bool,
    ) -> CompletionOutcome {
        if generation != self.generation {
            return CompletionOutcome::Stale;
        }
        let Some(index) = self.pending.iter().position(|q| q.range == *range) else {
            // Already settled or re-queued under the same generation
            return CompletionOutcome::Stale;
        };
        self.pending.swap_remove(index);
        if succeeded {
            CompletionOutcome::Applied
        } else {
            self.dirty.insert(range.clone());
            CompletionOutcome::Retry
        }
    }

    /// Reports the state of the byte at `offset`.
    pub fn state_at(&self, offset: usize) -> RegionState {
        if self.dirty.contains(offset) {
            return RegionState::Dirty;
        }
        self.pending
            .iter()
            .find(|q| q.range.start <= offset && offset < q.range.end)
            .map_or(RegionState::Clean, |q| RegionState::Pending(q.generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "{\n  \"a\": 1,\n  \"b\": 2\n}\n";

    fn loaded() -> InvalidationTracker {
        let mut tracker = InvalidationTracker::new();
        tracker.invalidate_all(TEXT.len());
        tracker
    }

    // ==================== queueing ====================

    #[test]
    fn test_queue_visible_only_takes_visible_part() {
        let mut tracker = loaded();
        tracker.set_visible(0..10);
        let queued = tracker.queue_visible();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].range, 0..10);
        assert_eq!(tracker.state_at(5), RegionState::Pending(Generation(1)));
        assert_eq!(tracker.state_at(15), RegionState::Dirty);

        // Nothing new to queue until something changes
        assert!(tracker.queue_visible().is_empty());
    }

    #[test]
    fn test_dirty_outside_viewport_is_not_queued() {
        let mut tracker = loaded();
        tracker.set_visible(0..0);
        assert!(tracker.queue_visible().is_empty());
        assert!(!tracker.has_visible_dirty());
        tracker.set_visible(12..20);
        assert_eq!(tracker.queue_visible()[0].range, 12..20);
    }

    // ==================== completion ====================

    #[test]
    fn test_current_completion_cleans_range() {
        let mut tracker = loaded();
        tracker.set_visible(0..TEXT.len());
        let q = tracker.queue_visible().remove(0);
        assert_eq!(
            tracker.complete(q.generation, &q.range, true),
            CompletionOutcome::Applied
        );
        assert_eq!(tracker.state_at(0), RegionState::Clean);
        assert_eq!(tracker.pending_count(), 0);
        assert!(tracker.dirty().is_empty());
    }

    #[test]
    fn test_completion_after_edit_is_stale() {
        let mut tracker = loaded();
        tracker.set_visible(0..TEXT.len());
        let q = tracker.queue_visible().remove(0);

        let edit = Edit::insert(TEXT, 9, "0");
        tracker.did_edit(&edit, [9..10]);
        assert_eq!(tracker.generation(), Generation(2));
        assert_eq!(
            tracker.complete(q.generation, &q.range, true),
            CompletionOutcome::Stale
        );
        // The in-flight range went back to Dirty, shifted past the insertion
        assert_eq!(tracker.dirty().ranges(), &[0..TEXT.len() + 1]);
    }

    #[test]
    fn test_failure_returns_range_to_dirty() {
        let mut tracker = loaded();
        tracker.set_visible(0..4);
        let q = tracker.queue_visible().remove(0);
        assert_eq!(
            tracker.complete(q.generation, &q.range, false),
            CompletionOutcome::Retry
        );
        assert_eq!(tracker.state_at(2), RegionState::Dirty);
        assert_eq!(tracker.queue_visible()[0].range, 0..4);
    }

    // ==================== edits ====================

    #[test]
    fn test_adjacent_edits_coalesce() {
        let mut tracker = InvalidationTracker::new();
        let text = "[1, 2, 3]";
        tracker.did_edit(&Edit::replace(text, 1..2, "7"), [1..2]);
        tracker.did_edit(&Edit::replace(text, 2..3, ";"), [2..3]);
        assert_eq!(tracker.dirty().ranges(), &[1..3]);
        assert_eq!(tracker.generation(), Generation(2));
    }

    #[test]
    fn test_edit_shifts_visible_range() {
        let mut tracker = InvalidationTracker::new();
        tracker.set_visible(10..20);
        tracker.did_edit(&Edit::insert("0123456789", 0, "ab"), [0..2]);
        assert_eq!(tracker.visible(), 12..22);
    }
}
