// Chunk: docs/chunks/async_highlight - Generation-tagged asynchronous token requests
//!
//! Highlight scheduling.
//!
//! The scheduler sits between the buffer and the canvas. Content changes go
//! through the incremental parser and the invalidation tracker; whenever
//! visible text is Dirty, one request per dirty sub-range is issued to the
//! executor. Completions are drained on the owner thread by
//! [`process_completions`](HighlightScheduler::process_completions), which
//! applies current results and drops stale ones.
//!
//! The generation check in the tracker is the only correctness mechanism for
//! out-of-order delivery. Nothing is ever cancelled.

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use neon_buffer::{Edit, Point, SourceBuffer};
use neon_syntax::{paint_order, IncrementalParser, ParseTree, SyntaxTheme, TokenProvider};

use crate::canvas::Canvas;
use crate::executor::{CompletionReceiver, HighlightJob, HighlightResponse, JobExecutor};
use crate::invalidation::{CompletionOutcome, Generation, InvalidationTracker};

/// Old extent of a change announced by `on_content_will_change`.
#[derive(Debug, Clone, Copy)]
struct PendingChange {
    start_byte: usize,
    old_end_byte: usize,
    start_point: Point,
    old_end_point: Point,
}

/// Counts from one [`HighlightScheduler::process_completions`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionSummary {
    pub applied: usize,
    pub stale: usize,
    pub failed: usize,
}

impl CompletionSummary {
    pub fn total(&self) -> usize {
        self.applied + self.stale + self.failed
    }
}

/// Drives parsing, invalidation and token requests for one document.
pub struct HighlightScheduler {
    parser: IncrementalParser,
    provider: Arc<dyn TokenProvider>,
    theme: SyntaxTheme,
    tracker: InvalidationTracker,
    executor: Box<dyn JobExecutor>,
    completions: CompletionReceiver,
    pending_change: Option<PendingChange>,
    next_request_id: u64,
    expand_to_lines: bool,
}

impl HighlightScheduler {
    /// Creates a scheduler for `buffer`. The whole document starts Dirty.
    pub fn new(
        buffer: &SourceBuffer,
        provider: Arc<dyn TokenProvider>,
        theme: SyntaxTheme,
        executor: Box<dyn JobExecutor>,
        completions: CompletionReceiver,
    ) -> Self {
        let mut tracker = InvalidationTracker::new();
        tracker.invalidate_all(buffer.len());
        Self {
            parser: IncrementalParser::new(buffer.text()),
            provider,
            theme,
            tracker,
            executor,
            completions,
            pending_change: None,
            next_request_id: 0,
            expand_to_lines: true,
        }
    }

    /// Whether dirty ranges grow to whole lines. On by default.
    pub fn set_expand_to_lines(&mut self, expand: bool) {
        self.expand_to_lines = expand;
    }

    pub fn tracker(&self) -> &InvalidationTracker {
        &self.tracker
    }

    pub fn generation(&self) -> Generation {
        self.tracker.generation()
    }

    pub fn theme(&self) -> &SyntaxTheme {
        &self.theme
    }

    /// The most recent parse tree.
    pub fn tree(&self) -> Arc<ParseTree> {
        Arc::clone(self.parser.tree())
    }

    /// True while requests issued for the current generation are in flight.
    pub fn has_pending(&self) -> bool {
        self.tracker.pending_count() > 0
    }

    /// Records the old extent of `range` before the buffer changes.
    pub fn on_content_will_change(&mut self, buffer: &SourceBuffer, range: Range<usize>) {
        let end = range.end.min(buffer.len());
        let start = range.start.min(end);
        self.pending_change = Some(PendingChange {
            start_byte: start,
            old_end_byte: end,
            start_point: buffer.point_at(start),
            old_end_point: buffer.point_at(end),
        });
    }

    /// Handles a change that already happened to `buffer`.
    ///
    /// `range` is the changed range in new coordinates and `delta` the
    /// change in document length. The edit goes to the parser and the
    /// tracker; if visible text is now Dirty, requests are issued at once.
    /// A change that does not fit the previous document resynchronises
    /// everything instead.
    pub fn on_content_did_change<C: Canvas>(
        &mut self,
        buffer: &SourceBuffer,
        range: Range<usize>,
        delta: isize,
        canvas: &mut C,
    ) {
        let old_len = self.parser.tree().len();
        if old_len as isize + delta != buffer.len() as isize {
            warn!(
                "change of {} bytes does not turn {} bytes into {}; resynchronising",
                delta,
                old_len,
                buffer.len()
            );
            self.resync(buffer, old_len, canvas);
        } else {
            let edit = self.build_edit(buffer, &range, delta);
            match self.parser.apply_edit(&edit) {
                Ok(()) => {
                    self.parser.current_tree(buffer);
                    let mut affected = vec![edit.new_range()];
                    affected.extend(self.parser.take_changed_ranges());
                    if self.expand_to_lines {
                        for r in &mut affected {
                            *r = buffer.expand_to_lines(r.clone());
                        }
                    }
                    self.tracker.did_edit(&edit, affected);
                    canvas.content_did_change(&edit);
                }
                Err(err) => {
                    warn!("{}; resynchronising", err);
                    self.resync(buffer, old_len, canvas);
                }
            }
        }
        self.pending_change = None;

        self.tracker.set_visible(canvas.viewport().byte_range(buffer));
        if self.tracker.has_visible_dirty() {
            self.issue_requests();
        }
    }

    /// Re-reads the canvas viewport and requests any visible Dirty text.
    pub fn on_visible_range_change<C: Canvas>(&mut self, buffer: &SourceBuffer, canvas: &C) {
        self.tracker.set_visible(canvas.viewport().byte_range(buffer));
        self.issue_requests();
    }

    /// Parses `buffer` from scratch and marks everything Dirty.
    pub fn reset(&mut self, buffer: &SourceBuffer) {
        self.parser.reset(buffer);
        self.parser.take_changed_ranges();
        self.pending_change = None;
        self.tracker.invalidate_all(buffer.len());
    }

    /// Throws away edit history after a change that could not be applied.
    /// The canvas is told the whole document was replaced.
    fn resync<C: Canvas>(&mut self, buffer: &SourceBuffer, old_len: usize, canvas: &mut C) {
        self.reset(buffer);
        canvas.content_did_change(&Edit {
            start_byte: 0,
            old_end_byte: old_len,
            new_end_byte: buffer.len(),
            start_point: Point::default(),
            old_end_point: Point::default(),
            new_end_point: buffer.point_at(buffer.len()),
        });
    }

    /// Applies every completion that has arrived so far.
    pub fn process_completions<C: Canvas>(&mut self, canvas: &mut C) -> CompletionSummary {
        let mut summary = CompletionSummary::default();
        while let Some(response) = self.completions.try_recv() {
            self.settle(response, canvas, &mut summary);
        }
        summary
    }

    /// Processes completions until nothing is in flight or `timeout` passes.
    /// Returns true if the scheduler went idle.
    pub fn wait_for_idle<C: Canvas>(&mut self, canvas: &mut C, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut summary = CompletionSummary::default();
        while self.has_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.completions.recv_timeout(remaining) {
                Some(response) => self.settle(response, canvas, &mut summary),
                None => return !self.has_pending(),
            }
        }
        true
    }

    fn build_edit(&self, buffer: &SourceBuffer, range: &Range<usize>, delta: isize) -> Edit {
        let new_end_byte = range.end.min(buffer.len());
        let start_byte = range.start.min(new_end_byte);
        let old_end_byte = (new_end_byte as isize - delta).max(start_byte as isize) as usize;

        let (start_point, old_end_point) = match self.pending_change {
            Some(change) if change.start_byte == start_byte && change.old_end_byte == old_end_byte => {
                (change.start_point, change.old_end_point)
            }
            _ => {
                // Without a matching announcement only the start point is
                // known; the parser rejects the edit if the bytes disagree
                debug!("content change at {}..{} was not announced", start_byte, old_end_byte);
                let start_point = buffer.point_at(start_byte);
                (start_point, start_point)
            }
        };
        Edit {
            start_byte,
            old_end_byte,
            new_end_byte,
            start_point,
            old_end_point,
            new_end_point: buffer.point_at(new_end_byte),
        }
    }

    fn issue_requests(&mut self) {
        let tree = Arc::clone(self.parser.tree());
        for queued in self.tracker.queue_visible() {
            let request_id = self.next_request_id;
            self.next_request_id += 1;
            debug!(
                "request {} for {:?} at {}",
                request_id, queued.range, queued.generation
            );
            self.executor.submit(HighlightJob {
                request_id,
                generation: queued.generation,
                range: queued.range,
                tree: Arc::clone(&tree),
                provider: Arc::clone(&self.provider),
            });
        }
    }

    fn settle<C: Canvas>(
        &mut self,
        response: HighlightResponse,
        canvas: &mut C,
        summary: &mut CompletionSummary,
    ) {
        let outcome =
            self.tracker
                .complete(response.generation, &response.range, response.result.is_ok());
        match (outcome, response.result) {
            (CompletionOutcome::Applied, Ok(tokens)) => {
                let range = response.range;
                canvas.set_attributes(range.clone(), self.theme.default_style());
                // Widest first, so the innermost capture decides each byte
                for token in paint_order(&tokens) {
                    let start = token.range.start.max(range.start);
                    let end = token.range.end.min(range.end);
                    if start < end {
                        canvas.set_attributes(start..end, self.theme.style_for(token.kind));
                    }
                }
                debug!(
                    "request {} applied {} token(s) to {:?}",
                    response.request_id,
                    tokens.len(),
                    range
                );
                summary.applied += 1;
            }
            (CompletionOutcome::Stale, _) => {
                debug!(
                    "request {} for {:?} is stale ({} < {}), discarded",
                    response.request_id,
                    response.range,
                    response.generation,
                    self.tracker.generation()
                );
                summary.stale += 1;
            }
            (_, Err(err)) => {
                warn!("request {} failed, will retry: {}", response.request_id, err);
                summary.failed += 1;
            }
            (_, Ok(_)) => {
                // The tracker only retries failed requests
                summary.failed += 1;
            }
        }
    }
}
