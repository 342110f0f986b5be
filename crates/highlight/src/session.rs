// Chunk: docs/chunks/async_highlight - Generation-tagged asynchronous token requests
//!
//! The highlight session.
//!
//! A `HighlightSession` owns everything one highlighted document needs: the
//! buffer, the grammar, the scheduler (with its parser, tracker and
//! executor) and the canvas. There is no global state; hosts create one
//! session per document and call into it from a single thread.
//!
//! If the grammar failed to load, the session still edits its buffer and
//! keeps the canvas sized to it, but never highlights.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use neon_buffer::{BufferError, Edit, SourceBuffer};
use neon_syntax::{Grammar, ParseTree, SyntaxError, SyntaxTheme};

use crate::canvas::Canvas;
use crate::config::HighlightConfig;
use crate::executor::{completion_channel, CompletionReceiver, JobExecutor, ThreadPoolExecutor};
use crate::invalidation::Generation;
use crate::scheduler::{CompletionSummary, HighlightScheduler};

/// One highlighted document.
pub struct HighlightSession<C: Canvas> {
    config: HighlightConfig,
    buffer: SourceBuffer,
    grammar: Option<Grammar>,
    scheduler: Option<HighlightScheduler>,
    canvas: C,
}

impl<C: Canvas> HighlightSession<C> {
    /// Creates a session running queries on a thread pool of
    /// `config.worker_threads` workers.
    pub fn new(config: HighlightConfig, grammar: Result<Grammar, SyntaxError>, canvas: C) -> Self {
        let (sender, receiver) = completion_channel(None);
        let executor = ThreadPoolExecutor::new(config.worker_threads, sender);
        Self::with_executor(config, grammar, canvas, Box::new(executor), receiver)
    }

    /// Creates a session with a caller-supplied executor. `completions` must
    /// be the receiving end of the channel the executor posts to.
    pub fn with_executor(
        config: HighlightConfig,
        grammar: Result<Grammar, SyntaxError>,
        canvas: C,
        executor: Box<dyn JobExecutor>,
        completions: CompletionReceiver,
    ) -> Self {
        let buffer = SourceBuffer::new("");
        let grammar = match grammar {
            Ok(grammar) => Some(grammar),
            Err(err) => {
                error!("highlighting disabled: {}", err);
                None
            }
        };
        let theme = SyntaxTheme::by_name(&config.theme).unwrap_or_else(|| {
            warn!("unknown theme `{}`, using catppuccin-mocha", config.theme);
            SyntaxTheme::catppuccin_mocha()
        });
        let scheduler = grammar.as_ref().map(|grammar| {
            let mut scheduler = HighlightScheduler::new(
                &buffer,
                grammar.query().clone(),
                theme,
                executor,
                completions,
            );
            scheduler.set_expand_to_lines(config.expand_to_lines);
            scheduler
        });
        Self {
            config,
            buffer,
            grammar,
            scheduler,
            canvas,
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    /// Mutable access for hosts that edit the buffer themselves, between
    /// [`content_will_change`](Self::content_will_change) and
    /// [`content_did_change`](Self::content_did_change).
    pub fn buffer_mut(&mut self) -> &mut SourceBuffer {
        &mut self.buffer
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn grammar(&self) -> Option<&Grammar> {
        self.grammar.as_ref()
    }

    pub fn is_highlighting_enabled(&self) -> bool {
        self.scheduler.is_some()
    }

    pub fn scheduler(&self) -> Option<&HighlightScheduler> {
        self.scheduler.as_ref()
    }

    /// The current parse tree, if highlighting is enabled.
    pub fn tree(&self) -> Option<Arc<ParseTree>> {
        self.scheduler.as_ref().map(HighlightScheduler::tree)
    }

    pub fn generation(&self) -> Option<Generation> {
        self.scheduler.as_ref().map(HighlightScheduler::generation)
    }

    /// Replaces the whole document.
    pub fn load(&mut self, text: &str) {
        let edit = self.buffer.set_text(text);
        self.canvas.content_did_change(&edit);
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.reset(&self.buffer);
        }
        info!(
            "loaded {} bytes in {} lines",
            self.buffer.len(),
            self.buffer.line_count()
        );
        self.visible_content_did_change();
    }

    /// Replaces `range` with `text`, announcing the change before and after.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<Edit, BufferError> {
        self.content_will_change(range.clone());
        let edit = self.buffer.replace(range, text)?;
        self.content_did_change(edit.new_range(), edit.delta());
        Ok(edit)
    }

    /// Announces that `range` of the buffer is about to change.
    pub fn content_will_change(&mut self, range: Range<usize>) {
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.on_content_will_change(&self.buffer, range);
        }
    }

    /// Reports that the buffer changed: `range` is the new text's range and
    /// `delta` the change in length.
    pub fn content_did_change(&mut self, range: Range<usize>, delta: isize) {
        match &mut self.scheduler {
            Some(scheduler) => {
                scheduler.on_content_did_change(&self.buffer, range, delta, &mut self.canvas)
            }
            None => {
                // Keep the canvas sized to the text even without highlighting
                let old_end = (range.end as isize - delta).max(range.start as isize) as usize;
                self.canvas.content_did_change(&Edit {
                    start_byte: range.start,
                    old_end_byte: old_end,
                    new_end_byte: range.end,
                    start_point: self.buffer.point_at(range.start),
                    old_end_point: self.buffer.point_at(range.start),
                    new_end_point: self.buffer.point_at(range.end),
                });
            }
        }
    }

    /// Reports that the canvas scrolled or resized.
    pub fn visible_content_did_change(&mut self) {
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.on_visible_range_change(&self.buffer, &self.canvas);
        }
    }

    /// Applies every completion that has arrived. Hosts call this from their
    /// run loop, typically after the completion waker fired.
    pub fn process_completions(&mut self) -> CompletionSummary {
        match &mut self.scheduler {
            Some(scheduler) => scheduler.process_completions(&mut self.canvas),
            None => CompletionSummary::default(),
        }
    }

    /// Blocks until no current request is in flight or `timeout` passes.
    pub fn wait_for_idle(&mut self, timeout: Duration) -> bool {
        match &mut self.scheduler {
            Some(scheduler) => scheduler.wait_for_idle(&mut self.canvas, timeout),
            None => true,
        }
    }
}
