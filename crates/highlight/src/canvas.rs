// Chunk: docs/chunks/async_highlight - Generation-tagged asynchronous token requests
//!
//! The passive display surface highlighting writes to.
//!
//! A [`Canvas`] only accepts "set these attributes on this byte range" and
//! reports which lines it shows. [`StyleCanvas`] is the headless canvas used
//! by tests and the demo: it keeps one style per byte of the document.

use std::ops::Range;

use neon_buffer::{Edit, SourceBuffer, Style, StyledLine};

use crate::viewport::Viewport;

/// A display surface that highlighting paints on.
pub trait Canvas {
    /// Sets the visual attributes of `range`.
    fn set_attributes(&mut self, range: Range<usize>, style: Style);

    /// Returns the window the canvas currently shows.
    fn viewport(&self) -> Viewport;

    /// Called after the text changed, before any highlighting for the new
    /// text arrives. Canvases that store attributes by offset can shift them.
    fn content_did_change(&mut self, _edit: &Edit) {}
}

/// A headless canvas that stores a style per byte.
#[derive(Debug, Clone)]
pub struct StyleCanvas {
    styles: Vec<Style>,
    viewport: Viewport,
    writes: usize,
}

impl StyleCanvas {
    pub fn new(visible_lines: usize) -> Self {
        Self {
            styles: Vec::new(),
            viewport: Viewport::new(0, visible_lines),
            writes: 0,
        }
    }

    /// Style of the byte at `offset`, or `None` past the end.
    pub fn style_at(&self, offset: usize) -> Option<Style> {
        self.styles.get(offset).copied()
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Number of `set_attributes` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Scrolls so `line` is the first visible line.
    pub fn scroll_to(&mut self, line: usize, buffer_line_count: usize) {
        self.viewport.scroll_to(line, buffer_line_count);
    }

    /// Renders one buffer line as styled spans, without its terminator.
    pub fn render_line(&self, buffer: &SourceBuffer, line: usize) -> StyledLine {
        let mut styled = StyledLine::default();
        let Some(range) = buffer.line_range(line) else {
            return styled;
        };
        let line = &buffer.text()[range.clone()];
        // A character takes the style of its first byte
        for (i, c) in line.char_indices() {
            let style = self.style_at(range.start + i).unwrap_or_default();
            styled.push(&line[i..i + c.len_utf8()], style);
        }
        styled
    }

    /// Renders the lines of the current viewport.
    pub fn render_visible(&self, buffer: &SourceBuffer) -> Vec<StyledLine> {
        self.viewport
            .visible_range(buffer.line_count())
            .map(|line| self.render_line(buffer, line))
            .collect()
    }
}

impl Canvas for StyleCanvas {
    fn set_attributes(&mut self, range: Range<usize>, style: Style) {
        let end = range.end.min(self.styles.len());
        let start = range.start.min(end);
        for slot in &mut self.styles[start..end] {
            *slot = style;
        }
        self.writes += 1;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn content_did_change(&mut self, edit: &Edit) {
        let old = edit.old_range();
        let end = old.end.min(self.styles.len());
        let start = old.start.min(end);
        let inserted = edit.new_end_byte - edit.start_byte;
        self.styles.splice(
            start..end,
            std::iter::repeat(Style::default()).take(inserted),
        );
    }
}
