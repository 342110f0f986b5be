// Chunk: docs/chunks/invalidation_tracking - Dirty range tracking across edits and scrolls
//!
//! Line-based viewport.
//!
//! The canvas reports what it shows as a first line plus a line count; the
//! session turns that into a byte range with the buffer's line metrics.

use std::ops::Range;

use neon_buffer::SourceBuffer;

/// The visible window of a canvas, in buffer lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    first_line: usize,
    visible_lines: usize,
}

impl Viewport {
    pub fn new(first_line: usize, visible_lines: usize) -> Self {
        Self {
            first_line,
            visible_lines,
        }
    }

    /// Returns the first visible buffer line
    pub fn first_visible_line(&self) -> usize {
        self.first_line
    }

    /// Returns how many lines fit in the viewport
    pub fn visible_lines(&self) -> usize {
        self.visible_lines
    }

    /// Returns the range of buffer lines that are visible, clamped to the
    /// buffer's line count.
    pub fn visible_range(&self, buffer_line_count: usize) -> Range<usize> {
        let start = self.first_line.min(buffer_line_count);
        let end = self
            .first_line
            .saturating_add(self.visible_lines)
            .min(buffer_line_count);
        start..end
    }

    /// Returns the byte range covered by the visible lines, including their
    /// line terminators.
    pub fn byte_range(&self, buffer: &SourceBuffer) -> Range<usize> {
        buffer.lines_byte_range(self.first_line, self.visible_lines)
    }

    /// Scrolls so `line` is the first visible line.
    pub fn scroll_to(&mut self, line: usize, buffer_line_count: usize) {
        let max_first = buffer_line_count.saturating_sub(self.visible_lines.max(1));
        self.first_line = line.min(max_first);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 40)
    }
}
