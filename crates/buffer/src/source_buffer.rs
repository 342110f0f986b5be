// Chunk: docs/chunks/source_buffer - Byte-addressed source buffer with lazy line index

//! The document text as an addressable byte sequence.
//!
//! [`SourceBuffer`] owns the live text and answers byte and line range
//! queries. The line-start index is derived data: every mutation drops it and
//! the next line query rebuilds it from the current bytes, so it can never be
//! observed out of date.

use std::cell::OnceCell;
use std::ops::Range;

use crate::edit::{point_to_byte, Edit, Point};
use crate::error::BufferError;
use crate::line_index::LineIndex;

/// Read access to document text.
///
/// Implemented by [`SourceBuffer`] and by plain strings so parsers can run
/// against either.
pub trait TextSource {
    /// The full text.
    fn content(&self) -> &str;

    /// Length of the text in bytes.
    fn len(&self) -> usize {
        self.content().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextSource for str {
    fn content(&self) -> &str {
        self
    }
}

impl TextSource for String {
    fn content(&self) -> &str {
        self.as_str()
    }
}

/// The live document text with lazily built line metrics.
#[derive(Debug, Default)]
pub struct SourceBuffer {
    text: String,
    lines: OnceCell<LineIndex>,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lines: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn line_index(&self) -> &LineIndex {
        self.lines.get_or_init(|| LineIndex::from_text(&self.text))
    }

    /// Returns the text in `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<&str, BufferError> {
        self.check_range(&range)?;
        Ok(&self.text[range])
    }

    /// Returns the number of lines. An empty buffer has one line.
    pub fn line_count(&self) -> usize {
        self.line_index().line_count()
    }

    /// Returns the byte range of `line`, excluding its newline.
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        let index = self.line_index();
        let start = index.line_start(line)?;
        let end = index.line_end(line, self.text.len())?;
        Some(start..end)
    }

    /// Returns the content of `line`, excluding its newline.
    pub fn line_content(&self, line: usize) -> Option<&str> {
        self.line_range(line).map(|range| &self.text[range])
    }

    /// Returns the byte span covering `count` lines starting at `first_line`,
    /// newlines included. Lines past the end of the buffer are ignored.
    pub fn lines_byte_range(&self, first_line: usize, count: usize) -> Range<usize> {
        let index = self.line_index();
        let len = self.text.len();
        let start = index.line_start(first_line).unwrap_or(len);
        let end = first_line
            .checked_add(count)
            .and_then(|line| index.line_start(line))
            .unwrap_or(len);
        start..end.max(start)
    }

    /// Returns the line containing byte `offset`.
    pub fn line_at_byte(&self, offset: usize) -> usize {
        self.line_index().line_at_offset(offset)
    }

    /// Returns the (row, byte column) point of `offset`, clamped to the end.
    pub fn point_at(&self, offset: usize) -> Point {
        let offset = offset.min(self.text.len());
        let row = self.line_at_byte(offset);
        let line_start = self.line_index().line_start(row).unwrap_or(0);
        Point::new(row, offset - line_start)
    }

    /// Returns the byte offset of `point`, clamped to the row and document.
    pub fn byte_at(&self, point: Point) -> usize {
        match self.line_range(point.row) {
            Some(range) => (range.start + point.column).min(range.end),
            None => point_to_byte(&self.text, point),
        }
    }

    /// Widens `range` to whole lines: from the start of the first touched
    /// line to the start of the line after the last touched one.
    pub fn expand_to_lines(&self, range: Range<usize>) -> Range<usize> {
        let len = self.text.len();
        let first = self.line_at_byte(range.start.min(len));
        let last = self.line_at_byte(range.end.min(len));
        self.lines_byte_range(first, last - first + 1)
    }

    /// Replaces `range` with `text` and returns the edit describing it.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<Edit, BufferError> {
        self.check_range(&range)?;
        let edit = Edit {
            start_byte: range.start,
            old_end_byte: range.end,
            new_end_byte: range.start + text.len(),
            start_point: self.point_at(range.start),
            old_end_point: self.point_at(range.end),
            new_end_point: self.point_at(range.start).advance(text),
        };
        self.text.replace_range(range, text);
        self.lines.take();
        Ok(edit)
    }

    /// Replaces the whole text and returns the edit describing it.
    pub fn set_text(&mut self, text: impl Into<String>) -> Edit {
        let text = text.into();
        let edit = Edit::replace(&self.text, 0..self.text.len(), &text);
        self.text = text;
        self.lines.take();
        edit
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), BufferError> {
        if range.start > range.end {
            return Err(BufferError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.text.len() {
            return Err(BufferError::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.text.len(),
            });
        }
        for offset in [range.start, range.end] {
            if !self.text.is_char_boundary(offset) {
                return Err(BufferError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }
}

impl TextSource for SourceBuffer {
    fn content(&self) -> &str {
        &self.text
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        SourceBuffer::new(text)
    }
}
