// Chunk: docs/chunks/source_buffer - Byte-addressed source buffer with lazy line index

//! Edit descriptions shared by the buffer, the parser and the invalidation
//! tracker.
//!
//! An [`Edit`] carries both byte offsets and (row, column) points for the
//! start of the change, the end of the replaced text and the end of the
//! inserted text. Columns are byte offsets within the row, so converting
//! between offsets and points never needs to decode characters beyond
//! scanning for `\n`.

use std::ops::Range;

use crate::error::EditDefect;

/// A (row, column) position in the document. Both are 0-indexed and the
/// column counts bytes from the start of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Returns the point reached after writing `text` starting at `self`.
    pub fn advance(self, text: &str) -> Point {
        match text.rfind('\n') {
            Some(last_newline) => Point {
                row: self.row + text.bytes().filter(|b| *b == b'\n').count(),
                column: text.len() - last_newline - 1,
            },
            None => Point {
                row: self.row,
                column: self.column + text.len(),
            },
        }
    }
}

/// A single content mutation, described in both byte and point coordinates.
///
/// `start_byte..old_end_byte` is the replaced span in the old document and
/// `start_byte..new_end_byte` is the inserted span in the new document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

impl Edit {
    /// Builds the edit for inserting `text` at byte `offset` of `source`.
    ///
    /// `source` is the text before the edit. Offsets past the end are clamped.
    pub fn insert(source: &str, offset: usize, text: &str) -> Edit {
        Edit::replace(source, offset..offset, text)
    }

    /// Builds the edit for deleting `range` from `source`.
    pub fn delete(source: &str, range: Range<usize>) -> Edit {
        Edit::replace(source, range, "")
    }

    /// Builds the edit for replacing `range` of `source` with `text`.
    pub fn replace(source: &str, range: Range<usize>, text: &str) -> Edit {
        let start_byte = range.start.min(source.len());
        let old_end_byte = range.end.clamp(start_byte, source.len());
        let start_point = byte_to_point(source, start_byte);
        let old_end_point = byte_to_point(source, old_end_byte);
        Edit {
            start_byte,
            old_end_byte,
            new_end_byte: start_byte + text.len(),
            start_point,
            old_end_point,
            new_end_point: start_point.advance(text),
        }
    }

    /// Signed change in document length.
    pub fn delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }

    /// The replaced span, in old-document coordinates.
    pub fn old_range(&self) -> Range<usize> {
        self.start_byte..self.old_end_byte
    }

    /// The inserted span, in new-document coordinates.
    pub fn new_range(&self) -> Range<usize> {
        self.start_byte..self.new_end_byte
    }

    /// Checks that the edit can apply to a document of `old_len` bytes.
    pub fn validate(&self, old_len: usize) -> Result<(), EditDefect> {
        if self.start_byte > self.old_end_byte {
            return Err(EditDefect::StartAfterOldEnd {
                start: self.start_byte,
                old_end: self.old_end_byte,
            });
        }
        if self.start_byte > self.new_end_byte {
            return Err(EditDefect::StartAfterNewEnd {
                start: self.start_byte,
                new_end: self.new_end_byte,
            });
        }
        if self.old_end_byte > old_len {
            return Err(EditDefect::OldEndPastLength {
                old_end: self.old_end_byte,
                len: old_len,
            });
        }
        let bytes_order = self.start_byte.cmp(&self.old_end_byte);
        let points_order = self.start_point.cmp(&self.old_end_point);
        let new_bytes_order = self.start_byte.cmp(&self.new_end_byte);
        let new_points_order = self.start_point.cmp(&self.new_end_point);
        if bytes_order != points_order || new_bytes_order != new_points_order {
            return Err(EditDefect::PointsOutOfOrder);
        }
        Ok(())
    }

    /// Maps a byte offset in the old document to the new document.
    ///
    /// Offsets inside the replaced span collapse onto its start, and an
    /// offset at the start of an insertion stays before the inserted text.
    pub fn map_offset(&self, offset: usize) -> usize {
        if offset <= self.start_byte {
            offset
        } else if offset < self.old_end_byte {
            self.start_byte
        } else {
            offset - self.old_end_byte + self.new_end_byte
        }
    }
}

/// Returns the point of byte `offset` in `source`, clamped to the end.
///
/// # Example
///
/// ```
/// use neon_buffer::{byte_to_point, Point};
///
/// let source = "{\n  \"a\": 1\n}";
/// assert_eq!(byte_to_point(source, 0), Point::new(0, 0));
/// assert_eq!(byte_to_point(source, 4), Point::new(1, 2));
/// assert_eq!(byte_to_point(source, 100), Point::new(2, 1));
/// ```
pub fn byte_to_point(source: &str, offset: usize) -> Point {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let row = before.iter().filter(|b| **b == b'\n').count();
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    Point::new(row, offset - line_start)
}

/// Returns the byte offset of `point` in `source`.
///
/// Columns past the end of a row clamp to the row end (the newline byte);
/// rows past the end clamp to the document length.
pub fn point_to_byte(source: &str, point: Point) -> usize {
    let mut line_start = 0;
    for _ in 0..point.row {
        match source[line_start..].find('\n') {
            Some(i) => line_start += i + 1,
            None => return source.len(),
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |i| line_start + i);
    (line_start + point.column).min(line_end)
}
