// Chunk: docs/chunks/source_buffer - Byte-addressed source buffer with lazy line index

//! Line index for tracking line boundaries in the source buffer.
//!
//! Maintains an array of byte offsets where each line starts, giving O(1)
//! line count and line access and O(log n) offset-to-line lookup. The index
//! is derived data: `SourceBuffer` drops it on every mutation and rebuilds
//! it the next time a line query needs it.

/// Tracks line boundaries in a text buffer.
///
/// The line index maintains a list of byte offsets where each line starts.
/// Only `\n` terminates a line; a `\r` before it stays part of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offsets where each line starts. line_starts[0] = 0 always,
    /// and the sequence is strictly increasing.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new line index with a single empty line.
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
        }
    }

    /// Builds the line index for the given text.
    ///
    /// O(n) over the text bytes.
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.as_bytes().iter().enumerate() {
            if *b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Returns the number of lines in the buffer.
    ///
    /// A buffer always has at least one line (even if empty). A trailing
    /// newline starts an empty last line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the byte offset where the given line starts.
    ///
    /// Returns None if the line index is out of bounds.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Returns the byte offset of the end of the given line.
    ///
    /// For all lines except the last, this points to the newline byte.
    /// For the last line, this equals the total buffer length.
    pub fn line_end(&self, line: usize, total_len: usize) -> Option<usize> {
        if line >= self.line_count() {
            return None;
        }

        if line + 1 < self.line_count() {
            // Not the last line: end is the start of the next line minus 1 (the newline)
            Some(self.line_starts[line + 1] - 1)
        } else {
            Some(total_len)
        }
    }

    /// Returns the length of the given line in bytes (excluding the newline).
    pub fn line_len(&self, line: usize, total_len: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let end = self.line_end(line, total_len)?;
        Some(end - start)
    }

    /// Returns the line number containing the given byte offset.
    ///
    /// Offsets past the end of the buffer map to the last line.
    pub fn line_at_offset(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Returns the raw line_starts array.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let index = LineIndex::new();
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_start(0), Some(0));
    }

    #[test]
    fn test_from_empty_text() {
        let index = LineIndex::from_text("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_start(0), Some(0));
        assert_eq!(index.line_end(0, 0), Some(0));
    }

    #[test]
    fn test_multiple_lines() {
        let index = LineIndex::from_text("hello\nworld\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_start(0), Some(0));
        assert_eq!(index.line_start(1), Some(6)); // After "hello\n"
        assert_eq!(index.line_start(2), Some(12)); // After "world\n"
    }

    #[test]
    fn test_offsets_are_bytes() {
        // "é" is two bytes
        let index = LineIndex::from_text("é\nx");
        assert_eq!(index.line_start(1), Some(3));
    }

    #[test]
    fn test_line_end_and_len() {
        let index = LineIndex::from_text("hello\nworld");
        assert_eq!(index.line_end(0, 11), Some(5));
        assert_eq!(index.line_end(1, 11), Some(11));
        assert_eq!(index.line_len(0, 11), Some(5));
        assert_eq!(index.line_len(1, 11), Some(5));
        assert_eq!(index.line_end(2, 11), None);
    }

    #[test]
    fn test_line_at_offset() {
        let index = LineIndex::from_text("hello\nworld\nfoo");
        assert_eq!(index.line_at_offset(0), 0);
        assert_eq!(index.line_at_offset(5), 0); // the newline belongs to line 0
        assert_eq!(index.line_at_offset(6), 1);
        assert_eq!(index.line_at_offset(11), 1);
        assert_eq!(index.line_at_offset(12), 2);
        assert_eq!(index.line_at_offset(100), 2);
    }

    #[test]
    fn test_line_starts_strictly_increasing() {
        let index = LineIndex::from_text("\n\n{\n}\n");
        let starts = index.line_starts();
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(starts, &[0, 1, 2, 4, 6]);
    }
}
