// Chunk: docs/chunks/source_buffer - Byte-addressed source buffer with lazy line index

//! Error types for buffer addressing and edit validation.

use thiserror::Error;

/// Errors raised when a caller addresses the buffer incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("byte range {start}..{end} is out of bounds for a buffer of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("byte offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("byte range {start}..{end} is reversed")]
    InvalidRange { start: usize, end: usize },
}

/// The reason an [`Edit`](crate::Edit) is inconsistent with the document it
/// claims to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditDefect {
    #[error("start byte {start} is after old end byte {old_end}")]
    StartAfterOldEnd { start: usize, old_end: usize },

    #[error("start byte {start} is after new end byte {new_end}")]
    StartAfterNewEnd { start: usize, new_end: usize },

    #[error("old end byte {old_end} is past the document length {len}")]
    OldEndPastLength { old_end: usize, len: usize },

    #[error("edit points are not ordered like their byte offsets")]
    PointsOutOfOrder,
}
