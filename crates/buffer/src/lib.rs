// Chunk: docs/chunks/source_buffer - Byte-addressed source buffer with lazy line index
// Chunk: docs/chunks/highlight_query - Style types applied to highlighted ranges

//! neon-buffer: document text and edit descriptions for neon-json.
//!
//! This crate holds the pure data the rest of the pipeline agrees on: the
//! live text, how a change to it is described, and the visual attributes a
//! highlighter can apply.
//!
//! # Overview
//!
//! - [`SourceBuffer`]: the text as a byte sequence with a lazily rebuilt
//!   line-start index and byte/line range queries
//! - [`Edit`] and [`Point`]: a single mutation in byte and (row, byte column)
//!   coordinates, consumed by the parser and the invalidation tracker
//! - [`Style`], [`Color`], [`StyledLine`]: attributes for highlighted ranges
//!
//! # Example
//!
//! ```
//! use neon_buffer::{Point, SourceBuffer};
//!
//! let mut buffer = SourceBuffer::new("{\"a\":1}");
//! let edit = buffer.replace(6..6, ",\n\"b\":2").unwrap();
//!
//! assert_eq!(buffer.text(), "{\"a\":1,\n\"b\":2}");
//! assert_eq!(edit.delta(), 7);
//! assert_eq!(edit.new_end_point, Point::new(1, 5));
//! assert_eq!(buffer.line_count(), 2);
//! ```

mod edit;
mod error;
mod line_index;
mod source_buffer;
mod style;

pub use edit::{byte_to_point, point_to_byte, Edit, Point};
pub use error::{BufferError, EditDefect};
pub use line_index::LineIndex;
pub use source_buffer::{SourceBuffer, TextSource};
pub use style::{Color, NamedColor, Span, Style, StyledLine, UnderlineStyle};
