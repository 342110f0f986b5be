// Chunk: docs/chunks/incremental_parse - Persistent JSON parse tree with subtree reuse

//! Error types for parsing, querying and grammar loading.
//!
//! None of these reach the canvas: an edit that is rejected leaves the parser
//! as it was, a failed query leaves its range unhighlighted and retryable,
//! and a grammar that fails to load disables highlighting for the session.

use neon_buffer::EditDefect;
use thiserror::Error;

/// Errors surfaced by the syntax layer.
#[derive(Debug, Error)]
pub enum SyntaxError {
    /// The caller described an edit that cannot apply to the current tree.
    #[error("invalid edit {start}..{old_end} -> {new_end}: {defect}")]
    InvalidEdit {
        start: usize,
        old_end: usize,
        new_end: usize,
        defect: EditDefect,
    },

    /// A token query could not produce tokens for a range.
    #[error("highlight query failed for {start}..{end}: {message}")]
    QueryFailure {
        start: usize,
        end: usize,
        message: String,
    },

    /// The grammar's highlights query did not compile.
    #[error("failed to load grammar `{grammar}`")]
    GrammarLoadFailure {
        grammar: String,
        #[source]
        source: QueryError,
    },
}

/// Errors found while compiling a query. Offsets are byte offsets into the
/// query source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of query at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("unknown node kind `{name}` at offset {offset}")]
    UnknownKind { name: String, offset: usize },

    #[error("unknown field `{name}` at offset {offset}")]
    UnknownField { name: String, offset: usize },

    #[error("`{literal}` at offset {offset} is not a token of this grammar")]
    UnknownLiteral { literal: String, offset: usize },

    #[error("{feature} at offset {offset} is not supported")]
    Unsupported {
        feature: &'static str,
        offset: usize,
    },
}

impl QueryError {
    /// Byte offset in the query source where the problem was found.
    pub fn offset(&self) -> usize {
        match self {
            QueryError::UnexpectedToken { offset, .. }
            | QueryError::UnexpectedEof { offset }
            | QueryError::UnknownKind { offset, .. }
            | QueryError::UnknownField { offset, .. }
            | QueryError::UnknownLiteral { offset, .. }
            | QueryError::Unsupported { offset, .. } => *offset,
        }
    }
}
