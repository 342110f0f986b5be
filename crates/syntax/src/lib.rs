// Chunk: docs/chunks/incremental_parse - Persistent JSON parse tree with subtree reuse
// Chunk: docs/chunks/highlight_query - Capture-pattern query engine

//! neon-syntax: incremental JSON parsing and highlight queries for neon-json.
//!
//! This crate turns buffer edits into fresh parse trees and parse trees into
//! highlight tokens, cheaply enough to run on every keystroke:
//!
//! - **Incremental parsing**: edits are folded into the previous tree by path
//!   copying, and the re-parse reuses every undamaged subtree.
//! - **Range-scoped queries**: a query only visits nodes that intersect the
//!   requested byte range.
//!
//! # Overview
//!
//! The main types are:
//!
//! - [`IncrementalParser`]: owns the current [`ParseTree`], accepts
//!   [`Edit`](neon_buffer::Edit)s and reports which byte ranges changed.
//!
//! - [`Query`]: a compiled capture query producing [`Token`]s; it implements
//!   [`TokenProvider`], the seam highlight workers call through.
//!
//! - [`Grammar`]: the JSON grammar plus its compiled highlights query.
//!
//! - [`SyntaxTheme`]: maps every [`TokenKind`] to a Catppuccin Mocha style.
//!
//! # Example
//!
//! ```
//! use neon_buffer::SourceBuffer;
//! use neon_syntax::{Grammar, TokenKind};
//!
//! let grammar = Grammar::load().unwrap();
//! let mut buffer = SourceBuffer::new("{\"a\":1}");
//! let mut parser = grammar.parser(buffer.text());
//!
//! let edit = buffer.replace(6..6, ",\"b\":2").unwrap();
//! parser.apply_edit(&edit).unwrap();
//! let tree = parser.current_tree(&buffer);
//!
//! let tokens = grammar.query().execute(&tree, 0..buffer.len());
//! assert!(tokens.iter().any(|t| t.range == (11..12) && t.kind == TokenKind::Number));
//! ```

mod error;
mod grammar;
mod incremental;
mod kind;
mod lexer;
mod parse;
mod query;
mod theme;
mod token;
mod tree;

pub use error::{QueryError, SyntaxError};
pub use grammar::{Grammar, JSON_HIGHLIGHTS};
pub use incremental::IncrementalParser;
pub use kind::{Field, SyntaxKind};
pub use lexer::{lex_one, tokenize, Lexeme};
pub use parse::parse;
pub use query::{Query, TokenProvider};
pub use theme::SyntaxTheme;
pub use token::{paint_order, Token, TokenKind};
pub use tree::{Child, Leaf, Node, ParseTree, TreeCursor};
