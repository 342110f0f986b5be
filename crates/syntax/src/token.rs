// Chunk: docs/chunks/highlight_query - Capture-pattern query engine

//! Typed highlight tokens.

use std::cmp::Reverse;
use std::ops::Range;

/// What a highlighted range is. The set is closed: capture names that do not
/// map onto a known kind become [`TokenKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    PunctuationBracket,
    PunctuationDelimiter,
    Keyword,
    String,
    Bool,
    Number,
    Null,
    Comment,
    Error,
    Unknown,
}

impl TokenKind {
    pub const ALL: [TokenKind; 10] = [
        TokenKind::PunctuationBracket,
        TokenKind::PunctuationDelimiter,
        TokenKind::Keyword,
        TokenKind::String,
        TokenKind::Bool,
        TokenKind::Number,
        TokenKind::Null,
        TokenKind::Comment,
        TokenKind::Error,
        TokenKind::Unknown,
    ];

    /// The capture name that maps to this kind. `Unknown` has none.
    pub fn capture_name(self) -> Option<&'static str> {
        let name = match self {
            TokenKind::PunctuationBracket => "punctuation.bracket",
            TokenKind::PunctuationDelimiter => "punctuation.delimiter",
            TokenKind::Keyword => "keyword",
            TokenKind::String => "value.string",
            TokenKind::Bool => "value.bool",
            TokenKind::Number => "value.number",
            TokenKind::Null => "value.null",
            TokenKind::Comment => "comment",
            TokenKind::Error => "error",
            TokenKind::Unknown => return None,
        };
        Some(name)
    }

    /// Maps a capture name to a kind.
    ///
    /// An exact match wins; otherwise trailing dotted segments are dropped
    /// until a known name remains, so `value.string.special` is a `String`.
    ///
    /// ```
    /// use neon_syntax::TokenKind;
    ///
    /// assert_eq!(TokenKind::from_capture_name("keyword"), TokenKind::Keyword);
    /// assert_eq!(TokenKind::from_capture_name("value.number.float"), TokenKind::Number);
    /// assert_eq!(TokenKind::from_capture_name("value"), TokenKind::Unknown);
    /// ```
    pub fn from_capture_name(name: &str) -> TokenKind {
        let mut candidate = name;
        loop {
            if let Some(kind) = TokenKind::ALL
                .into_iter()
                .find(|kind| kind.capture_name() == Some(candidate))
            {
                return kind;
            }
            match candidate.rfind('.') {
                Some(dot) => candidate = &candidate[..dot],
                None => return TokenKind::Unknown,
            }
        }
    }
}

/// A highlighted byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub range: Range<usize>,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(range: Range<usize>, kind: TokenKind) -> Self {
        Self { range, kind }
    }
}

/// Orders tokens for painting, widest first.
///
/// Captures come from tree nodes, so overlapping tokens are nested.
/// Painting in this order leaves the innermost capture on every byte. The
/// sort is stable: tokens of equal width keep their query order, which puts
/// the outer of two coinciding clipped captures first.
pub fn paint_order(tokens: &[Token]) -> Vec<&Token> {
    let mut ordered: Vec<&Token> = tokens.iter().collect();
    ordered.sort_by_key(|token| Reverse(token.range.len()));
    ordered
}
