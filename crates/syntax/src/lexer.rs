// Chunk: docs/chunks/incremental_parse - Persistent JSON parse tree with subtree reuse

//! Logos-based lexer for JSON with comments.
//!
//! The parser lexes one token at a time from an arbitrary byte position, so
//! re-lexing after an edit starts exactly where the damaged region begins.
//! A token depends only on the text from its start onward, which keeps
//! incremental and from-scratch parses in agreement.

use logos::Logos;

use crate::kind::SyntaxKind;

/// A lexed token: its kind and byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: SyntaxKind,
    pub len: usize,
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    /// A string missing its closing quote; runs to the end of the line.
    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    UnterminatedString,

    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    /// Bare identifiers are not JSON; they lex as one error token so a
    /// misspelled literal is reported once.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,
}

impl RawToken {
    fn kind(self) -> SyntaxKind {
        match self {
            RawToken::Whitespace => SyntaxKind::Whitespace,
            RawToken::LineComment | RawToken::BlockComment => SyntaxKind::Comment,
            RawToken::LBrace => SyntaxKind::LBrace,
            RawToken::RBrace => SyntaxKind::RBrace,
            RawToken::LBracket => SyntaxKind::LBracket,
            RawToken::RBracket => SyntaxKind::RBracket,
            RawToken::Comma => SyntaxKind::Comma,
            RawToken::Colon => SyntaxKind::Colon,
            RawToken::String => SyntaxKind::String,
            RawToken::Number => SyntaxKind::Number,
            RawToken::True => SyntaxKind::True,
            RawToken::False => SyntaxKind::False,
            RawToken::Null => SyntaxKind::Null,
            RawToken::UnterminatedString | RawToken::Word => SyntaxKind::Error,
        }
    }
}

/// Lexes the single token at the start of `text`.
///
/// Returns an `Eof` lexeme of length 0 for empty input. Unrecognised input
/// becomes an `Error` lexeme of at least one character.
pub fn lex_one(text: &str) -> Lexeme {
    let mut lexer = RawToken::lexer(text);
    match lexer.next() {
        None => Lexeme {
            kind: SyntaxKind::Eof,
            len: 0,
        },
        Some(Ok(token)) => Lexeme {
            kind: token.kind(),
            len: lexer.span().len(),
        },
        Some(Err(())) => {
            let mut len = lexer.span().len().max(1).min(text.len());
            while !text.is_char_boundary(len) {
                len += 1;
            }
            Lexeme {
                kind: SyntaxKind::Error,
                len,
            }
        }
    }
}

/// Lexes all of `text`. Used by tests and diagnostics.
pub fn tokenize(text: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut pos = 0;
    loop {
        let lexeme = lex_one(&text[pos..]);
        if lexeme.kind == SyntaxKind::Eof {
            return lexemes;
        }
        pos += lexeme.len;
        lexemes.push(lexeme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokenize(text).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_empty_input_is_eof() {
        assert_eq!(lex_one(""), Lexeme { kind: SyntaxKind::Eof, len: 0 });
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_object_tokens() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("{\"a\": [1, true]}"),
            vec![LBrace, String, Colon, Whitespace, LBracket, Number, Comma, Whitespace, True, RBracket, RBrace]
        );
    }

    #[test]
    fn test_numbers() {
        for text in ["0", "-1", "12.5", "1e10", "-0.25E-3"] {
            assert_eq!(lex_one(text), Lexeme { kind: SyntaxKind::Number, len: text.len() }, "{text}");
        }
        // A leading zero ends the number
        assert_eq!(lex_one("01"), Lexeme { kind: SyntaxKind::Number, len: 1 });
    }

    #[test]
    fn test_string_escapes() {
        let text = r#""a\"b\\" rest"#;
        assert_eq!(lex_one(text), Lexeme { kind: SyntaxKind::String, len: 8 });
    }

    #[test]
    fn test_unterminated_string_runs_to_line_end() {
        let lexeme = lex_one("\"abc\n]");
        assert_eq!(lexeme, Lexeme { kind: SyntaxKind::Error, len: 4 });
    }

    #[test]
    fn test_comments() {
        assert_eq!(lex_one("// note\n1"), Lexeme { kind: SyntaxKind::Comment, len: 7 });
        assert_eq!(lex_one("/* a ** b */1"), Lexeme { kind: SyntaxKind::Comment, len: 12 });
    }

    #[test]
    fn test_keywords_and_words() {
        assert_eq!(lex_one("null,"), Lexeme { kind: SyntaxKind::Null, len: 4 });
        assert_eq!(lex_one("nul,"), Lexeme { kind: SyntaxKind::Error, len: 3 });
        assert_eq!(lex_one("truex"), Lexeme { kind: SyntaxKind::Error, len: 5 });
    }

    #[test]
    fn test_unknown_bytes_make_progress() {
        let lexemes = tokenize("@é");
        assert!(lexemes.iter().all(|l| l.kind == SyntaxKind::Error && l.len > 0));
        assert_eq!(lexemes.iter().map(|l| l.len).sum::<usize>(), "@é".len());
    }

    #[test]
    fn test_lexing_from_an_offset() {
        let text = "[10, 20]";
        assert_eq!(lex_one(&text[5..]), Lexeme { kind: SyntaxKind::Number, len: 2 });
    }
}
