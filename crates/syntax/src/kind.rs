// Chunk: docs/chunks/incremental_parse - Persistent JSON parse tree with subtree reuse

//! Node and token kinds of the JSON grammar.

/// The kind of a parse-tree node or lexed token.
///
/// Named kinds (`document`, `object`, `string`, ...) can be referred to by
/// name in queries. Punctuation kinds are anonymous and are matched by their
/// literal text (`"{"`, `","`). Whitespace is never visible to queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Document,
    Object,
    Pair,
    Array,
    String,
    Number,
    True,
    False,
    Null,
    Comment,
    Error,

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,

    Whitespace,
    /// End of input. Produced by the lexer, never stored in a tree.
    Eof,
}

impl SyntaxKind {
    /// The name a query uses for this kind: the node name for named kinds,
    /// the literal text for punctuation.
    pub fn name(self) -> &'static str {
        match self {
            SyntaxKind::Document => "document",
            SyntaxKind::Object => "object",
            SyntaxKind::Pair => "pair",
            SyntaxKind::Array => "array",
            SyntaxKind::String => "string",
            SyntaxKind::Number => "number",
            SyntaxKind::True => "true",
            SyntaxKind::False => "false",
            SyntaxKind::Null => "null",
            SyntaxKind::Comment => "comment",
            SyntaxKind::Error => "ERROR",
            SyntaxKind::LBrace => "{",
            SyntaxKind::RBrace => "}",
            SyntaxKind::LBracket => "[",
            SyntaxKind::RBracket => "]",
            SyntaxKind::Comma => ",",
            SyntaxKind::Colon => ":",
            SyntaxKind::Whitespace => "whitespace",
            SyntaxKind::Eof => "end of input",
        }
    }

    /// Looks up a named kind by its query name.
    pub fn from_name(name: &str) -> Option<SyntaxKind> {
        let kind = match name {
            "document" => SyntaxKind::Document,
            "object" => SyntaxKind::Object,
            "pair" => SyntaxKind::Pair,
            "array" => SyntaxKind::Array,
            "string" => SyntaxKind::String,
            "number" => SyntaxKind::Number,
            "true" => SyntaxKind::True,
            "false" => SyntaxKind::False,
            "null" => SyntaxKind::Null,
            "comment" => SyntaxKind::Comment,
            "ERROR" => SyntaxKind::Error,
            _ => return None,
        };
        Some(kind)
    }

    /// Looks up an anonymous punctuation kind by its literal text.
    pub fn from_literal(literal: &str) -> Option<SyntaxKind> {
        let kind = match literal {
            "{" => SyntaxKind::LBrace,
            "}" => SyntaxKind::RBrace,
            "[" => SyntaxKind::LBracket,
            "]" => SyntaxKind::RBracket,
            "," => SyntaxKind::Comma,
            ":" => SyntaxKind::Colon,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_named(self) -> bool {
        matches!(
            self,
            SyntaxKind::Document
                | SyntaxKind::Object
                | SyntaxKind::Pair
                | SyntaxKind::Array
                | SyntaxKind::String
                | SyntaxKind::Number
                | SyntaxKind::True
                | SyntaxKind::False
                | SyntaxKind::Null
                | SyntaxKind::Comment
                | SyntaxKind::Error
        )
    }

    /// Whitespace and comments, which the grammar skips between tokens.
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::Whitespace | SyntaxKind::Comment)
    }

    /// True for tokens that begin a JSON value.
    pub fn starts_value(self) -> bool {
        matches!(
            self,
            SyntaxKind::LBrace
                | SyntaxKind::LBracket
                | SyntaxKind::String
                | SyntaxKind::Number
                | SyntaxKind::True
                | SyntaxKind::False
                | SyntaxKind::Null
        )
    }

    /// True for node kinds that represent a complete JSON value.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            SyntaxKind::Object
                | SyntaxKind::Array
                | SyntaxKind::String
                | SyntaxKind::Number
                | SyntaxKind::True
                | SyntaxKind::False
                | SyntaxKind::Null
        )
    }
}

/// The role a child plays in its parent, when the grammar names one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Key,
    Value,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Key => "key",
            Field::Value => "value",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        match name {
            "key" => Some(Field::Key),
            "value" => Some(Field::Value),
            _ => None,
        }
    }
}
