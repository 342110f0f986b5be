// Chunk: docs/chunks/highlight_query - Capture-pattern query engine

//! Compiler for the S-expression query language.
//!
//! Supported forms:
//!
//! ```text
//! (kind child*)        named node, children matched as an ordered subsequence
//! (_)                  any named node
//! _                    any node
//! "{"                  anonymous token by literal
//! [pattern+]           alternation
//! field: pattern       child constrained to a field
//! pattern @capture     capture
//! ; comment
//! ```
//!
//! Quantifiers, anchors, negated fields and predicates are rejected with
//! [`QueryError::Unsupported`].

use logos::Logos;

use crate::error::QueryError;
use crate::kind::{Field, SyntaxKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum QueryToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r";[^\n]*")]
    Comment,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Capture,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    Str,

    #[regex(r"[*+?]")]
    Quantifier,

    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_\-]*[?!]?")]
    Predicate,

    #[token(".")]
    Anchor,

    #[token("!")]
    Negation,
}

/// What a pattern node accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeTest {
    Kind(SyntaxKind),
    /// `(_)`: any named node.
    Named,
    /// `_`: any node.
    Any,
    /// `[...]`: any of the alternatives.
    AnyOf(Vec<PatternNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternNode {
    pub test: NodeTest,
    pub children: Vec<ChildPattern>,
    /// Indices into the query's capture names.
    pub captures: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChildPattern {
    pub field: Option<Field>,
    pub node: PatternNode,
}

/// The compiled form of a query source.
#[derive(Debug, Default)]
pub(crate) struct Compiled {
    pub patterns: Vec<PatternNode>,
    pub capture_names: Vec<String>,
}

struct Lexed<'a> {
    token: QueryToken,
    text: &'a str,
    offset: usize,
}

struct Compiler<'a> {
    tokens: Vec<Lexed<'a>>,
    next: usize,
    end: usize,
    capture_names: Vec<String>,
}

/// Compiles a query source.
pub(crate) fn compile(source: &str) -> Result<Compiled, QueryError> {
    let mut tokens = Vec::new();
    let mut lexer = QueryToken::lexer(source);
    while let Some(result) = lexer.next() {
        let offset = lexer.span().start;
        match result {
            Ok(QueryToken::Whitespace | QueryToken::Comment) => {}
            Ok(token) => tokens.push(Lexed {
                token,
                text: lexer.slice(),
                offset,
            }),
            Err(()) => {
                return Err(QueryError::UnexpectedToken {
                    found: lexer.slice().to_string(),
                    offset,
                })
            }
        }
    }

    let mut compiler = Compiler {
        tokens,
        next: 0,
        end: source.len(),
        capture_names: Vec::new(),
    };
    let mut patterns = Vec::new();
    while compiler.peek().is_some() {
        patterns.push(compiler.pattern()?);
    }
    Ok(Compiled {
        patterns,
        capture_names: compiler.capture_names,
    })
}

impl<'a> Compiler<'a> {
    fn peek(&self) -> Option<&Lexed<'a>> {
        self.tokens.get(self.next)
    }

    fn peek_token(&self, ahead: usize) -> Option<QueryToken> {
        self.tokens.get(self.next + ahead).map(|t| t.token)
    }

    fn bump(&mut self) -> Result<&Lexed<'a>, QueryError> {
        let end = self.end;
        let lexed = self
            .tokens
            .get(self.next)
            .ok_or(QueryError::UnexpectedEof { offset: end })?;
        self.next += 1;
        Ok(lexed)
    }

    fn pattern(&mut self) -> Result<PatternNode, QueryError> {
        let lexed = self.bump()?;
        let (token, text, offset) = (lexed.token, lexed.text, lexed.offset);
        let mut node = match token {
            QueryToken::LParen => self.node_pattern()?,
            QueryToken::LBracket => self.alternation(offset)?,
            QueryToken::Str => {
                let literal = unescape(&text[1..text.len() - 1]);
                match SyntaxKind::from_literal(&literal) {
                    Some(kind) => leaf_pattern(NodeTest::Kind(kind)),
                    None => return Err(QueryError::UnknownLiteral { literal, offset }),
                }
            }
            QueryToken::Ident if text == "_" => leaf_pattern(NodeTest::Any),
            _ => return Err(unexpected(token, text, offset)),
        };

        while let Some(lexed) = self.peek() {
            match lexed.token {
                QueryToken::Capture => {
                    let name = lexed.text[1..].to_string();
                    self.next += 1;
                    node.captures.push(self.intern(name));
                }
                QueryToken::Quantifier => {
                    return Err(QueryError::Unsupported {
                        feature: "quantifier",
                        offset: lexed.offset,
                    })
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// Parses the rest of `(kind child*)` after the opening parenthesis.
    fn node_pattern(&mut self) -> Result<PatternNode, QueryError> {
        let lexed = self.bump()?;
        let (token, text, offset) = (lexed.token, lexed.text, lexed.offset);
        let test = match token {
            QueryToken::Ident if text == "_" => NodeTest::Named,
            QueryToken::Ident => match SyntaxKind::from_name(text) {
                Some(kind) => NodeTest::Kind(kind),
                None => {
                    return Err(QueryError::UnknownKind {
                        name: text.to_string(),
                        offset,
                    })
                }
            },
            QueryToken::Predicate => {
                return Err(QueryError::Unsupported {
                    feature: "predicate",
                    offset,
                })
            }
            _ => return Err(unexpected(token, text, offset)),
        };

        let mut children = Vec::new();
        loop {
            let Some(lexed) = self.peek() else {
                return Err(QueryError::UnexpectedEof { offset: self.end });
            };
            let (token, text, offset) = (lexed.token, lexed.text, lexed.offset);
            match token {
                QueryToken::RParen => {
                    self.next += 1;
                    break;
                }
                QueryToken::Anchor => {
                    return Err(QueryError::Unsupported {
                        feature: "anchor",
                        offset,
                    })
                }
                QueryToken::Negation => {
                    return Err(QueryError::Unsupported {
                        feature: "negated field",
                        offset,
                    })
                }
                QueryToken::Ident if self.peek_token(1) == Some(QueryToken::Colon) => {
                    let field = Field::from_name(text).ok_or_else(|| QueryError::UnknownField {
                        name: text.to_string(),
                        offset,
                    })?;
                    self.next += 2;
                    let node = self.pattern()?;
                    children.push(ChildPattern {
                        field: Some(field),
                        node,
                    });
                }
                _ => {
                    let node = self.pattern()?;
                    children.push(ChildPattern { field: None, node });
                }
            }
        }

        Ok(PatternNode {
            test,
            children,
            captures: Vec::new(),
        })
    }

    /// Parses the rest of `[pattern+]` after the opening bracket.
    fn alternation(&mut self, open_offset: usize) -> Result<PatternNode, QueryError> {
        let mut alternatives = Vec::new();
        loop {
            match self.peek_token(0) {
                Some(QueryToken::RBracket) => {
                    self.next += 1;
                    break;
                }
                Some(_) => alternatives.push(self.pattern()?),
                None => return Err(QueryError::UnexpectedEof { offset: self.end }),
            }
        }
        if alternatives.is_empty() {
            return Err(QueryError::UnexpectedToken {
                found: "]".to_string(),
                offset: open_offset + 1,
            });
        }
        Ok(leaf_pattern(NodeTest::AnyOf(alternatives)))
    }

    fn intern(&mut self, name: String) -> usize {
        match self.capture_names.iter().position(|n| *n == name) {
            Some(index) => index,
            None => {
                self.capture_names.push(name);
                self.capture_names.len() - 1
            }
        }
    }
}

fn leaf_pattern(test: NodeTest) -> PatternNode {
    PatternNode {
        test,
        children: Vec::new(),
        captures: Vec::new(),
    }
}

fn unexpected(token: QueryToken, text: &str, offset: usize) -> QueryError {
    match token {
        QueryToken::Quantifier => QueryError::Unsupported {
            feature: "quantifier",
            offset,
        },
        QueryToken::Predicate => QueryError::Unsupported {
            feature: "predicate",
            offset,
        },
        _ => QueryError::UnexpectedToken {
            found: text.to_string(),
            offset,
        },
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            },
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_named_pattern_with_field() {
        let compiled = compile("(pair key: (string) @keyword)").unwrap();
        assert_eq!(compiled.patterns.len(), 1);
        assert_eq!(compiled.capture_names, vec!["keyword".to_string()]);

        let pair = &compiled.patterns[0];
        assert_eq!(pair.test, NodeTest::Kind(SyntaxKind::Pair));
        assert!(pair.captures.is_empty());
        assert_eq!(pair.children.len(), 1);
        assert_eq!(pair.children[0].field, Some(Field::Key));
        assert_eq!(pair.children[0].node.test, NodeTest::Kind(SyntaxKind::String));
        assert_eq!(pair.children[0].node.captures, vec![0]);
    }

    #[test]
    fn test_compile_alternation_of_literals() {
        let compiled = compile("[\"{\" \"}\"] @punctuation.bracket").unwrap();
        let pattern = &compiled.patterns[0];
        let NodeTest::AnyOf(alternatives) = &pattern.test else {
            panic!("expected an alternation, got {:?}", pattern.test);
        };
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[1].test, NodeTest::Kind(SyntaxKind::RBrace));
        assert_eq!(pattern.captures, vec![0]);
    }

    #[test]
    fn test_capture_names_are_interned() {
        let compiled = compile("(true) @value.bool ; both\n(false) @value.bool").unwrap();
        assert_eq!(compiled.patterns.len(), 2);
        assert_eq!(compiled.capture_names.len(), 1);
    }

    #[test]
    fn test_wildcards() {
        let compiled = compile("(_) @any_named (array _ @element)").unwrap();
        assert_eq!(compiled.patterns[0].test, NodeTest::Named);
        assert_eq!(compiled.patterns[1].children[0].node.test, NodeTest::Any);
    }

    #[test]
    fn test_errors_carry_offsets() {
        assert_eq!(
            compile("(strin) @x").unwrap_err(),
            QueryError::UnknownKind {
                name: "strin".to_string(),
                offset: 1
            }
        );
        assert_eq!(
            compile("(pair name: (string))").unwrap_err(),
            QueryError::UnknownField {
                name: "name".to_string(),
                offset: 6
            }
        );
        assert_eq!(
            compile("\"=\" @op").unwrap_err(),
            QueryError::UnknownLiteral {
                literal: "=".to_string(),
                offset: 0
            }
        );
        assert_eq!(
            compile("(array").unwrap_err(),
            QueryError::UnexpectedEof { offset: 6 }
        );
        assert_eq!(compile("[] @x").unwrap_err().offset(), 1);
    }

    #[test]
    fn test_unsupported_features() {
        for (source, feature) in [
            ("(array (number)* @n)", "quantifier"),
            ("(string) @s (#eq? @s \"x\")", "predicate"),
            ("(array . (number) @first)", "anchor"),
            ("(pair !value) @p", "negated field"),
        ] {
            match compile(source) {
                Err(QueryError::Unsupported { feature: found, .. }) => assert_eq!(found, feature, "{source}"),
                other => panic!("{source}: expected unsupported {feature}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"\"q\""#), "\"q\"");
        assert_eq!(unescape(r"a\\b"), "a\\b");
    }
}
