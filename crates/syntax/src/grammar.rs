// Chunk: docs/chunks/highlight_query - JSON grammar handle with its highlights query

//! The JSON grammar handle.
//!
//! A [`Grammar`] bundles the parser entry points with the compiled
//! highlights query. It is loaded once per session and read-only afterwards;
//! the query is shared with highlight workers through an `Arc`.

use std::sync::Arc;

use log::error;

use crate::error::SyntaxError;
use crate::incremental::IncrementalParser;
use crate::parse;
use crate::query::Query;
use crate::tree::ParseTree;

/// The highlights query shipped with the JSON grammar.
pub const JSON_HIGHLIGHTS: &str = include_str!("../queries/highlights.scm");

/// A loaded grammar: name, highlights source and compiled query.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    query_source: String,
    query: Arc<Query>,
}

impl Grammar {
    /// Loads the JSON grammar with its default highlights query.
    pub fn load() -> Result<Self, SyntaxError> {
        Self::with_query("json", JSON_HIGHLIGHTS)
    }

    /// Loads the JSON grammar with a custom highlights query.
    ///
    /// Fails with [`SyntaxError::GrammarLoadFailure`] when the query does
    /// not compile.
    pub fn with_query(name: &str, query_source: &str) -> Result<Self, SyntaxError> {
        let query = Query::new(query_source).map_err(|source| {
            error!("highlights query for `{}` failed to compile: {}", name, source);
            SyntaxError::GrammarLoadFailure {
                grammar: name.to_string(),
                source,
            }
        })?;
        Ok(Self {
            name: name.to_string(),
            query_source: query_source.to_string(),
            query: Arc::new(query),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query_source(&self) -> &str {
        &self.query_source
    }

    pub fn query(&self) -> &Arc<Query> {
        &self.query
    }

    /// Parses `text` from scratch.
    pub fn parse(&self, text: &str) -> ParseTree {
        parse::parse(text)
    }

    /// Starts an incremental parser over `text`.
    pub fn parser(&self, text: &str) -> IncrementalParser {
        IncrementalParser::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::token::TokenKind;

    #[test]
    fn test_default_query_compiles() {
        let grammar = Grammar::load().unwrap();
        assert_eq!(grammar.name(), "json");
        assert_eq!(grammar.query().pattern_count(), 9);
        assert!(grammar.query_source().contains("@keyword"));
    }

    #[test]
    fn test_default_query_tokens() {
        let grammar = Grammar::load().unwrap();
        let text = "{\"k\": [true, null, 1.5]} // done";
        let tree = grammar.parse(text);
        let tokens = grammar.query().execute(&tree, 0..text.len());
        let kinds: Vec<(&str, TokenKind)> = tokens
            .iter()
            .map(|t| (&text[t.range.clone()], t.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("{", TokenKind::PunctuationBracket),
                ("\"k\"", TokenKind::Keyword),
                (":", TokenKind::PunctuationDelimiter),
                ("[", TokenKind::PunctuationBracket),
                ("true", TokenKind::Bool),
                (",", TokenKind::PunctuationDelimiter),
                ("null", TokenKind::Null),
                (",", TokenKind::PunctuationDelimiter),
                ("1.5", TokenKind::Number),
                ("]", TokenKind::PunctuationBracket),
                ("}", TokenKind::PunctuationBracket),
                ("// done", TokenKind::Comment),
            ]
        );
    }

    #[test]
    fn test_bad_query_fails_to_load() {
        let err = Grammar::with_query("json", "(pair key: (strin) @keyword)").unwrap_err();
        match err {
            SyntaxError::GrammarLoadFailure { grammar, source } => {
                assert_eq!(grammar, "json");
                assert_eq!(
                    source,
                    QueryError::UnknownKind {
                        name: "strin".to_string(),
                        offset: 12
                    }
                );
            }
            other => panic!("expected GrammarLoadFailure, got {other:?}"),
        }
    }
}
