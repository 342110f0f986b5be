// Chunk: docs/chunks/highlight_query - Capture-pattern query engine

//! Declarative capture queries over parse trees.
//!
//! A [`Query`] is compiled once from S-expression source and then executed
//! against immutable tree snapshots, possibly from several threads at once.
//! Execution walks only the nodes intersecting the requested byte range and
//! turns every capture into a [`Token`] clipped to that range.

mod compile;

use std::cmp::Reverse;
use std::ops::Range;

use crate::error::{QueryError, SyntaxError};
use crate::kind::SyntaxKind;
use crate::token::{Token, TokenKind};
use crate::tree::{Child, Node, ParseTree};

use compile::{ChildPattern, NodeTest, PatternNode};

/// Produces highlight tokens for a range of a tree.
///
/// The scheduler talks to this seam rather than to [`Query`] directly, so
/// hosts and tests can substitute their own token source.
pub trait TokenProvider: Send + Sync {
    fn tokens(&self, tree: &ParseTree, range: Range<usize>) -> Result<Vec<Token>, SyntaxError>;
}

/// A compiled capture query.
#[derive(Debug)]
pub struct Query {
    patterns: Vec<PatternNode>,
    capture_names: Vec<String>,
    capture_kinds: Vec<TokenKind>,
}

/// A capture found during matching: capture index and absolute range.
type Capture = (usize, Range<usize>);

impl Query {
    /// Compiles `source`.
    ///
    /// # Example
    ///
    /// ```
    /// use neon_syntax::{parse, Query, TokenKind};
    ///
    /// let query = Query::new("(number) @value.number").unwrap();
    /// let tree = parse("[1, 22]");
    /// let tokens = query.execute(&tree, 0..tree.len());
    /// assert_eq!(tokens.len(), 2);
    /// assert_eq!(tokens[1].range, 4..6);
    /// assert_eq!(tokens[1].kind, TokenKind::Number);
    /// ```
    pub fn new(source: &str) -> Result<Query, QueryError> {
        let compiled = compile::compile(source)?;
        let capture_kinds = compiled
            .capture_names
            .iter()
            .map(|name| TokenKind::from_capture_name(name))
            .collect();
        Ok(Query {
            patterns: compiled.patterns,
            capture_names: compiled.capture_names,
            capture_kinds,
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    /// Runs the query over the nodes of `tree` that intersect `range`.
    ///
    /// Tokens are sorted by start, then by end (shorter first). When several
    /// patterns capture the same node, the earliest pattern wins. Clipping
    /// can make captures of nested nodes coincide; both are kept, the outer
    /// one first, so that painting in [`paint_order`](crate::paint_order)
    /// leaves the innermost capture on every byte whatever the range.
    /// An empty range yields no tokens.
    pub fn execute(&self, tree: &ParseTree, range: Range<usize>) -> Vec<Token> {
        if range.start >= range.end {
            return Vec::new();
        }

        let mut found: Vec<(usize, usize, usize, TokenKind)> = Vec::new();
        let mut captures: Vec<Capture> = Vec::new();
        let mut cursor = tree.walk();
        'walk: loop {
            let node_range = cursor.range();
            if node_range.start < range.end && node_range.end > range.start {
                let node = cursor.node();
                for (index, pattern) in self.patterns.iter().enumerate() {
                    captures.clear();
                    if !self.match_node(pattern, node, node_range.start, &mut captures) {
                        continue;
                    }
                    for (capture, span) in captures.drain(..) {
                        found.push((span.start, span.end, index, self.capture_kinds[capture]));
                    }
                }
                if cursor.goto_first_child() {
                    continue;
                }
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }

        // Duplicates are node spans captured twice; clip only afterwards
        found.sort_by_key(|(start, end, pattern, _)| (*start, *end, *pattern));
        found.dedup_by(|later, earlier| later.0 == earlier.0 && later.1 == earlier.1);

        let mut clipped: Vec<(Token, usize)> = found
            .into_iter()
            .filter_map(|(start, end, _, kind)| {
                let clip = start.max(range.start)..end.min(range.end);
                (clip.start < clip.end).then(|| (Token::new(clip, kind), end - start))
            })
            .collect();
        clipped.sort_by_key(|(token, width)| (token.range.start, token.range.end, Reverse(*width)));
        clipped.into_iter().map(|(token, _)| token).collect()
    }

    fn match_node(
        &self,
        pattern: &PatternNode,
        node: &Node,
        start: usize,
        captures: &mut Vec<Capture>,
    ) -> bool {
        let mark = captures.len();
        let accepted = match &pattern.test {
            NodeTest::Kind(kind) => node.kind() == *kind,
            NodeTest::Named => node.kind().is_named(),
            NodeTest::Any => node.kind() != SyntaxKind::Whitespace,
            NodeTest::AnyOf(alternatives) => alternatives.iter().any(|alternative| {
                let before = captures.len();
                let matched = self.match_node(alternative, node, start, captures);
                if !matched {
                    captures.truncate(before);
                }
                matched
            }),
        };
        if !accepted {
            captures.truncate(mark);
            return false;
        }

        if !pattern.children.is_empty() {
            let mut starts = Vec::with_capacity(node.children().len());
            let mut offset = start;
            for child in node.children() {
                starts.push(offset);
                offset += child.node.len();
            }
            if !self.match_children(&pattern.children, node.children(), &starts, 0, captures) {
                captures.truncate(mark);
                return false;
            }
        }

        for &capture in &pattern.captures {
            captures.push((capture, start..start + node.len()));
        }
        true
    }

    /// Matches `patterns` against an ordered subsequence of `children`,
    /// starting at `from`, backtracking on failure.
    fn match_children(
        &self,
        patterns: &[ChildPattern],
        children: &[Child],
        starts: &[usize],
        from: usize,
        captures: &mut Vec<Capture>,
    ) -> bool {
        let Some((first, rest)) = patterns.split_first() else {
            return true;
        };
        for index in from..children.len() {
            let child = &children[index];
            if first.field.is_some() && child.field != first.field {
                continue;
            }
            let mark = captures.len();
            if self.match_node(&first.node, &child.node, starts[index], captures)
                && self.match_children(rest, children, starts, index + 1, captures)
            {
                return true;
            }
            captures.truncate(mark);
        }
        false
    }
}

impl TokenProvider for Query {
    fn tokens(&self, tree: &ParseTree, range: Range<usize>) -> Result<Vec<Token>, SyntaxError> {
        if range.start > range.end || range.end > tree.len() {
            return Err(SyntaxError::QueryFailure {
                start: range.start,
                end: range.end,
                message: format!("range is outside the {}-byte tree", tree.len()),
            });
        }
        Ok(self.execute(tree, range))
    }
}
