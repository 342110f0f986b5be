// Chunk: docs/chunks/incremental_parse - Persistent JSON parse tree with subtree reuse

//! Recursive-descent JSON grammar with error recovery and subtree reuse.
//!
//! The grammar never fails: stray tokens are wrapped in `ERROR` nodes and
//! missing punctuation marks the enclosing node as erroneous, so every input
//! produces a lossless tree.
//!
//! When a previous tree is available, a [`ReuseCursor`] walks it in step with
//! the parser. Whenever the parser is about to build a value, a pair or a
//! token at position `pos`, it first asks the cursor for an undamaged,
//! error-free old subtree of an acceptable kind that starts exactly at `pos`
//! and takes it over as is.
//!
//! # Grammar
//!
//! ```text
//! document := (trivia | value | stray)*
//! value    := object | array | STRING | NUMBER | TRUE | FALSE | NULL
//! object   := "{" (trivia | pair | "," | stray)* "}"
//! pair     := key:STRING trivia ":" trivia value:value
//! array    := "[" (trivia | value | "," | stray)* "]"
//! ```
//!
//! Separator problems (missing or doubled commas, missing colons and values)
//! set the error flag on the node that contains them.

use std::ops::Range;
use std::sync::Arc;

use crate::kind::{Field, SyntaxKind};
use crate::lexer::{lex_one, Lexeme};
use crate::tree::{Child, Node, ParseTree};

// =============================================================================
// Reuse cursor
// =============================================================================

/// A subtree handed back by the reuse cursor, with the context it had in the
/// old tree.
pub(crate) struct Reused {
    pub node: Arc<Node>,
    pub parent_kind: SyntaxKind,
    pub field: Option<Field>,
}

struct ReuseFrame<'t> {
    children: &'t [Child],
    index: usize,
    /// Start of `children[index]` in new-document coordinates.
    offset: usize,
    parent_kind: SyntaxKind,
}

/// Walks an edited tree in document order, offering reusable subtrees.
///
/// The cursor only ever moves forward. Positions are computed from the
/// edited lengths, so they are already in new-document coordinates.
pub(crate) struct ReuseCursor<'t> {
    stack: Vec<ReuseFrame<'t>>,
}

impl<'t> ReuseCursor<'t> {
    pub fn new(root: &'t Node) -> Self {
        Self {
            stack: vec![ReuseFrame {
                children: root.children(),
                index: 0,
                offset: 0,
                parent_kind: root.kind(),
            }],
        }
    }

    /// Returns the outermost reusable subtree starting at `pos` that
    /// `accept` agrees to take.
    ///
    /// Subtrees that end at or before `pos` are skipped for good. A reusable
    /// leaf at `pos` that `accept` rejects is kept, so a narrower request at
    /// the same position (the first token of a value, say) can still take it.
    pub fn reusable_at(
        &mut self,
        pos: usize,
        mut accept: impl FnMut(&Node) -> bool,
    ) -> Option<Reused> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(child) = frame.children.get(frame.index) else {
                self.stack.pop();
                continue;
            };
            let node: &'t Node = &child.node;
            let start = frame.offset;
            let end = start + node.len();

            if start > pos {
                return None;
            }
            if end <= pos && (start < pos || node.is_empty()) {
                frame.index += 1;
                frame.offset = end;
                continue;
            }
            if start == pos && node.is_reusable() && accept(node) {
                frame.index += 1;
                frame.offset = end;
                return Some(Reused {
                    node: Arc::clone(&child.node),
                    parent_kind: frame.parent_kind,
                    field: child.field,
                });
            }
            if node.is_leaf() {
                if start == pos && node.is_reusable() {
                    return None;
                }
                frame.index += 1;
                frame.offset = end;
                continue;
            }

            frame.index += 1;
            frame.offset = end;
            self.stack.push(ReuseFrame {
                children: node.children(),
                index: 0,
                offset: start,
                parent_kind: node.kind(),
            });
        }
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Builder {
    kind: SyntaxKind,
    children: Vec<Child>,
    error: bool,
}

impl Builder {
    fn new(kind: SyntaxKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            error: false,
        }
    }

    fn push(&mut self, field: Option<Field>, node: Arc<Node>) {
        self.children.push(Child { field, node });
    }

    fn finish(self) -> Arc<Node> {
        Arc::new(Node::branch(self.kind, self.children, self.error))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Open,
    Member,
    Comma,
}

/// One parse of a text, optionally reusing subtrees of an edited tree.
pub(crate) struct Parser<'s, 't> {
    text: &'s str,
    pos: usize,
    peeked: Option<(usize, Lexeme)>,
    cursor: Option<ReuseCursor<'t>>,
    changed: Vec<Range<usize>>,
    reused: usize,
}

impl<'s, 't> Parser<'s, 't> {
    pub fn new(text: &'s str, old: Option<&'t Node>) -> Self {
        Self {
            text,
            pos: 0,
            peeked: None,
            cursor: old.map(ReuseCursor::new),
            changed: Vec::new(),
            reused: 0,
        }
    }

    /// Parses the whole text.
    pub fn parse(mut self) -> ParseOutput {
        let mut doc = Builder::new(SyntaxKind::Document);
        loop {
            self.trivia(&mut doc);
            let lexeme = self.peek();
            match lexeme.kind {
                SyntaxKind::Eof => break,
                kind if kind.starts_value() => {
                    let value = self.parse_value(SyntaxKind::Document, None);
                    doc.push(None, value);
                }
                _ => {
                    let stray = self.parse_stray(SyntaxKind::Document);
                    doc.push(None, stray);
                }
            }
        }
        ParseOutput {
            tree: ParseTree::new(doc.finish()),
            changed: self.changed,
            reused: self.reused,
        }
    }

    fn peek(&mut self) -> Lexeme {
        match self.peeked {
            Some((pos, lexeme)) if pos == self.pos => lexeme,
            _ => {
                let lexeme = lex_one(&self.text[self.pos..]);
                self.peeked = Some((self.pos, lexeme));
                lexeme
            }
        }
    }

    /// Takes a subtree from the old tree if one is acceptable at the current
    /// position. Records it as changed when its syntactic context differs.
    fn reuse(
        &mut self,
        parent: SyntaxKind,
        field: Option<Field>,
        accept: impl FnMut(&Node) -> bool,
    ) -> Option<Arc<Node>> {
        let cursor = self.cursor.as_mut()?;
        let reused = cursor.reusable_at(self.pos, accept)?;
        let range = self.pos..self.pos + reused.node.len();
        if reused.parent_kind != parent || reused.field != field {
            self.changed.push(range.clone());
        }
        self.pos = range.end;
        self.reused += 1;
        Some(reused.node)
    }

    /// Reuse for values and pairs. The subtree's text is unchanged, but its
    /// last token could now lex longer (`1` followed by a new `.5`), so that
    /// token is re-lexed before the subtree is accepted.
    fn reuse_subtree(
        &mut self,
        parent: SyntaxKind,
        field: Option<Field>,
        kind_ok: fn(SyntaxKind) -> bool,
    ) -> Option<Arc<Node>> {
        let text = self.text;
        let pos = self.pos;
        self.reuse(parent, field, |node| {
            kind_ok(node.kind()) && ends_stably(text, pos, node)
        })
    }

    /// Appends the token at the current position, reusing the old leaf when
    /// it lexes identically.
    fn bump(&mut self, builder: &mut Builder, field: Option<Field>) {
        let lexeme = self.peek();
        let leaf = self.token(lexeme, builder.kind, field);
        builder.push(field, leaf);
    }

    fn token(&mut self, lexeme: Lexeme, parent: SyntaxKind, field: Option<Field>) -> Arc<Node> {
        let reused = self.reuse(parent, field, |node| {
            node.is_leaf() && node.kind() == lexeme.kind && node.len() == lexeme.len
        });
        if let Some(node) = reused {
            return node;
        }
        let start = self.pos;
        self.pos += lexeme.len;
        self.changed.push(start..self.pos);
        Arc::new(Node::leaf(lexeme.kind, lexeme.len))
    }

    fn trivia(&mut self, builder: &mut Builder) {
        while self.peek().kind.is_trivia() {
            self.bump(builder, None);
        }
    }

    fn parse_value(&mut self, parent: SyntaxKind, field: Option<Field>) -> Arc<Node> {
        if let Some(node) = self.reuse_subtree(parent, field, SyntaxKind::is_value) {
            return node;
        }
        let lexeme = self.peek();
        match lexeme.kind {
            SyntaxKind::LBrace => self.parse_object(),
            SyntaxKind::LBracket => self.parse_array(),
            _ => self.token(lexeme, parent, field),
        }
    }

    fn parse_object(&mut self) -> Arc<Node> {
        let mut object = Builder::new(SyntaxKind::Object);
        self.bump(&mut object, None);
        let mut last = Last::Open;
        loop {
            self.trivia(&mut object);
            match self.peek().kind {
                SyntaxKind::RBrace => {
                    object.error |= last == Last::Comma;
                    self.bump(&mut object, None);
                    return object.finish();
                }
                SyntaxKind::Eof => {
                    object.error = true;
                    return object.finish();
                }
                SyntaxKind::String => {
                    object.error |= last == Last::Member;
                    let pair = self.parse_pair();
                    object.push(None, pair);
                    last = Last::Member;
                }
                SyntaxKind::Comma => {
                    object.error |= last != Last::Member;
                    self.bump(&mut object, None);
                    last = Last::Comma;
                }
                _ => {
                    let stray = self.parse_stray(SyntaxKind::Object);
                    object.push(None, stray);
                }
            }
        }
    }

    fn parse_pair(&mut self) -> Arc<Node> {
        let is_pair = |kind: SyntaxKind| kind == SyntaxKind::Pair;
        if let Some(node) = self.reuse_subtree(SyntaxKind::Object, None, is_pair) {
            return node;
        }
        let mut pair = Builder::new(SyntaxKind::Pair);
        self.bump(&mut pair, Some(Field::Key));
        self.trivia(&mut pair);
        if self.peek().kind != SyntaxKind::Colon {
            pair.error = true;
            return pair.finish();
        }
        self.bump(&mut pair, None);
        self.trivia(&mut pair);
        if self.peek().kind.starts_value() {
            let value = self.parse_value(SyntaxKind::Pair, Some(Field::Value));
            pair.push(Some(Field::Value), value);
        } else {
            pair.error = true;
        }
        pair.finish()
    }

    fn parse_array(&mut self) -> Arc<Node> {
        let mut array = Builder::new(SyntaxKind::Array);
        self.bump(&mut array, None);
        let mut last = Last::Open;
        loop {
            self.trivia(&mut array);
            match self.peek().kind {
                SyntaxKind::RBracket => {
                    array.error |= last == Last::Comma;
                    self.bump(&mut array, None);
                    return array.finish();
                }
                SyntaxKind::Eof => {
                    array.error = true;
                    return array.finish();
                }
                SyntaxKind::Comma => {
                    array.error |= last != Last::Member;
                    self.bump(&mut array, None);
                    last = Last::Comma;
                }
                kind if kind.starts_value() => {
                    array.error |= last == Last::Member;
                    let value = self.parse_value(SyntaxKind::Array, None);
                    array.push(None, value);
                    last = Last::Member;
                }
                _ => {
                    let stray = self.parse_stray(SyntaxKind::Array);
                    array.push(None, stray);
                }
            }
        }
    }

    /// Wraps a token (or value) that does not fit the grammar here in an
    /// `ERROR` node. Error tokens are already error nodes and stay leaves.
    ///
    /// The whole span of a new `ERROR` branch is reported as changed: it
    /// styles bytes of reused descendants whose own parent did not change.
    fn parse_stray(&mut self, parent: SyntaxKind) -> Arc<Node> {
        let lexeme = self.peek();
        if lexeme.kind == SyntaxKind::Error {
            return self.token(lexeme, parent, None);
        }
        let start = self.pos;
        let mut error = Builder::new(SyntaxKind::Error);
        if lexeme.kind.starts_value() {
            let value = self.parse_value(SyntaxKind::Error, None);
            error.push(None, value);
        } else {
            self.bump(&mut error, None);
        }
        self.changed.push(start..self.pos);
        error.finish()
    }
}

/// True when the last token of `node`, placed at `pos`, still lexes to the
/// same kind and length in `text`.
fn ends_stably(text: &str, pos: usize, node: &Node) -> bool {
    let last = node.last_leaf();
    let last_start = pos + node.len() - last.len();
    match text.get(last_start..) {
        Some(rest) => {
            let lexeme = lex_one(rest);
            lexeme.kind == last.kind() && lexeme.len == last.len()
        }
        None => false,
    }
}

/// The result of one parse.
pub(crate) struct ParseOutput {
    pub tree: ParseTree,
    /// Ranges of freshly lexed tokens, of new `ERROR` branches and of reused
    /// subtrees whose context changed, in new-document coordinates.
    pub changed: Vec<Range<usize>>,
    /// Number of subtrees (including leaves) taken over from the old tree.
    pub reused: usize,
}

/// Parses `text` from scratch.
pub fn parse(text: &str) -> ParseTree {
    Parser::new(text, None).parse().tree
}
