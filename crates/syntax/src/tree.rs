// Chunk: docs/chunks/incremental_parse - Persistent JSON parse tree with subtree reuse

//! Immutable, structurally shared parse trees.
//!
//! Nodes store only their kind, their byte length and their children.
//! Absolute positions are computed while walking, so a subtree positioned
//! after an edit moves without being rebuilt, and a new tree can share every
//! untouched subtree with the previous one through `Arc`.
//!
//! The tree is lossless: its leaves, in order, tile the source exactly,
//! whitespace and comments included.
//!
//! # Navigation
//!
//! Nodes have no parent pointers. [`TreeCursor`] keeps the path from the
//! root on its own stack, which gives parent, child and sibling navigation
//! over a shared tree.

use std::ops::Range;
use std::sync::Arc;

use crate::kind::{Field, SyntaxKind};

/// A node of the parse tree.
///
/// Equality is structural: two nodes are equal when their kinds, lengths,
/// flags and children are equal, regardless of where they are allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: SyntaxKind,
    len: usize,
    children: Vec<Child>,
    has_error: bool,
    damaged: bool,
}

/// A child slot: the child node and the field it fills in its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub field: Option<Field>,
    pub node: Arc<Node>,
}

impl Node {
    /// Creates a token leaf. `Error` leaves carry the error flag.
    pub(crate) fn leaf(kind: SyntaxKind, len: usize) -> Node {
        Node {
            kind,
            len,
            children: Vec::new(),
            has_error: kind == SyntaxKind::Error,
            damaged: false,
        }
    }

    /// Creates an interior node. Length and error flag are derived from the
    /// children, plus `error` for problems found between them.
    pub(crate) fn branch(kind: SyntaxKind, children: Vec<Child>, error: bool) -> Node {
        let len = children.iter().map(|c| c.node.len).sum();
        let has_error =
            error || kind == SyntaxKind::Error || children.iter().any(|c| c.node.has_error);
        Node {
            kind,
            len,
            children,
            has_error,
            damaged: false,
        }
    }

    /// A copy of this node that an edit touched, with its new length.
    pub(crate) fn damaged_copy(&self, len: usize, children: Vec<Child>) -> Node {
        Node {
            kind: self.kind,
            len,
            children,
            has_error: self.has_error,
            damaged: true,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if this node or any descendant is an error or contains a syntax
    /// problem.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// True if an edit touched this node since it was parsed.
    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    /// True if a re-parse may take this subtree over unchanged.
    pub(crate) fn is_reusable(&self) -> bool {
        !self.damaged && !self.has_error
    }

    /// The rightmost leaf under this node (the node itself for a leaf).
    pub fn last_leaf(&self) -> &Node {
        let mut node = self;
        while let Some(last) = node.children.last() {
            node = &last.node;
        }
        node
    }

    /// Returns the first child filling `field`.
    pub fn child_by_field(&self, field: Field) -> Option<&Arc<Node>> {
        self.children
            .iter()
            .find(|c| c.field == Some(field))
            .map(|c| &c.node)
    }
}

/// A leaf span of the tree, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
}

/// An immutable snapshot of a parsed document.
///
/// Cloning the `Arc` around a tree is how snapshots are handed to query
/// workers; the tree itself is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    root: Arc<Node>,
}

impl ParseTree {
    pub(crate) fn new(root: Arc<Node>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Length of the parsed text in bytes.
    pub fn len(&self) -> usize {
        self.root.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.len == 0
    }

    pub fn has_error(&self) -> bool {
        self.root.has_error
    }

    /// Returns a cursor positioned on the root.
    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(&self.root)
    }

    /// Returns every leaf in document order.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        let mut cursor = self.walk();
        loop {
            if cursor.node().is_leaf() {
                // An empty document is a childless root, not a leaf span
                if cursor.depth() == 0 {
                    return leaves;
                }
                leaves.push(Leaf {
                    kind: cursor.node().kind,
                    range: cursor.range(),
                });
            } else if cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    return leaves;
                }
            }
        }
    }

    /// Rebuilds the text by concatenating the leaf spans of `source`.
    ///
    /// Equals `source` whenever the tree was parsed from it.
    pub fn reconstruct(&self, source: &str) -> String {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| source.get(leaf.range))
            .collect()
    }

    /// Renders the named structure as an S-expression, with field labels,
    /// e.g. `(document (object (pair key: (string) value: (number))))`.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        write_sexp(&self.root, None, &mut out);
        out
    }
}

fn write_sexp(node: &Node, field: Option<Field>, out: &mut String) {
    if !out.is_empty() {
        out.push(' ');
    }
    if let Some(field) = field {
        out.push_str(field.name());
        out.push_str(": ");
    }
    out.push('(');
    out.push_str(node.kind.name());
    for child in &node.children {
        if child.node.kind.is_named() && !child.node.kind.is_trivia() {
            write_sexp(&child.node, child.field, out);
        }
    }
    out.push(')');
}

struct CursorFrame<'t> {
    node: &'t Node,
    start: usize,
    field: Option<Field>,
    /// Index of this node in its parent's children.
    index: usize,
}

/// A cursor over a [`ParseTree`] that tracks the path from the root.
pub struct TreeCursor<'t> {
    stack: Vec<CursorFrame<'t>>,
}

impl<'t> TreeCursor<'t> {
    fn new(root: &'t Node) -> Self {
        Self {
            stack: vec![CursorFrame {
                node: root,
                start: 0,
                field: None,
                index: 0,
            }],
        }
    }

    fn top(&self) -> &CursorFrame<'t> {
        // The root frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    pub fn node(&self) -> &'t Node {
        self.top().node
    }

    /// Absolute start of the current node.
    pub fn start(&self) -> usize {
        self.top().start
    }

    /// Absolute byte range of the current node.
    pub fn range(&self) -> Range<usize> {
        let frame = self.top();
        frame.start..frame.start + frame.node.len
    }

    /// The field the current node fills in its parent.
    pub fn field(&self) -> Option<Field> {
        self.top().field
    }

    /// Number of ancestors of the current node.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Kind of the current node's parent, if any.
    pub fn parent_kind(&self) -> Option<SyntaxKind> {
        self.stack
            .len()
            .checked_sub(2)
            .map(|i| self.stack[i].node.kind)
    }

    pub fn goto_first_child(&mut self) -> bool {
        let frame = self.top();
        match frame.node.children.first() {
            Some(child) => {
                let next = CursorFrame {
                    node: &child.node,
                    start: frame.start,
                    field: child.field,
                    index: 0,
                };
                self.stack.push(next);
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        let current = self.top();
        let parent = self.stack[self.stack.len() - 2].node;
        let index = current.index + 1;
        match parent.children.get(index) {
            Some(child) => {
                let next = CursorFrame {
                    node: &child.node,
                    start: current.start + current.node.len,
                    field: child.field,
                    index,
                };
                let last = self.stack.len() - 1;
                self.stack[last] = next;
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        self.stack.pop();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: SyntaxKind, len: usize) -> Child {
        Child {
            field: None,
            node: Arc::new(Node::leaf(kind, len)),
        }
    }

    /// `[1, x]` built by hand.
    fn sample() -> ParseTree {
        let array = Node::branch(
            SyntaxKind::Array,
            vec![
                leaf(SyntaxKind::LBracket, 1),
                leaf(SyntaxKind::Number, 1),
                leaf(SyntaxKind::Comma, 1),
                leaf(SyntaxKind::Whitespace, 1),
                leaf(SyntaxKind::Error, 1),
                leaf(SyntaxKind::RBracket, 1),
            ],
            false,
        );
        let root = Node::branch(
            SyntaxKind::Document,
            vec![Child {
                field: None,
                node: Arc::new(array),
            }],
            false,
        );
        ParseTree::new(Arc::new(root))
    }

    #[test]
    fn test_branch_derives_len_and_error() {
        let tree = sample();
        assert_eq!(tree.len(), 6);
        assert!(tree.has_error());
        assert!(!tree.root().is_damaged());
    }

    #[test]
    fn test_leaves_tile_the_text() {
        let tree = sample();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 6);
        assert_eq!(leaves[0].range, 0..1);
        assert_eq!(leaves[4], Leaf { kind: SyntaxKind::Error, range: 4..5 });
        assert_eq!(tree.reconstruct("[1, x]"), "[1, x]");
    }

    #[test]
    fn test_cursor_navigation() {
        let tree = sample();
        let mut cursor = tree.walk();
        assert_eq!(cursor.node().kind(), SyntaxKind::Document);
        assert_eq!(cursor.parent_kind(), None);
        assert!(!cursor.goto_next_sibling());

        assert!(cursor.goto_first_child());
        assert_eq!(cursor.node().kind(), SyntaxKind::Array);
        assert!(cursor.goto_first_child());
        assert!(cursor.goto_next_sibling());
        assert_eq!(cursor.node().kind(), SyntaxKind::Number);
        assert_eq!(cursor.range(), 1..2);
        assert_eq!(cursor.depth(), 2);
        assert_eq!(cursor.parent_kind(), Some(SyntaxKind::Array));

        assert!(cursor.goto_parent());
        assert_eq!(cursor.range(), 0..6);
        assert!(cursor.goto_parent());
        assert!(!cursor.goto_parent());
    }

    #[test]
    fn test_last_leaf() {
        let tree = sample();
        assert_eq!(tree.root().last_leaf().kind(), SyntaxKind::RBracket);
    }

    #[test]
    fn test_sexp_skips_anonymous_nodes() {
        assert_eq!(sample().to_sexp(), "(document (array (number) (ERROR)))");
    }

    #[test]
    fn test_structural_equality_ignores_allocation() {
        assert_eq!(sample(), sample());
        assert!(!Arc::ptr_eq(sample().root(), sample().root()));
    }
}
