// Chunk: docs/chunks/incremental_parse - Persistent JSON parse tree with subtree reuse

//! Incremental re-parsing.
//!
//! [`IncrementalParser`] keeps the last parse tree and folds edits into it
//! as they arrive. Each edit produces an *edited* tree by path copying: every
//! node whose closed byte range touches the edit is replaced by a damaged
//! copy with an adjusted length, ancestors included, while every other node
//! is shared with the previous tree. Nodes after the edit shift for free
//! because positions are relative.
//!
//! The next [`current_tree`](IncrementalParser::current_tree) call re-parses
//! the text with a reuse cursor over the edited tree, so only the damaged
//! region is lexed and built again.

use std::ops::Range;
use std::sync::Arc;

use log::{debug, warn};
use neon_buffer::{Edit, TextSource};

use crate::error::SyntaxError;
use crate::kind::SyntaxKind;
use crate::parse::Parser;
use crate::tree::{Child, Node, ParseTree};

/// Owns the persistent parse tree of one document.
pub struct IncrementalParser {
    tree: Arc<ParseTree>,
    /// The last tree with all edits since the last re-parse folded in.
    edited: Option<Arc<Node>>,
    pending_edits: usize,
    changed: Vec<Range<usize>>,
}

impl IncrementalParser {
    /// Parses `text` from scratch.
    pub fn new(text: &str) -> Self {
        Self {
            tree: Arc::new(Parser::new(text, None).parse().tree),
            edited: None,
            pending_edits: 0,
            changed: Vec::new(),
        }
    }

    /// The most recently built tree. It predates any edits applied since
    /// the last [`current_tree`](Self::current_tree) call.
    pub fn tree(&self) -> &Arc<ParseTree> {
        &self.tree
    }

    pub fn has_pending_edits(&self) -> bool {
        self.edited.is_some()
    }

    /// Records `edit` against the current tree.
    ///
    /// Fails with [`SyntaxError::InvalidEdit`] when the edit is inconsistent
    /// with the current document length or with itself; the parser is left
    /// unchanged in that case. Edits compose: each one applies to the tree
    /// already edited by its predecessors.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<(), SyntaxError> {
        let root = self.edited.as_ref().unwrap_or(self.tree.root());
        edit.validate(root.len())
            .map_err(|defect| SyntaxError::InvalidEdit {
                start: edit.start_byte,
                old_end: edit.old_end_byte,
                new_end: edit.new_end_byte,
                defect,
            })?;

        let edited = edit_node(root, edit.start_byte, edit.old_end_byte, edit.new_end_byte);
        self.edited = Some(edited);
        self.pending_edits += 1;
        for range in &mut self.changed {
            *range = edit.map_offset(range.start)..edit.map_offset(range.end);
        }
        Ok(())
    }

    /// Returns the tree for `source`, re-parsing first if edits are pending.
    ///
    /// `source` must be the text after all applied edits. If its length
    /// disagrees with the edited tree, the edits were misreported; the
    /// parser then parses from scratch and reports the whole document as
    /// changed.
    pub fn current_tree<S: TextSource + ?Sized>(&mut self, source: &S) -> Arc<ParseTree> {
        let Some(edited) = self.edited.take() else {
            return Arc::clone(&self.tree);
        };
        let text = source.content();
        let mut retired = Vec::new();
        error_spans(&edited, 0, &mut retired);

        let output = if edited.len() != text.len() {
            warn!(
                "edited tree covers {} bytes but the source has {}; parsing from scratch",
                edited.len(),
                text.len()
            );
            let mut output = Parser::new(text, None).parse();
            output.changed = vec![0..text.len()];
            output
        } else {
            Parser::new(text, Some(&*edited)).parse()
        };

        debug!(
            "re-parsed {} bytes after {} edit(s): {} subtrees reused, {} ranges changed",
            text.len(),
            self.pending_edits,
            output.reused,
            output.changed.len()
        );
        self.changed.extend(output.changed);
        self.changed.extend(retired);
        self.pending_edits = 0;
        self.tree = Arc::new(output.tree);
        Arc::clone(&self.tree)
    }

    /// Drains the ranges re-lexed or re-contextualised by re-parses since
    /// the last call, sorted and coalesced, in current coordinates.
    pub fn take_changed_ranges(&mut self) -> Vec<Range<usize>> {
        let mut ranges = std::mem::take(&mut self.changed);
        ranges.sort_by_key(|r| (r.start, r.end));
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        merged
    }

    /// Discards edit history and parses `source` from scratch.
    pub fn reset<S: TextSource + ?Sized>(&mut self, source: &S) {
        let text = source.content();
        self.tree = Arc::new(Parser::new(text, None).parse().tree);
        self.edited = None;
        self.pending_edits = 0;
        self.changed = vec![0..text.len()];
    }

    #[cfg(test)]
    pub(crate) fn edited_root(&self) -> Option<&Arc<Node>> {
        self.edited.as_ref()
    }
}

/// Collects the spans of the `ERROR` nodes under `node`, which starts at
/// `start`. An error node styles its whole span, so once it is rebuilt or
/// gone that span has to be highlighted again.
fn error_spans(node: &Node, start: usize, spans: &mut Vec<Range<usize>>) {
    if !node.has_error() {
        return;
    }
    if node.kind() == SyntaxKind::Error {
        spans.push(start..start + node.len());
        return;
    }
    let mut offset = start;
    for child in node.children() {
        error_spans(&child.node, offset, spans);
        offset += child.node.len();
    }
}

/// Applies an edit, given relative to the start of `node`, by path copying.
///
/// Every child whose closed range touches `[start, old_end]` is replaced by
/// a damaged copy. The last child starting at or before `start` receives the
/// inserted bytes; the other touched children only lose the part of them the
/// edit replaced. Other children are shared as is.
fn edit_node(node: &Node, start: usize, old_end: usize, new_end: usize) -> Arc<Node> {
    let new_len = node.len() - (old_end - start) + (new_end - start);
    if node.is_leaf() {
        return Arc::new(node.damaged_copy(new_len, Vec::new()));
    }

    let mut receiver = 0;
    let mut offset = 0;
    for (i, child) in node.children().iter().enumerate() {
        if offset <= start {
            receiver = i;
        }
        offset += child.node.len();
    }

    let mut children = Vec::with_capacity(node.children().len());
    let mut offset = 0;
    for (i, child) in node.children().iter().enumerate() {
        let child_start = offset;
        let child_end = offset + child.node.len();
        offset = child_end;

        if child_start > old_end || start > child_end {
            children.push(child.clone());
            continue;
        }
        let local_start = start.max(child_start) - child_start;
        let local_old_end = old_end.min(child_end) - child_start;
        let local_new_end = if i == receiver {
            local_start + (new_end - start)
        } else {
            local_start
        };
        children.push(Child {
            field: child.field,
            node: edit_node(&child.node, local_start, local_old_end, local_new_end),
        });
    }
    Arc::new(node.damaged_copy(new_len, children))
}
