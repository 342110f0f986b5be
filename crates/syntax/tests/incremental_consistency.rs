//! Integration tests for incremental re-parsing.
//!
//! These drive `IncrementalParser` through `SourceBuffer` edits the way the
//! highlight session does, and compare the results against from-scratch
//! parses of the same text.

use std::sync::Arc;

use neon_buffer::SourceBuffer;
use neon_syntax::{parse, Field, Grammar, IncrementalParser, SyntaxKind, TokenKind};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const FRAGMENTS: &[&str] = &[
    "", "{", "}", "[", "]", ",", ":", " ", "\n", "\"", "\"k\"", "1", "-2.5e3", "true", "fals",
    "null", "// c\n", "/*", "*/", "{\"a\": [1, 2]}", "x",
];

fn char_boundary_below(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

// ==================== consistency tests ====================

#[test]
fn test_random_edits_match_full_parse() {
    for seed in 1..=40u64 {
        let mut rng = Lcg(seed);
        let mut buffer = SourceBuffer::new("{\"name\": \"neon\", \"tags\": [1, 2, 3], \"ok\": true}\n");
        let mut parser = IncrementalParser::new(buffer.text());

        for step in 0..30 {
            // Fold one to three edits into a single re-parse
            for _ in 0..1 + rng.below(3) {
                let len = buffer.len();
                let start = char_boundary_below(buffer.text(), rng.below(len + 1));
                let end = char_boundary_below(buffer.text(), (start + rng.below(4)).min(len));
                let fragment = FRAGMENTS[rng.below(FRAGMENTS.len())];
                let edit = buffer.replace(start..end, fragment).unwrap();
                parser.apply_edit(&edit).unwrap();
            }

            let tree = parser.current_tree(&buffer);
            let full = parse(buffer.text());
            assert_eq!(
                *tree,
                full,
                "seed {} step {}: incremental tree differs for {:?}",
                seed,
                step,
                buffer.text()
            );
            assert_eq!(tree.reconstruct(buffer.text()), buffer.text());
        }
    }
}

#[test]
fn test_leaves_tile_the_document() {
    let text = "{\"a\": [1, {\"b\": null}], /* gap */ \"c\": tru}\n";
    let tree = parse(text);
    let mut expected_start = 0;
    for leaf in tree.leaves() {
        assert_eq!(leaf.range.start, expected_start);
        assert!(leaf.range.end > leaf.range.start);
        expected_start = leaf.range.end;
    }
    assert_eq!(expected_start, text.len());
    assert!(tree.has_error());
}

// ==================== reuse tests ====================

#[test]
fn test_nodes_outside_the_edit_are_shared() {
    let items: Vec<String> = (0..100).map(|i| i.to_string()).collect();
    let text = format!("[{}]", items.join(", "));
    let mut buffer = SourceBuffer::new(text.as_str());
    let mut parser = IncrementalParser::new(buffer.text());
    let old_tree = Arc::clone(parser.tree());

    let start = buffer.text().find("50").unwrap();
    let edit = buffer.replace(start..start + 2, "5").unwrap();
    parser.apply_edit(&edit).unwrap();
    let new_tree = parser.current_tree(&buffer);

    let old_array = &old_tree.root().children()[0].node;
    let new_array = &new_tree.root().children()[0].node;
    assert_eq!(old_array.children().len(), new_array.children().len());

    let mut offset = 0;
    let mut shared = 0;
    for (old, new) in old_array.children().iter().zip(new_array.children()) {
        let old_start = offset;
        let old_end = offset + old.node.len();
        offset = old_end;
        if old_end < start || old_start > start + 2 {
            assert!(
                Arc::ptr_eq(&old.node, &new.node),
                "child at {}..{} should be reused",
                old_start,
                old_end
            );
            shared += 1;
        }
    }
    // Everything but the number and the separators on either side of it
    assert_eq!(shared, old_array.children().len() - 3);
}

#[test]
fn test_insert_pair_end_to_end() {
    let grammar = Grammar::load().unwrap();
    let mut buffer = SourceBuffer::new("{\"a\":1}");
    let mut parser = grammar.parser(buffer.text());
    let old_key = Arc::clone(
        parser.tree().root().children()[0].node.children()[1]
            .node
            .child_by_field(Field::Key)
            .unwrap(),
    );

    let edit = buffer.replace(6..6, ",\"b\":2").unwrap();
    parser.apply_edit(&edit).unwrap();
    let tree = parser.current_tree(&buffer);
    assert_eq!(buffer.text(), "{\"a\":1,\"b\":2}");

    let tokens = grammar.query().execute(&tree, 0..buffer.len());
    assert!(tokens
        .iter()
        .any(|t| t.range == (11..12) && t.kind == TokenKind::Number));
    assert!(tokens
        .iter()
        .any(|t| t.range == (6..7) && t.kind == TokenKind::PunctuationDelimiter));

    let object = &tree.root().children()[0].node;
    assert_eq!(object.kind(), SyntaxKind::Object);
    let new_key = object.children()[1]
        .node
        .child_by_field(Field::Key)
        .unwrap();
    assert!(Arc::ptr_eq(&old_key, new_key));
}
