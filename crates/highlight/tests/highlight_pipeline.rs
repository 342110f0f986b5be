//! Integration tests for the highlight pipeline.
//!
//! These drive a `HighlightSession` end to end: edits go through the
//! buffer, parser and tracker, requests run on a deferred or pooled
//! executor, and the resulting canvas is compared against expectations.

use std::time::Duration;

use neon_highlight::{
    completion_channel, Canvas, CompletionSummary, DeferredExecutor, HighlightConfig,
    HighlightSession, RegionState, StyleCanvas, Viewport,
};
use neon_syntax::{Grammar, SyntaxTheme, TokenKind};

fn deferred(config: HighlightConfig, visible_lines: usize) -> (HighlightSession<StyleCanvas>, DeferredExecutor) {
    let (sender, receiver) = completion_channel(None);
    let executor = DeferredExecutor::new(sender);
    let session = HighlightSession::with_executor(
        config,
        Grammar::load(),
        StyleCanvas::new(visible_lines),
        Box::new(executor.clone()),
        receiver,
    );
    (session, executor)
}

fn settle(session: &mut HighlightSession<StyleCanvas>, executor: &DeferredExecutor) -> CompletionSummary {
    executor.run_all();
    session.process_completions()
}

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
    "null", "// c\n", "/*", "*/", "{\"a\": [1, 2]}", "x", "\n  ",
];

/// Runs about half of the waiting jobs, picked at random.
fn run_some(executor: &DeferredExecutor, rng: &mut Lcg) {
    for _ in 0..(executor.pending() + 1) / 2 {
        executor.run_at(rng.below(executor.pending()));
    }
}

/// Runs every waiting job in random order.
fn run_shuffled(executor: &DeferredExecutor, rng: &mut Lcg) {
    while executor.pending() > 0 {
        executor.run_at(rng.below(executor.pending()));
    }
}

/// Styles a fresh session produces for `text` once idle.
fn fresh_styles(text: &str) -> Vec<neon_buffer::Style> {
    let (mut session, executor) = deferred(HighlightConfig::default(), 1000);
    session.load(text);
    settle(&mut session, &executor);
    session.canvas().styles().to_vec()
}

// ==================== end-to-end ====================

#[test]
fn test_insert_pair_highlights_new_tokens() {
    let (mut session, executor) = deferred(HighlightConfig::default(), 40);
    session.load("{\"a\":1}");
    settle(&mut session, &executor);

    session.replace(6..6, ",\"b\":2").unwrap();
    let summary = settle(&mut session, &executor);
    assert_eq!(summary.applied, 1);

    let theme = SyntaxTheme::catppuccin_mocha();
    let canvas = session.canvas();
    assert_eq!(canvas.style_at(6), Some(theme.style_for(TokenKind::PunctuationDelimiter)));
    assert_eq!(canvas.style_at(7), Some(theme.style_for(TokenKind::Keyword)));
    assert_eq!(canvas.style_at(11), Some(theme.style_for(TokenKind::Number)));
    assert_eq!(canvas.styles(), &fresh_styles("{\"a\":1,\"b\":2}")[..]);
}

#[test]
fn test_typing_matches_fresh_highlighting() {
    let target = "{\n  \"key\": [1, true, null],\n  \"other\": \"x\" // note\n}\n";
    let (mut session, executor) = deferred(HighlightConfig::default(), 1000);
    session.load("");

    for (offset, c) in target.char_indices() {
        session.replace(offset..offset, c.encode_utf8(&mut [0; 4])).unwrap();
        // Let some keystrokes pile up before the workers catch up
        if offset % 3 == 0 {
            settle(&mut session, &executor);
        }
    }
    settle(&mut session, &executor);

    assert_eq!(session.buffer().text(), target);
    assert_eq!(session.canvas().styles(), &fresh_styles(target)[..]);
}

fn check_random_edits_converge(expand_to_lines: bool) {
    const PAGE: usize = 3;
    for seed in 1..=60u64 {
        let mut rng = Lcg(seed);
        let config = HighlightConfig {
            expand_to_lines,
            ..HighlightConfig::default()
        };
        let (mut session, executor) = deferred(config, PAGE);
        session.load("{\n  \"name\": \"neon\",\n  \"tags\": [1, 2, 3],\n  \"ok\": true\n}\n");

        for _ in 0..25 {
            let len = session.buffer().len();
            let start = rng.below(len + 1);
            let end = (start + rng.below(4)).min(len);
            let fragment = FRAGMENTS[rng.below(FRAGMENTS.len())];
            session.replace(start..end, fragment).unwrap();

            if rng.below(3) == 0 {
                let line_count = session.buffer().line_count();
                let first = rng.below(line_count);
                session.canvas_mut().scroll_to(first, line_count);
                session.visible_content_did_change();
            }
            // Completions arrive late, partially and out of order
            run_some(&executor, &mut rng);
            session.process_completions();
        }
        run_shuffled(&executor, &mut rng);
        session.process_completions();

        let text = session.buffer().text().to_string();
        let fresh = fresh_styles(&text);
        let visible = session.canvas().viewport().byte_range(session.buffer());
        assert_eq!(
            session.canvas().styles()[visible.clone()],
            fresh[visible.clone()],
            "seed {}: visible bytes {:?} of {:?}",
            seed,
            visible,
            text
        );

        // Page through the document so every byte gets highlighted
        let line_count = session.buffer().line_count();
        for first in (0..line_count).step_by(PAGE) {
            session.canvas_mut().set_viewport(Viewport::new(first, PAGE));
            session.visible_content_did_change();
            run_shuffled(&executor, &mut rng);
            session.process_completions();
        }
        assert_eq!(session.canvas().styles(), &fresh[..], "seed {}: {:?}", seed, text);
    }
}

#[test]
fn test_random_edits_converge_with_line_expansion() {
    check_random_edits_converge(true);
}

#[test]
fn test_random_edits_converge_without_line_expansion() {
    check_random_edits_converge(false);
}

// ==================== staleness ====================

#[test]
fn test_late_response_never_paints() {
    let (mut session, executor) = deferred(HighlightConfig::default(), 40);
    session.load("[true]");
    // gen of the load is in flight; the edit supersedes it
    session.replace(1..5, "null").unwrap();
    assert_eq!(executor.pending(), 2);

    // Deliver the newest first, then the superseded one
    executor.run_newest();
    let summary = settle(&mut session, &executor);
    assert_eq!(summary, CompletionSummary { applied: 1, stale: 1, failed: 0 });

    let theme = SyntaxTheme::catppuccin_mocha();
    assert_eq!(session.canvas().style_at(1), Some(theme.style_for(TokenKind::Null)));
}

// ==================== visibility ====================

#[test]
fn test_hidden_dirty_range_waits_until_visible() {
    let text: String = (0..50).map(|i| format!("{}\n", i)).collect();
    let (mut session, executor) = deferred(HighlightConfig::default(), 5);
    session.load(&text);
    settle(&mut session, &executor);

    let tail = session.buffer().lines_byte_range(30, 1);
    assert_eq!(session.scheduler().unwrap().tracker().state_at(tail.start), RegionState::Dirty);

    // Editing near the top only queries the visible lines
    session.replace(0..1, "7").unwrap();
    assert_eq!(executor.pending_ranges(), vec![0..2]);
    settle(&mut session, &executor);
    assert_eq!(session.canvas().style_at(tail.start), Some(Default::default()));

    session.canvas_mut().set_viewport(Viewport::new(30, 5));
    session.visible_content_did_change();
    assert_eq!(executor.pending_ranges(), vec![session.buffer().lines_byte_range(30, 5)]);
    settle(&mut session, &executor);

    let theme = SyntaxTheme::catppuccin_mocha();
    assert_eq!(
        session.canvas().style_at(tail.start),
        Some(theme.style_for(TokenKind::Number))
    );
}

#[test]
fn test_adjacent_hidden_edits_coalesce() {
    let config = HighlightConfig {
        expand_to_lines: false,
        ..HighlightConfig::default()
    };
    let text: String = (0..20).map(|i| format!("{}\n", i)).collect();
    let (mut session, executor) = deferred(config, 1000);
    session.load(&text);
    settle(&mut session, &executor);
    assert!(session.scheduler().unwrap().tracker().dirty().is_empty());

    session.canvas_mut().set_viewport(Viewport::new(0, 2));
    session.visible_content_did_change();

    let line = session.buffer().lines_byte_range(10, 1);
    session.replace(line.start..line.start + 1, "9").unwrap();
    session.replace(line.start + 1..line.start + 2, "8").unwrap();
    assert_eq!(executor.pending(), 0);

    let dirty = session.scheduler().unwrap().tracker().dirty();
    assert_eq!(dirty.len(), 1);
    let merged = &dirty.ranges()[0];
    assert!(merged.start <= line.start && merged.end >= line.start + 2);
}

// ==================== threads ====================

#[test]
fn test_thread_pool_converges_after_burst_of_edits() {
    let mut session = HighlightSession::new(
        HighlightConfig {
            worker_threads: 3,
            ..HighlightConfig::default()
        },
        Grammar::load(),
        StyleCanvas::new(1000),
    );
    session.load("[]");
    for i in 0..30 {
        let at = session.buffer().len() - 1;
        let item = if i == 0 { "0".to_string() } else { format!(", {}", i) };
        session.replace(at..at, &item).unwrap();
        session.process_completions();
    }
    assert!(session.wait_for_idle(Duration::from_secs(10)));
    let text = session.buffer().text().to_string();
    assert_eq!(session.canvas().styles(), &fresh_styles(&text)[..]);
}
