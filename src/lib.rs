// Chunk: docs/chunks/headless_demo - Headless JSON highlighting demo

//! neon-json: incremental JSON syntax highlighting as you type.
//!
//! The workspace crates do the work: `neon-buffer` holds the text,
//! `neon-syntax` parses and queries it, and `neon-highlight` schedules
//! highlighting for what is visible. This crate drives them headlessly:
//! it loads a document into a [`HighlightSession`] backed by a
//! [`StyleCanvas`], replays scripted edits, waits for the highlighter to
//! settle and renders the visible lines with ANSI escapes.
//!
//! # Example
//!
//! ```
//! use neon_json::{highlight_text, DemoOptions};
//!
//! let options = DemoOptions {
//!     edits: vec!["6:,\"b\":2".parse().unwrap()],
//!     color: false,
//!     ..DemoOptions::default()
//! };
//! let output = highlight_text("{\"a\":1}", &options).unwrap();
//! assert_eq!(output, "1 | {\"a\":1,\"b\":2}\n");
//! ```

pub mod ansi;
pub mod replay;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use neon_buffer::BufferError;
use neon_highlight::{Canvas, HighlightConfig, HighlightSession, StyleCanvas};
use neon_syntax::Grammar;
use thiserror::Error;

pub use replay::{EditParseError, ScriptedEdit};

/// Errors the demo driver reports.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to read {}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("edit {index} was rejected")]
    Edit {
        index: usize,
        #[source]
        source: BufferError,
    },

    #[error(transparent)]
    Config(#[from] neon_highlight::ConfigError),
}

/// What to highlight and how to show it.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub config: HighlightConfig,
    /// Edits applied, in order, after the document is loaded.
    pub edits: Vec<ScriptedEdit>,
    /// First line shown.
    pub first_line: usize,
    /// Emit ANSI escapes.
    pub color: bool,
    /// How long to wait for highlighting to settle.
    pub timeout: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            config: HighlightConfig::default(),
            edits: Vec::new(),
            first_line: 0,
            color: true,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Highlights the file at `path`. See [`highlight_text`].
pub fn highlight_file(path: &Path, options: &DemoOptions) -> Result<String, DemoError> {
    let text = fs::read_to_string(path).map_err(|source| DemoError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    highlight_text(&text, options)
}

/// Loads `text`, replays the edits, waits for highlighting and returns the
/// visible lines rendered with a line-number gutter.
pub fn highlight_text(text: &str, options: &DemoOptions) -> Result<String, DemoError> {
    let mut session = HighlightSession::new(
        options.config.clone(),
        Grammar::load(),
        StyleCanvas::new(options.config.visible_lines),
    );
    session.load(text);

    for (index, edit) in options.edits.iter().enumerate() {
        let applied = edit
            .apply(&mut session)
            .map_err(|source| DemoError::Edit { index, source })?;
        info!(
            "edit {}: {}..{} -> {}..{}",
            index,
            applied.start_byte,
            applied.old_end_byte,
            applied.start_byte,
            applied.new_end_byte
        );
        session.process_completions();
    }

    if options.first_line > 0 {
        let line_count = session.buffer().line_count();
        session.canvas_mut().scroll_to(options.first_line, line_count);
        session.visible_content_did_change();
    }

    if !session.wait_for_idle(options.timeout) {
        warn!("highlighting did not settle within {:?}", options.timeout);
    }

    let canvas = session.canvas();
    let lines = canvas.render_visible(session.buffer());
    Ok(ansi::render_with_gutter(
        &lines,
        canvas.viewport().first_visible_line(),
        options.color,
    ))
}
