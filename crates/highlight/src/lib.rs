// Chunk: docs/chunks/invalidation_tracking - Dirty range tracking across edits and scrolls
// Chunk: docs/chunks/async_highlight - Generation-tagged asynchronous token requests

//! neon-highlight: visible-range aware highlight scheduling for neon-json.
//!
//! This crate decides *what* to highlight and *when*, and applies the
//! results to a passive canvas:
//!
//! - [`InvalidationTracker`] turns edits and viewport changes into coalesced
//!   dirty byte ranges, each Clean, Dirty or Pending.
//! - [`HighlightScheduler`] issues asynchronous token requests for visible
//!   dirty text and applies completions, discarding any whose generation was
//!   superseded by a later edit.
//! - [`HighlightSession`] bundles buffer, grammar, scheduler and canvas for
//!   one document.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use neon_highlight::{HighlightConfig, HighlightSession, StyleCanvas};
//! use neon_syntax::{Grammar, SyntaxTheme, TokenKind};
//!
//! let mut session = HighlightSession::new(
//!     HighlightConfig::default(),
//!     Grammar::load(),
//!     StyleCanvas::new(40),
//! );
//! session.load("{\"a\":1}");
//! session.replace(6..6, ",\"b\":2").unwrap();
//! assert!(session.wait_for_idle(Duration::from_secs(5)));
//!
//! let theme = SyntaxTheme::catppuccin_mocha();
//! assert_eq!(session.canvas().style_at(11), Some(theme.style_for(TokenKind::Number)));
//! ```

mod canvas;
mod config;
mod dirty_ranges;
mod executor;
mod invalidation;
mod scheduler;
mod session;
mod viewport;

pub use canvas::{Canvas, StyleCanvas};
pub use config::{ConfigError, HighlightConfig};
pub use dirty_ranges::DirtyRangeSet;
pub use executor::{
    completion_channel, CompletionReceiver, CompletionSender, DeferredExecutor, HighlightJob,
    HighlightResponse, JobExecutor, ThreadPoolExecutor,
};
pub use invalidation::{CompletionOutcome, Generation, InvalidationTracker, QueuedRange, RegionState};
pub use scheduler::{CompletionSummary, HighlightScheduler};
pub use session::HighlightSession;
pub use viewport::Viewport;
