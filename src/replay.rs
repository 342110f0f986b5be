// Chunk: docs/chunks/headless_demo - Headless JSON highlighting demo
//!
//! Scripted edits for the demo driver.
//!
//! An edit is written on the command line as one of:
//!
//! - `OFFSET:TEXT` inserts `TEXT` at byte `OFFSET`
//! - `START..END` deletes the byte range
//! - `START..END:TEXT` replaces the byte range with `TEXT`
//!
//! `TEXT` may use `\n`, `\t` and `\\` escapes.

use std::ops::Range;
use std::str::FromStr;

use neon_buffer::{BufferError, Edit};
use neon_highlight::{Canvas, HighlightSession};
use thiserror::Error;

/// Errors from parsing an edit argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditParseError {
    #[error("`{0}` is not a byte offset")]
    BadOffset(String),

    #[error("expected OFFSET:TEXT, START..END or START..END:TEXT, got `{0}`")]
    BadShape(String),

    #[error("unknown escape `\\{0}`")]
    BadEscape(char),
}

/// One scripted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedEdit {
    Insert { offset: usize, text: String },
    Delete { range: Range<usize> },
    Replace { range: Range<usize>, text: String },
}

impl ScriptedEdit {
    /// The byte range this edit replaces.
    pub fn range(&self) -> Range<usize> {
        match self {
            ScriptedEdit::Insert { offset, .. } => *offset..*offset,
            ScriptedEdit::Delete { range } | ScriptedEdit::Replace { range, .. } => range.clone(),
        }
    }

    /// The text inserted in place of [`range`](Self::range).
    pub fn text(&self) -> &str {
        match self {
            ScriptedEdit::Insert { text, .. } | ScriptedEdit::Replace { text, .. } => text,
            ScriptedEdit::Delete { .. } => "",
        }
    }

    /// Applies the edit to a session's buffer, announcing it to the
    /// highlighter.
    pub fn apply<C: Canvas>(&self, session: &mut HighlightSession<C>) -> Result<Edit, BufferError> {
        session.replace(self.range(), self.text())
    }
}

impl FromStr for ScriptedEdit {
    type Err = EditParseError;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let (target, text) = match arg.split_once(':') {
            Some((target, text)) => (target, Some(unescape(text)?)),
            None => (arg, None),
        };
        match (target.split_once(".."), text) {
            (Some((start, end)), None) => Ok(ScriptedEdit::Delete {
                range: parse_offset(start)?..parse_offset(end)?,
            }),
            (Some((start, end)), Some(text)) => Ok(ScriptedEdit::Replace {
                range: parse_offset(start)?..parse_offset(end)?,
                text,
            }),
            (None, Some(text)) => Ok(ScriptedEdit::Insert {
                offset: parse_offset(target)?,
                text,
            }),
            (None, None) => Err(EditParseError::BadShape(arg.to_string())),
        }
    }
}

fn parse_offset(s: &str) -> Result<usize, EditParseError> {
    s.trim()
        .parse()
        .map_err(|_| EditParseError::BadOffset(s.to_string()))
}

fn unescape(s: &str) -> Result<String, EditParseError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(EditParseError::BadEscape(other)),
            None => out.push('\\'),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        let edit: ScriptedEdit = "6:,\"b\":2".parse().unwrap();
        assert_eq!(
            edit,
            ScriptedEdit::Insert {
                offset: 6,
                text: ",\"b\":2".to_string()
            }
        );
        assert_eq!(edit.range(), 6..6);
    }

    #[test]
    fn test_parse_delete() {
        let edit: ScriptedEdit = "3..5".parse().unwrap();
        assert_eq!(edit, ScriptedEdit::Delete { range: 3..5 });
        assert_eq!(edit.text(), "");
    }

    #[test]
    fn test_parse_replace_with_escapes() {
        let edit: ScriptedEdit = "1..2:x\\ny".parse().unwrap();
        assert_eq!(
            edit,
            ScriptedEdit::Replace {
                range: 1..2,
                text: "x\ny".to_string()
            }
        );
    }

    #[test]
    fn test_text_may_contain_colons() {
        let edit: ScriptedEdit = "0:{\"k\": 1}".parse().unwrap();
        assert_eq!(edit.text(), "{\"k\": 1}");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "12".parse::<ScriptedEdit>(),
            Err(EditParseError::BadShape("12".to_string()))
        );
        assert_eq!(
            "a:x".parse::<ScriptedEdit>(),
            Err(EditParseError::BadOffset("a".to_string()))
        );
        assert_eq!(
            "0:\\q".parse::<ScriptedEdit>(),
            Err(EditParseError::BadEscape('q'))
        );
    }
}
