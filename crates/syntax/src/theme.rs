// Chunk: docs/chunks/highlight_query - Catppuccin Mocha theme for JSON tokens

//! Syntax theme mapping token kinds to styles.
//!
//! The mapping is total: every [`TokenKind`] has a style, so applying a
//! token never has to fall back to "leave whatever was there".

use neon_buffer::{Style, UnderlineStyle};
use std::collections::HashMap;

use crate::token::TokenKind;

/// Catppuccin Mocha color palette constants.
mod catppuccin {
    use neon_buffer::Color;

    pub const MAUVE: Color = Color::hex(0xcba6f7);
    pub const BLUE: Color = Color::hex(0x89b4fa);
    pub const GREEN: Color = Color::hex(0xa6e3a1);
    pub const TEAL: Color = Color::hex(0x94e2d5);
    pub const YELLOW: Color = Color::hex(0xf9e2af);
    pub const RED: Color = Color::hex(0xf38ba8);
    pub const SURFACE0: Color = Color::hex(0x313244);

    // Surface/text colors
    pub const OVERLAY0: Color = Color::hex(0x6c7086);
    pub const TEXT: Color = Color::hex(0xcdd6f4);
}

/// A mapping from token kinds to visual styles.
#[derive(Debug, Clone)]
pub struct SyntaxTheme {
    name: &'static str,
    styles: HashMap<TokenKind, Style>,
    default_style: Style,
}

impl SyntaxTheme {
    /// Creates the Catppuccin Mocha syntax theme.
    pub fn catppuccin_mocha() -> Self {
        let mut styles = HashMap::new();

        // Structure
        styles.insert(TokenKind::PunctuationBracket, Style::fg(catppuccin::MAUVE));
        styles.insert(TokenKind::PunctuationDelimiter, Style::fg(catppuccin::OVERLAY0));

        // Object keys
        styles.insert(TokenKind::Keyword, Style::fg(catppuccin::YELLOW));

        // Values
        styles.insert(TokenKind::String, Style::fg(catppuccin::GREEN));
        styles.insert(TokenKind::Bool, Style::fg(catppuccin::RED));
        styles.insert(TokenKind::Number, Style::fg(catppuccin::BLUE));
        styles.insert(TokenKind::Null, Style::fg(catppuccin::TEAL));

        styles.insert(TokenKind::Comment, Style::fg(catppuccin::OVERLAY0).italic());
        styles.insert(
            TokenKind::Error,
            Style::fg(catppuccin::RED).underlined(UnderlineStyle::Curly),
        );
        // Capture names nobody mapped stand out on purpose
        styles.insert(
            TokenKind::Unknown,
            Style::fg(catppuccin::SURFACE0).with_bg(catppuccin::RED),
        );

        Self {
            name: "catppuccin-mocha",
            styles,
            default_style: Style::fg(catppuccin::TEXT),
        }
    }

    /// Looks a theme up by its configuration name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "catppuccin-mocha" => Some(Self::catppuccin_mocha()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the style for `kind`.
    pub fn style_for(&self, kind: TokenKind) -> Style {
        self.styles
            .get(&kind)
            .copied()
            .unwrap_or(self.default_style)
    }

    /// The style of text no token covers.
    pub fn default_style(&self) -> Style {
        self.default_style
    }
}

impl Default for SyntaxTheme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_buffer::Color;

    #[test]
    fn test_every_kind_has_a_distinct_style_from_default() {
        let theme = SyntaxTheme::catppuccin_mocha();
        for kind in TokenKind::ALL {
            assert_ne!(
                theme.style_for(kind),
                theme.default_style(),
                "{:?} should not render as plain text",
                kind
            );
        }
    }

    #[test]
    fn test_all_foregrounds_are_rgb() {
        let theme = SyntaxTheme::catppuccin_mocha();
        for kind in TokenKind::ALL {
            assert!(
                matches!(theme.style_for(kind).fg, Color::Rgb { .. }),
                "{:?} should have an RGB fg color",
                kind
            );
        }
    }

    #[test]
    fn test_keyword_is_yellow() {
        let theme = SyntaxTheme::catppuccin_mocha();
        assert_eq!(
            theme.style_for(TokenKind::Keyword).fg,
            Color::Rgb {
                r: 0xf9,
                g: 0xe2,
                b: 0xaf
            }
        );
    }

    #[test]
    fn test_comment_is_italic_overlay0() {
        let theme = SyntaxTheme::catppuccin_mocha();
        let style = theme.style_for(TokenKind::Comment);
        assert_eq!(
            style.fg,
            Color::Rgb {
                r: 0x6c,
                g: 0x70,
                b: 0x86
            }
        );
        assert!(style.italic);
    }

    #[test]
    fn test_error_is_underlined_and_unknown_has_background() {
        let theme = SyntaxTheme::catppuccin_mocha();
        assert_eq!(theme.style_for(TokenKind::Error).underline, UnderlineStyle::Curly);
        assert_ne!(theme.style_for(TokenKind::Unknown).bg, Color::Default);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(
            SyntaxTheme::by_name("catppuccin-mocha").map(|t| t.name()),
            Some("catppuccin-mocha")
        );
        assert!(SyntaxTheme::by_name("solarized").is_none());
    }
}
