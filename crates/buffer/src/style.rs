// Chunk: docs/chunks/highlight_query - Style types applied to highlighted ranges

//! Visual attributes a canvas can apply to a byte range.
//!
//! The types here are what the highlighter hands to a canvas: a [`Style`]
//! made of [`Color`]s and text attributes, and, for headless rendering,
//! [`Span`]s grouped into [`StyledLine`]s.

// =============================================================================
// Color Types
// =============================================================================

/// The 16 standard ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl NamedColor {
    /// The ANSI palette index (0-15).
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// A color as the canvas understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Whatever the canvas uses when nothing is set.
    #[default]
    Default,
    /// Named ANSI colors (0-15).
    Named(NamedColor),
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit RGB color.
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Builds an RGB color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Color {
        Color::Rgb {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }
}

// =============================================================================
// Style
// =============================================================================

/// Underline rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    /// Wavy underline, conventionally used for errors.
    Curly,
}

/// Text attributes for a highlighted range.
///
/// The default style is unstyled text: default colors, no attributes. It is
/// what the highlighter writes over ranges no token covers.
///
/// # Example
///
/// ```
/// use neon_buffer::{Color, NamedColor, Style, UnderlineStyle};
///
/// let error = Style::fg(Color::Named(NamedColor::Red)).underlined(UnderlineStyle::Curly);
/// assert_eq!(error.underline, UnderlineStyle::Curly);
/// assert!(!error.is_plain());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: UnderlineStyle,
    /// Underline color (None = use fg color).
    pub underline_color: Option<Color>,
}

impl Style {
    /// A style that only sets the foreground color.
    pub const fn fg(color: Color) -> Style {
        Style {
            fg: color,
            bg: Color::Default,
            bold: false,
            italic: false,
            underline: UnderlineStyle::None,
            underline_color: None,
        }
    }

    pub const fn with_bg(mut self, color: Color) -> Style {
        self.bg = color;
        self
    }

    pub const fn italic(mut self) -> Style {
        self.italic = true;
        self
    }

    pub const fn bold(mut self) -> Style {
        self.bold = true;
        self
    }

    pub const fn underlined(mut self, underline: UnderlineStyle) -> Style {
        self.underline = underline;
        self
    }

    /// True when the style sets nothing.
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

// =============================================================================
// Span and StyledLine
// =============================================================================

/// A contiguous run of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Creates an unstyled span (default style).
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::default())
    }
}

/// One rendered line: a sequence of styled spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledLine {
    pub spans: Vec<Span>,
}

impl StyledLine {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Creates a line with a single unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::plain(text)],
        }
    }

    /// Appends text, extending the last span when the style matches.
    pub fn push(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(Span::new(text, style)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The line's text with styling removed.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default(), Color::Default);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::hex(0xcba6f7), Color::Rgb { r: 0xcb, g: 0xa6, b: 0xf7 });
        assert_eq!(Color::hex(0x000000), Color::Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn test_named_color_index() {
        assert_eq!(NamedColor::Black.index(), 0);
        assert_eq!(NamedColor::Red.index(), 1);
        assert_eq!(NamedColor::BrightWhite.index(), 15);
    }

    #[test]
    fn test_style_default_is_plain() {
        let style = Style::default();
        assert!(style.is_plain());
        assert_eq!(style.fg, Color::Default);
        assert_eq!(style.underline, UnderlineStyle::None);
        assert_eq!(style.underline_color, None);
    }

    #[test]
    fn test_style_builders() {
        let style = Style::fg(Color::hex(0x6c7086))
            .italic()
            .with_bg(Color::Named(NamedColor::Red));
        assert!(style.italic);
        assert!(!style.bold);
        assert_eq!(style.bg, Color::Named(NamedColor::Red));
        assert!(!style.is_plain());
    }

    #[test]
    fn test_styled_line_push_merges_equal_styles() {
        let red = Style::fg(Color::Named(NamedColor::Red));
        let mut line = StyledLine::default();
        line.push("{", red);
        line.push("}", red);
        line.push("", Style::default());
        line.push(" ", Style::default());
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0], Span::new("{}", red));
        assert_eq!(line.text(), "{} ");
    }

    #[test]
    fn test_styled_line_plain() {
        let line = StyledLine::plain("null");
        assert!(!line.is_empty());
        assert_eq!(line.spans, vec![Span::plain("null")]);
        assert!(StyledLine::new(vec![]).is_empty());
    }
}
