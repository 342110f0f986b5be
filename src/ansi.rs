// Chunk: docs/chunks/headless_demo - Headless JSON highlighting demo
//!
//! ANSI rendering of styled lines.
//!
//! Each span becomes an SGR sequence followed by its text; every line ends
//! with a reset so styles never bleed into the next line.

use std::fmt::Write;

use neon_buffer::{Color, Style, StyledLine, UnderlineStyle};

/// Resets all attributes.
pub const RESET: &str = "\x1b[0m";

/// Which layer a color is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Foreground,
    Background,
    Underline,
}

/// Returns the SGR escape sequence selecting `style`, starting from a reset.
pub fn sgr(style: &Style) -> String {
    let mut params = vec!["0".to_string()];
    if style.bold {
        params.push("1".to_string());
    }
    if style.italic {
        params.push("3".to_string());
    }
    match style.underline {
        UnderlineStyle::None => {}
        UnderlineStyle::Single => params.push("4".to_string()),
        UnderlineStyle::Double => params.push("21".to_string()),
        UnderlineStyle::Curly => params.push("4:3".to_string()),
    }
    params.extend(color_param(style.fg, Layer::Foreground));
    params.extend(color_param(style.bg, Layer::Background));
    if let Some(color) = style.underline_color {
        params.extend(color_param(color, Layer::Underline));
    }
    format!("\x1b[{}m", params.join(";"))
}

fn color_param(color: Color, layer: Layer) -> Option<String> {
    match (color, layer) {
        (Color::Default, _) => None,
        (Color::Named(named), Layer::Foreground) => Some(named_param(named.index(), 30, 90)),
        (Color::Named(named), Layer::Background) => Some(named_param(named.index(), 40, 100)),
        (Color::Named(named), Layer::Underline) => Some(format!("58;5;{}", named.index())),
        (Color::Indexed(index), layer) => Some(format!("{};5;{}", extended_base(layer), index)),
        (Color::Rgb { r, g, b }, layer) => {
            Some(format!("{};2;{};{};{}", extended_base(layer), r, g, b))
        }
    }
}

fn named_param(index: u8, normal: u8, bright: u8) -> String {
    if index < 8 {
        (normal + index).to_string()
    } else {
        (bright + index - 8).to_string()
    }
}

fn extended_base(layer: Layer) -> u8 {
    match layer {
        Layer::Foreground => 38,
        Layer::Background => 48,
        Layer::Underline => 58,
    }
}

/// Renders one line with escape sequences. Plain spans are written without
/// any, and the line ends with [`RESET`] only if something was styled.
pub fn render_line(line: &StyledLine) -> String {
    let mut out = String::new();
    let mut styled = false;
    for span in &line.spans {
        if span.style.is_plain() {
            if styled {
                out.push_str(RESET);
                styled = false;
            }
        } else {
            out.push_str(&sgr(&span.style));
            styled = true;
        }
        out.push_str(&span.text);
    }
    if styled {
        out.push_str(RESET);
    }
    out
}

/// Renders lines as plain text, one per output line, with a gutter of line
/// numbers starting at `first_line + 1`.
pub fn render_with_gutter(lines: &[StyledLine], first_line: usize, color: bool) -> String {
    let width = (first_line + lines.len()).to_string().len();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let body = if color {
            render_line(line)
        } else {
            line.text()
        };
        let body = body.strip_suffix('\n').unwrap_or(&body);
        // Writing into a String cannot fail
        let _ = writeln!(out, "{:>width$} | {}", first_line + i + 1, body, width = width);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_buffer::{NamedColor, Span};

    #[test]
    fn test_sgr_rgb_foreground() {
        let style = Style::fg(Color::hex(0xa6e3a1));
        assert_eq!(sgr(&style), "\x1b[0;38;2;166;227;161m");
    }

    #[test]
    fn test_sgr_attributes_and_named_colors() {
        let style = Style::fg(Color::Named(NamedColor::BrightRed))
            .with_bg(Color::Named(NamedColor::Blue))
            .italic()
            .underlined(UnderlineStyle::Curly);
        assert_eq!(sgr(&style), "\x1b[0;3;4:3;91;44m");
    }

    #[test]
    fn test_sgr_indexed_and_underline_color() {
        let mut style = Style::fg(Color::Indexed(208)).bold();
        style.underline = UnderlineStyle::Single;
        style.underline_color = Some(Color::hex(0xf38ba8));
        assert_eq!(sgr(&style), "\x1b[0;1;4;38;5;208;58;2;243;139;168m");
    }

    #[test]
    fn test_plain_line_has_no_escapes() {
        let line = StyledLine::plain("[1, 2]");
        assert_eq!(render_line(&line), "[1, 2]");
    }

    #[test]
    fn test_styled_span_is_reset_before_plain_text() {
        let green = Style::fg(Color::Named(NamedColor::Green));
        let line = StyledLine::new(vec![Span::new("\"a\"", green), Span::plain(" x")]);
        assert_eq!(render_line(&line), "\x1b[0;32m\"a\"\x1b[0m x");
    }

    #[test]
    fn test_gutter_numbers_and_strips_newlines() {
        let lines = vec![StyledLine::plain("{\n"), StyledLine::plain("}")];
        assert_eq!(render_with_gutter(&lines, 8, false), " 9 | {\n10 | }\n");
    }
}
