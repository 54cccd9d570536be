use std::io::{self, Write};
use crossterm::{queue, style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor}};

/// Truncate a string to at most `max_len` characters (not bytes), appending "..."
/// if truncated. Safe for multi-byte UTF-8.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(keep).collect();
        format!("{}...", truncated)
    }
}

pub fn writeln(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{}\r\n", text)
}

pub fn write_colored(out: &mut impl Write, color: Color, text: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{}\r\n", text)?;
    queue!(out, ResetColor)?;
    Ok(())
}

/// Bottom line of a frame. No line break, so the screen never scrolls.
pub fn write_last_line(out: &mut impl Write, color: Color, text: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{}", text)?;
    queue!(out, ResetColor)?;
    Ok(())
}

pub fn write_bold(out: &mut impl Write, color: Color, text: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(color), SetAttribute(Attribute::Bold))?;
    write!(out, "{}\r\n", text)?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// A run of text in one colour.
pub struct Span {
    pub color: Color,
    pub text: String,
}

impl Span {
    pub fn new(color: Color, text: impl Into<String>) -> Self {
        Self { color, text: text.into() }
    }
}

/// Write one line made of coloured spans, cut at `width` characters. The
/// cursor line is drawn bold.
pub fn write_spans(out: &mut impl Write, spans: &[Span], width: usize, highlighted: bool) -> io::Result<()> {
    if highlighted {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    let mut remaining = width;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let piece: String = span.text.chars().take(remaining).collect();
        remaining -= piece.chars().count();
        queue!(out, SetForegroundColor(span.color))?;
        write!(out, "{}", piece)?;
    }
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    write!(out, "\r\n")
}
