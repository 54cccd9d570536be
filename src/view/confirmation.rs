use std::io::{self, Write};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetBackgroundColor, SetForegroundColor, SetAttribute, Attribute, ResetColor}};

/// Overlay the prompt on the third line from the bottom.
pub fn render_confirmation(out: &mut impl Write, prompt: &str, cols: u16, rows: u16) -> io::Result<()> {
    let y = rows.saturating_sub(3);
    let width = cols as usize;

    queue!(out, MoveTo(0, y))?;
    queue!(out, SetBackgroundColor(Color::DarkRed), SetForegroundColor(Color::White), SetAttribute(Attribute::Bold))?;
    let line = format!("  {} (y to confirm, any other key to cancel)  ", prompt);
    write!(out, "{:<width$}", line, width = width)?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    Ok(())
}
