mod shared;
mod theme;
mod image_list;
mod confirmation;

use std::io::{self, Write};
use crossterm::{cursor, queue, style::{Color, SetForegroundColor, ResetColor}, terminal};

use crate::state::AppState;

pub use theme::Theme;
pub use image_list::{HELP_LINES, TITLE};

pub struct Presenter;

/// Minimum terminal dimensions for usable rendering.
pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 10;

/// Title, totals, two banner lines and a spacer.
const HEADER_ROWS: usize = 5;
/// Both scroll indicators and the position line.
const LIST_CHROME_ROWS: usize = 3;
/// Left blank at the bottom of the screen.
const SPARE_ROWS: usize = 1;

/// Whether the full help panel fits next to at least one list row. On
/// shorter screens the one-line hint is drawn instead.
pub fn help_fits(rows: u16) -> bool {
    rows as usize >= HEADER_ROWS + LIST_CHROME_ROWS + HELP_LINES.len() + SPARE_ROWS + 1
}

fn footer_rows(rows: u16, show_help: bool) -> usize {
    if show_help && help_fits(rows) { HELP_LINES.len() } else { 1 }
}

/// Rows left for list entries on a screen `rows` tall. Never less than one.
pub fn list_height(rows: u16, show_help: bool) -> usize {
    (rows as usize)
        .saturating_sub(HEADER_ROWS + LIST_CHROME_ROWS + footer_rows(rows, show_help) + SPARE_ROWS)
        .max(1)
}

impl Presenter {
    /// If the terminal is smaller than the minimum, draw a "too small"
    /// message and return `true` (meaning "skip normal rendering").
    pub fn render_size_guard(out: &mut impl Write, cols: u16, rows: u16) -> io::Result<bool> {
        if cols >= MIN_COLS && rows >= MIN_ROWS {
            return Ok(false);
        }
        queue!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
        let msg = format!(
            "Terminal too small ({}x{}). Resize to at least {}x{}.",
            cols, rows, MIN_COLS, MIN_ROWS
        );
        let y = rows / 2;
        let x = cols.saturating_sub(msg.chars().count() as u16) / 2;
        queue!(out, cursor::MoveTo(x, y), SetForegroundColor(Color::Yellow))?;
        write!(out, "{}", msg)?;
        queue!(out, ResetColor)?;
        Ok(true)
    }

    pub fn render(out: &mut impl Write, state: &AppState, theme: &Theme, cols: u16, rows: u16) -> io::Result<()> {
        queue!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
        image_list::render_image_list(out, state, theme, cols, help_fits(rows))
    }

    pub fn render_confirmation(out: &mut impl Write, prompt: &str, cols: u16, rows: u16) -> io::Result<()> {
        confirmation::render_confirmation(out, prompt, cols, rows)
    }
}
