use std::io::{self, Write};

use crossterm::style::Color;

use crate::model::ImageRecord;
use crate::selector::ViewEntry;
use crate::state::AppState;

use super::shared::{truncate_str, write_bold, write_colored, write_last_line, write_spans, writeln, Span};
use super::theme::Theme;

pub const TITLE: &str = "AMI Cleanup - Public Image Manager";

pub const HELP_LINES: &[&str] = &[
    "  ↑/k ↓/j: move   PgUp/PgDn: page   Home/g End/G: jump",
    "  Space/Enter: expand or select   s: select   a: select whole tree",
    "  →/l: expand   ←: collapse   e: expand all   x: collapse all",
    "  p: hide private   c: make selected private   h/?: help   q: quit",
];

pub const HELP_HINT: &str = "  Press h or ? for help";

const NAME_WIDTH: usize = 34;

/// Draw the whole list screen. `room_for_help` is false when the help panel
/// would not fit; the hint line is drawn instead.
pub fn render_image_list(
    out: &mut impl Write,
    state: &AppState,
    theme: &Theme,
    cols: u16,
    room_for_help: bool,
) -> io::Result<()> {
    let width = cols as usize;
    let selector = &state.selector;
    let forest = &state.forest;

    write_bold(out, theme.title, TITLE)?;

    let totals = forest.totals();
    writeln(
        out,
        &format!(
            "Total: {} AMIs | Public: {} | Private: {} | Selected: {}",
            totals.total,
            totals.public,
            totals.private,
            selector.selected().len()
        ),
    )?;

    match &state.banner.progress {
        Some(msg) => write_colored(out, if selector.is_updating() { theme.updating } else { theme.success }, msg)?,
        None => writeln(out, "")?,
    }
    match (&state.banner.error, &state.banner.success) {
        (Some(err), _) => write_colored(out, theme.error, &truncate_str(err, width))?,
        (None, Some(ok)) => write_colored(out, theme.success, &truncate_str(ok, width))?,
        (None, None) => writeln(out, "")?,
    }
    writeln(out, "")?;

    let view = selector.view();
    let range = selector.visible_range();

    if range.start > 0 {
        write_colored(out, theme.scroll, "  ↑ more above")?;
    } else {
        writeln(out, "")?;
    }

    if view.is_empty() {
        write_colored(out, theme.help, "  No AMIs to show (p toggles private images)")?;
    }
    for idx in range.clone() {
        let entry = &view[idx];
        let Some(record) = entry.record(forest) else { continue };
        let spans = if entry.is_root() {
            root_spans(state, entry, record, theme, idx == selector.cursor())
        } else {
            child_spans(state, entry, record, theme, idx == selector.cursor())
        };
        write_spans(out, &spans, width, idx == selector.cursor())?;
    }

    if range.end < view.len() {
        write_colored(out, theme.scroll, "  ↓ more below")?;
    } else {
        writeln(out, "")?;
    }

    let shown = if view.is_empty() { 0 } else { range.start + 1 };
    write_colored(out, theme.scroll, &format!("  [{}-{} of {}]", shown, range.end, view.len()))?;

    if selector.show_help() && room_for_help {
        let (last, rest) = HELP_LINES.split_last().unwrap_or((&HELP_HINT, &[]));
        for line in rest {
            write_colored(out, theme.help, line)?;
        }
        write_last_line(out, theme.help, last)?;
    } else {
        write_last_line(out, theme.help, HELP_HINT)?;
    }

    Ok(())
}

fn marker(theme: &Theme, at_cursor: bool) -> Span {
    if at_cursor {
        Span::new(theme.cursor, "> ")
    } else {
        Span::new(theme.tree, "  ")
    }
}

fn checkbox(state: &AppState, record: &ImageRecord, theme: &Theme) -> Span {
    if !record.is_public() {
        return Span::new(theme.tree, "    ");
    }
    if state.selector.is_selected(&record.key()) {
        Span::new(theme.selected, "[✓] ")
    } else {
        Span::new(theme.tree, "[ ] ")
    }
}

fn detail_spans(record: &ImageRecord, theme: &Theme) -> Vec<Span> {
    let mut badge = record.status.label().to_string();
    if let Some(err) = &record.error {
        badge = format!("{}: {}", badge, err);
    }
    vec![
        Span::new(theme.image_id, format!("{:<22}", record.id)),
        Span::new(theme.region, format!("{:<15}", record.region)),
        Span::new(theme.date, format!("{:<7} {} ", record.architecture, record.created_display())),
        Span::new(theme.status(record.status), badge),
    ]
}

fn root_spans(state: &AppState, entry: &ViewEntry, record: &ImageRecord, theme: &Theme, at_cursor: bool) -> Vec<Span> {
    let tree = state.forest.tree(entry.tree);
    let has_children = tree.is_some_and(|t| t.has_children());
    let expander = match (has_children, state.selector.is_expanded(entry.tree)) {
        (false, _) => "  ",
        (true, true) => "▼ ",
        (true, false) => "▶ ",
    };

    let mut spans = vec![
        marker(theme, at_cursor),
        Span::new(theme.tree, expander),
        checkbox(state, record, theme),
        Span::new(
            if at_cursor { theme.cursor } else { Color::Reset },
            format!("{:<width$} ", truncate_str(&record.name, NAME_WIDTH), width = NAME_WIDTH),
        ),
    ];
    spans.extend(detail_spans(record, theme));
    if let Some(tree) = tree.filter(|t| t.has_children()) {
        let (public, private) = tree.copy_counts();
        spans.push(Span::new(theme.tree, format!(" ({} public, {} private)", public, private)));
    }
    spans
}

fn child_spans(state: &AppState, entry: &ViewEntry, record: &ImageRecord, theme: &Theme, at_cursor: bool) -> Vec<Span> {
    let connector = if entry.last_child { "  └─ " } else { "  ├─ " };
    let mut spans = vec![
        marker(theme, at_cursor),
        Span::new(theme.tree, connector),
        checkbox(state, record, theme),
    ];
    spans.extend(detail_spans(record, theme));
    spans
}
