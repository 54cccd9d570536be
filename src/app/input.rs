use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::selector::Command;
use crate::state::Msg;

use super::state::PendingConfirm;
use super::App;

/// Result of handling a key: Quit the app, or key was consumed (needs render).
/// None means the key was not handled.
pub enum InputResult {
    Quit,
    Consumed,
}

/// Translate a key press into a selector command.
pub fn map_key(key_event: KeyEvent) -> Option<Command> {
    let command = match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => Command::Up,
        KeyCode::Down | KeyCode::Char('j') => Command::Down,
        KeyCode::PageUp => Command::PageUp,
        KeyCode::PageDown => Command::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Command::Home,
        KeyCode::End | KeyCode::Char('G') => Command::End,
        KeyCode::Char(' ') | KeyCode::Enter => Command::Activate,
        KeyCode::Right | KeyCode::Char('l') => Command::Expand,
        KeyCode::Left => Command::Collapse,
        KeyCode::Char('s') => Command::ToggleSelect,
        KeyCode::Char('a') => Command::ToggleSubtree,
        KeyCode::Char('e') => Command::ExpandAll,
        KeyCode::Char('x') => Command::CollapseAll,
        KeyCode::Char('p') => Command::ToggleHidePrivate,
        KeyCode::Char('h') | KeyCode::Char('?') => Command::ToggleHelp,
        _ => return None,
    };
    Some(command)
}

/// Handle a key event. Returns Some(Quit) to exit, Some(Consumed) if key was handled and
/// a render is needed, None if the key was not handled.
pub fn handle_key(app: &mut App, key_event: KeyEvent) -> Option<InputResult> {
    let KeyEvent { code, modifiers, .. } = key_event;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputResult::Quit);
    }

    if let Some(pc) = app.pending_confirm.take() {
        if code == KeyCode::Char('y') || code == KeyCode::Char('Y') {
            tracing::info!(count = pc.count, "revocation confirmed");
            app.apply(Msg::Command(Command::Confirm));
        }
        return Some(InputResult::Consumed);
    }

    match code {
        KeyCode::Char('q') => Some(InputResult::Quit),
        KeyCode::Char('c') => {
            app.state.banner.error = None;
            let count = app.confirmable();
            if !app.is_updating() && count > 0 {
                app.pending_confirm = Some(PendingConfirm::new(count, Instant::now()));
            }
            Some(InputResult::Consumed)
        }
        _ => {
            let command = map_key(key_event)?;
            app.apply(Msg::Command(command));
            Some(InputResult::Consumed)
        }
    }
}
