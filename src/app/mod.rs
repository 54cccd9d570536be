mod state;
mod event_loop;
mod render;
mod input;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, Clear, ClearType},
};

use crate::dispatcher::{Dispatcher, StatusReceiver};
use crate::model::{Forest, ImageStatus};
use crate::selector::{Command, Outcome};
use crate::state::{AppState, Msg};
use crate::view::{list_height, Theme};

pub use input::{map_key, InputResult};
pub use state::{PendingConfirm, CONFIRM_TIMEOUT};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
    let _ = disable_raw_mode();
}

/// Front-end state plus the handles it needs to start revocations.
pub struct App {
    pub state: AppState,
    pub pending_confirm: Option<PendingConfirm>,
    pub theme: Theme,
    pub cols: u16,
    pub rows: u16,
    dispatcher: Dispatcher,
    status_rx: Option<StatusReceiver>,
}

impl App {
    pub fn new(forest: Forest, dispatcher: Dispatcher, cols: u16, rows: u16) -> Self {
        Self {
            state: AppState::new(forest, list_height(rows, true)),
            pending_confirm: None,
            theme: Theme::default(),
            cols,
            rows,
            dispatcher,
            status_rx: None,
        }
    }

    /// Run a message through the reducer and start any dispatch it asks for.
    pub fn apply(&mut self, msg: Msg) {
        if let Some(Outcome::Dispatch(keys)) = self.state.update(msg) {
            self.status_rx = Some(self.dispatcher.dispatch_keys(&keys));
        }
        self.sync_page_height();
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.sync_page_height();
    }

    /// Selected images a confirm would actually send.
    pub fn confirmable(&self) -> usize {
        self.state
            .selector
            .selected()
            .iter()
            .filter(|k| self.state.forest.status_of(k) == Some(ImageStatus::Public))
            .count()
    }

    pub fn is_updating(&self) -> bool {
        self.state.selector.is_updating()
    }

    fn sync_page_height(&mut self) {
        let rows = list_height(self.rows, self.state.selector.show_help());
        if rows != self.state.selector.page_height() {
            self.state.update(Msg::Command(Command::Resize { rows }));
        }
    }
}

/// Run the interactive selector over `forest`. Sets up the terminal, runs the
/// main loop, restores the terminal on exit.
pub fn run(forest: Forest, dispatcher: Dispatcher, should_quit: Arc<AtomicBool>) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut app = App::new(forest, dispatcher, cols, rows);

    enable_raw_mode()?;
    if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, cursor::Hide, Clear(ClearType::All)) {
        restore_terminal();
        return Err(e);
    }
    let result = main_loop(&mut app, &should_quit);

    if app.is_updating() {
        tracing::warn!("exiting while revocations are still running");
    }
    restore_terminal();
    result
}

fn main_loop(app: &mut App, should_quit: &AtomicBool) -> io::Result<()> {
    let mut stdout = io::stdout();
    let mut needs_render = true;

    loop {
        if should_quit.load(Ordering::Relaxed) {
            tracing::info!("quit requested by signal");
            break;
        }

        if app.expire_pending_confirm() {
            needs_render = true;
        }
        let got_status = app.poll_status();
        if got_status {
            needs_render = true;
        }

        if needs_render {
            render::render(app, &mut stdout)?;
            needs_render = false;
        }

        // Keep draining without waiting while events are queued.
        let timeout = if got_status { Duration::ZERO } else { POLL_INTERVAL };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    match input::handle_key(app, key_event) {
                        Some(InputResult::Quit) => break,
                        Some(InputResult::Consumed) => needs_render = true,
                        None => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    app.resize(cols, rows);
                    needs_render = true;
                }
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::App;
    use crate::dispatcher::Dispatcher;
    use crate::error::ProviderError;
    use crate::model::Forest;
    use crate::provider::{ImageProvider, RawImage};

    pub struct OkProvider;

    #[async_trait]
    impl ImageProvider for OkProvider {
        async fn list_images(&self, _: &str, _: &str, _: &str) -> Result<Vec<RawImage>, ProviderError> {
            Ok(Vec::new())
        }

        async fn revoke_public_launch(&self, _: &str, _: &str) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    /// An app on a 100x30 screen. Keep the runtime alive for the test.
    pub fn app(forest: Forest) -> (tokio::runtime::Runtime, App) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(OkProvider), rt.handle().clone());
        let app = App::new(forest, dispatcher, 100, 30);
        (rt, app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageRecord, LineageTree};

    fn forest(n: usize) -> Forest {
        let trees = (0..n)
            .map(|i| {
                LineageTree::new(ImageRecord {
                    id: format!("ami-{:03}", i),
                    name: format!("capa-ami-{:03}", i),
                    region: "us-east-1".into(),
                    created: None,
                    status: ImageStatus::Public,
                    architecture: "x86_64".into(),
                    copied_from: None,
                    error: None,
                })
            })
            .collect();
        Forest::new(trees)
    }

    #[test]
    fn page_height_tracks_screen_and_help() {
        let (_rt, mut app) = testing::app(forest(50));
        assert_eq!(app.state.selector.page_height(), list_height(30, true));

        app.apply(Msg::Command(Command::ToggleHelp));
        assert_eq!(app.state.selector.page_height(), list_height(30, false));

        app.resize(120, 12);
        assert_eq!(app.state.selector.page_height(), list_height(12, false));
        app.apply(Msg::Command(Command::End));
        assert!(app.state.selector.visible_range().contains(&49));
    }

    #[test]
    fn confirmable_counts_public_selection_only() {
        let (_rt, mut app) = testing::app(forest(3));
        app.apply(Msg::Command(Command::ToggleSelect));
        app.apply(Msg::Command(Command::Down));
        app.apply(Msg::Command(Command::ToggleSelect));
        assert_eq!(app.confirmable(), 2);
        let key = crate::model::ImageKey::new("us-east-1", "ami-001");
        app.state.forest.update_matching(&key, |r| r.status = ImageStatus::Error);
        assert_eq!(app.confirmable(), 1);
    }

    #[test]
    fn run_leaves_raw_mode_off() {
        let (rt, _) = testing::app(Forest::default());
        let dispatcher = Dispatcher::new(Arc::new(testing::OkProvider), rt.handle().clone());
        // Without a terminal the size query fails before raw mode is
        // entered; with one, the pre-set quit flag ends the loop at once.
        let should_quit = Arc::new(AtomicBool::new(true));
        let _ = run(forest(1), dispatcher, should_quit);
        assert!(!terminal::is_raw_mode_enabled().unwrap_or(false));
    }
}
