//! Everything the front end draws, and the one place it changes.

use crate::dispatcher::StatusEvent;
use crate::model::Forest;
use crate::multiplexer::{self, Banner};
use crate::selector::{Command, Outcome, Selector};

/// Input to [`AppState::update`]: an operator command or a dispatcher event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    Command(Command),
    Status(StatusEvent),
}

pub struct AppState {
    pub forest: Forest,
    pub selector: Selector,
    pub banner: Banner,
}

impl AppState {
    pub fn new(forest: Forest, page_height: usize) -> Self {
        let selector = Selector::new(&forest, page_height);
        Self { forest, selector, banner: Banner::default() }
    }

    pub fn update(&mut self, msg: Msg) -> Option<Outcome> {
        match msg {
            Msg::Command(command) => {
                if !matches!(command, Command::Resize { .. }) {
                    self.banner.error = None;
                }
                let outcome = self.selector.apply(&self.forest, command);
                if let Some(Outcome::Dispatch(keys)) = &outcome {
                    self.banner.progress = Some(format!("Updating {} AMI(s)...", keys.len()));
                    self.banner.success = None;
                }
                outcome
            }
            Msg::Status(event) => {
                multiplexer::apply_status(&mut self.forest, &mut self.selector, &mut self.banner, event);
                None
            }
        }
    }
}

/// By-value form of [`AppState::update`].
pub fn reduce(mut state: AppState, msg: Msg) -> (AppState, Option<Outcome>) {
    let outcome = state.update(msg);
    (state, outcome)
}
