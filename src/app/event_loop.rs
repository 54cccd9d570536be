use std::time::Instant;

use tokio::sync::mpsc::error::TryRecvError;

use crate::state::Msg;

use super::App;

impl App {
    /// Apply at most one dispatcher event. Returns whether anything changed,
    /// so the caller can render between events.
    pub fn poll_status(&mut self) -> bool {
        let Some(rx) = self.status_rx.as_mut() else {
            return false;
        };
        match rx.try_recv() {
            Ok(event) => {
                tracing::debug!(?event, "status event");
                self.apply(Msg::Status(event));
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.status_rx = None;
                false
            }
        }
    }

    /// Expire pending confirmation if timed out.
    pub fn expire_pending_confirm(&mut self) -> bool {
        let now = Instant::now();
        if self.pending_confirm.as_ref().is_some_and(|pc| pc.is_expired(now)) {
            self.pending_confirm = None;
            return true;
        }
        false
    }
}
