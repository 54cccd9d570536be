//! Bounded-concurrency revocation of public launch permissions.
//!
//! Each key runs as its own task on the shared runtime. A semaphore caps the
//! number of jobs between their `Start` and terminal event. All events go to
//! one unbounded channel; `AllComplete` is sent once every job has been
//! joined, after which the channel closes.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::model::ImageKey;
use crate::provider::ImageProvider;

/// Fixed width of the revoke pool.
pub const REVOKE_CONCURRENCY: usize = 5;

/// Progress of a revoke job, as seen by the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusEvent {
    Start { key: String },
    Success { key: String },
    Error { key: String, message: String },
    AllComplete,
}

impl StatusEvent {
    pub fn key(&self) -> Option<&str> {
        match self {
            StatusEvent::Start { key } | StatusEvent::Success { key } | StatusEvent::Error { key, .. } => {
                Some(key)
            }
            StatusEvent::AllComplete => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusEvent::Success { .. } | StatusEvent::Error { .. })
    }
}

pub type StatusReceiver = mpsc::UnboundedReceiver<StatusEvent>;

pub struct Dispatcher {
    provider: Arc<dyn ImageProvider>,
    handle: tokio::runtime::Handle,
    width: usize,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn ImageProvider>, handle: tokio::runtime::Handle) -> Self {
        Self { provider, handle, width: REVOKE_CONCURRENCY }
    }

    /// Revoke every key in `keys` (each `region:identifier`). Returns the
    /// receiving end of the event stream immediately; work continues on the
    /// runtime.
    pub fn dispatch<I>(&self, keys: I) -> StatusReceiver
    where
        I: IntoIterator<Item = String>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let keys: Vec<String> = keys.into_iter().collect();
        tracing::info!(count = keys.len(), width = self.width, "dispatching revocations");

        let provider = Arc::clone(&self.provider);
        let semaphore = Arc::new(Semaphore::new(self.width));
        let handle = self.handle.clone();

        self.handle.spawn(async move {
            let mut jobs = JoinSet::new();
            for key in keys {
                jobs.spawn_on(
                    revoke_one(Arc::clone(&provider), Arc::clone(&semaphore), key, tx.clone()),
                    &handle,
                );
            }
            while let Some(joined) = jobs.join_next().await {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "revoke job panicked");
                }
            }
            tracing::info!("all revocations finished");
            let _ = tx.send(StatusEvent::AllComplete);
        });

        rx
    }

    /// Convenience wrapper taking typed keys.
    pub fn dispatch_keys(&self, keys: &[ImageKey]) -> StatusReceiver {
        self.dispatch(keys.iter().map(ImageKey::to_string))
    }
}

async fn revoke_one(
    provider: Arc<dyn ImageProvider>,
    semaphore: Arc<Semaphore>,
    raw_key: String,
    tx: mpsc::UnboundedSender<StatusEvent>,
) {
    let key: ImageKey = match raw_key.parse() {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(key = %raw_key, "rejecting malformed key");
            let _ = tx.send(StatusEvent::Error { key: raw_key, message: e.to_string() });
            return;
        }
    };

    // Held until the terminal event is sent.
    let Ok(_permit) = semaphore.acquire_owned().await else {
        let _ = tx.send(StatusEvent::Error { key: raw_key, message: "dispatcher shut down".into() });
        return;
    };

    let _ = tx.send(StatusEvent::Start { key: raw_key.clone() });
    tracing::debug!(%key, "revoking public launch permission");

    match provider.revoke_public_launch(&key.region, &key.id).await {
        Ok(()) => {
            tracing::info!(%key, "image made private");
            let _ = tx.send(StatusEvent::Success { key: raw_key });
        }
        Err(e) => {
            tracing::warn!(%key, error = %e, "revoke failed");
            let _ = tx.send(StatusEvent::Error { key: raw_key, message: e.to_string() });
        }
    }
}
