//! Applies dispatcher events to the forest and the selector, one at a time.

use crate::dispatcher::StatusEvent;
use crate::model::{Forest, ImageKey, ImageRecord, ImageStatus};
use crate::selector::Selector;

/// Transient messages shown above the list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Banner {
    /// Progress of the current (or last) batch.
    pub progress: Option<String>,
    pub success: Option<String>,
    /// Cleared on the next key press.
    pub error: Option<String>,
}

pub fn apply_status(forest: &mut Forest, selector: &mut Selector, banner: &mut Banner, event: StatusEvent) {
    match event {
        StatusEvent::Start { key } => {
            update_record(forest, &key, |record| {
                record.status = ImageStatus::Updating;
            });
        }
        StatusEvent::Success { key } => {
            if let Ok(parsed) = key.parse::<ImageKey>() {
                forest.update_matching(&parsed, |record| {
                    record.status = ImageStatus::Private;
                    record.error = None;
                });
                selector.deselect(&parsed);
            }
            banner.success = Some(format!("✓ Made {} private", key));
        }
        StatusEvent::Error { key, message } => {
            update_record(forest, &key, |record| {
                record.status = ImageStatus::Error;
                record.error = Some(message.clone());
            });
            banner.error = Some(format!("✗ Failed to update {}: {}", key, message));
        }
        StatusEvent::AllComplete => {
            selector.finish_update();
            banner.progress = Some("✓ All updates complete!".to_string());
        }
    }
    selector.rebuild_view(forest);
}

fn update_record(forest: &mut Forest, key: &str, f: impl FnMut(&mut ImageRecord)) {
    match key.parse::<ImageKey>() {
        Ok(parsed) => {
            if forest.update_matching(&parsed, f) == 0 {
                tracing::warn!(key, "status event for unknown image");
            }
        }
        Err(_) => tracing::debug!(key, "status event with malformed key"),
    }
}
