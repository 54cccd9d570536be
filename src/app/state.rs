use std::time::{Duration, Instant};

/// How long a confirmation prompt stays open.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(10);

/// Bulk revocation awaiting a `y`.
pub struct PendingConfirm {
    pub prompt: String,
    pub count: usize,
    pub expires: Instant,
}

impl PendingConfirm {
    pub fn new(count: usize, now: Instant) -> Self {
        Self {
            prompt: format!("Make {} image(s) private?", count),
            count,
            expires: now + CONFIRM_TIMEOUT,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires
    }
}
