use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::warn;

/// Rate-limited warning log: at most one record per event key per window.
///
/// Owned by the session context, so each session (and each test) has its
/// own history.
#[derive(Debug)]
pub struct WarnLimiter {
    window: Duration,
    last_emitted: Mutex<HashMap<String, Instant>>,
}

impl Default for WarnLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl WarnLimiter {
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        Self::with_window(Self::DEFAULT_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            last_emitted: Mutex::new(HashMap::new()),
        }
    }

    /// Records an emission for `key` unless one happened inside the window.
    pub fn should_emit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut last = self
            .last_emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match last.get(key) {
            Some(at) if now.duration_since(*at) < self.window => false,
            _ => {
                last.insert(key.to_string(), now);
                true
            }
        }
    }

    /// Emits `warn!` for `key` with `details`; returns whether it was emitted.
    pub fn warn(&self, key: &str, details: Value) -> bool {
        if !self.should_emit(key) {
            return false;
        }
        warn!(target: "gaia", event = key, details = %details, "[GAIA] {key}");
        true
    }
}
