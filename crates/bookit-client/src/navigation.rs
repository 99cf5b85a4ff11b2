//! Route changes requested by the data layer.
//!
//! The delete workflow decides *whether* to leave the page
//! ([`bookit_core::post_delete_redirect`]); a [`Navigator`] carries it out.

use std::sync::Mutex;

use tracing::debug;

/// Pushes a route onto the host's history (implemented by the UI layer).
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// In-memory route history.
#[derive(Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path pushed so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn current(&self) -> Option<String> {
        self.history().last().cloned()
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, path: &str) {
        debug!(path = %path, "Navigating");
        let mut history = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        history.push(path.to_string());
    }
}
