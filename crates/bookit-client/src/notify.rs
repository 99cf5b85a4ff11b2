//! # Notifications
//!
//! The user-visible toast channel. Fetches and mutations never surface
//! errors to their caller's caller; they hand one line of text to a
//! [`Notifier`] and move on.
//!
//! ## Toast Queue
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                         top-right ┌───────────┐ │
//! │                                   │ newest    │ │
//! │                                   ├───────────┤ │
//! │                                   │ ...       │ │  at most max_visible (3)
//! │                                   ├───────────┤ │  oldest evicted first
//! │                                   │ oldest    │ │  each lives 3000 ms
//! │                                   └───────────┘ │
//! └─────────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::NotificationSettings;

// =============================================================================
// Toast
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Success,
    Info,
}

/// Screen corner toasts stack in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

/// One transient message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

impl Toast {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Error toasts get the distinct red styling.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// =============================================================================
// Notifier Trait
// =============================================================================

/// Fire-and-forget sink for toasts (implemented by the UI layer).
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Drops every toast.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _toast: Toast) {}
}

// =============================================================================
// Toast Queue
// =============================================================================

/// Bounded, auto-dismissing toast queue.
///
/// Expiry is evaluated lazily on read against the tokio clock, so paused
/// test time controls it.
pub struct ToastQueue {
    max_visible: usize,
    auto_dismiss: Duration,
    position: ToastPosition,
    entries: Mutex<VecDeque<(Toast, Instant)>>,
}

impl ToastQueue {
    pub fn new(settings: &NotificationSettings) -> Self {
        ToastQueue {
            max_visible: settings.max_visible.max(1),
            auto_dismiss: settings.auto_dismiss(),
            position: settings.position,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn position(&self) -> ToastPosition {
        self.position
    }

    /// Toasts still on screen, oldest first.
    pub fn visible(&self) -> Vec<Toast> {
        let mut entries = self.lock();
        let now = Instant::now();
        entries.retain(|(_, shown_at)| now.duration_since(*shown_at) < self.auto_dismiss);
        entries.iter().map(|(toast, _)| toast.clone()).collect()
    }

    /// Removes a toast before it expires (user clicked it away).
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(toast, _)| toast.id != id);
        entries.len() != before
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<(Toast, Instant)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(&NotificationSettings::default())
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        let mut entries = self.lock();
        while entries.len() >= self.max_visible {
            entries.pop_front();
        }
        entries.push_back((toast, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_limit_evicts_oldest() {
        let queue = ToastQueue::default();
        for i in 0..5 {
            queue.notify(Toast::error(format!("toast {}", i)));
        }

        let visible: Vec<String> = queue.visible().into_iter().map(|t| t.message).collect();
        assert_eq!(visible, vec!["toast 2", "toast 3", "toast 4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_after_3000ms() {
        let queue = ToastQueue::default();
        queue.notify(Toast::error("first"));

        tokio::time::advance(Duration::from_millis(2000)).await;
        queue.notify(Toast::info("second"));
        assert_eq!(queue.visible().len(), 2);

        tokio::time::advance(Duration::from_millis(1000)).await;
        let visible = queue.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_by_id() {
        let queue = ToastQueue::default();
        let toast = Toast::success("saved");
        let id = toast.id;
        queue.notify(toast);

        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert!(queue.visible().is_empty());
    }

    #[test]
    fn test_error_severity_styling() {
        assert!(Toast::error("x").is_error());
        assert!(!Toast::success("x").is_error());
        assert_eq!(ToastQueue::default().position(), ToastPosition::TopRight);
    }
}
