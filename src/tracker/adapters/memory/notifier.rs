//! Notifier that records everything it is asked to show.

use crate::tracker::ports::{Notification, Notifier, ToastSeverity};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Recorded {
    notifications: Vec<Notification>,
    toasts: Vec<(ToastSeverity, String)>,
}

/// Records notifications and toasts in the order they were raised.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    recorded: Mutex<Recorded>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every toast raised so far.
    #[must_use]
    pub fn toasts(&self) -> Vec<(ToastSeverity, String)> {
        self.lock().toasts.clone()
    }

    /// Returns the messages of toasts with the given severity.
    #[must_use]
    pub fn toasts_with(&self, severity: ToastSeverity) -> Vec<String> {
        self.lock()
            .toasts
            .iter()
            .filter(|(raised, _)| *raised == severity)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Returns every desktop notification raised so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.lock().notifications.push(notification);
    }

    fn toast(&self, severity: ToastSeverity, message: &str) {
        self.lock().toasts.push((severity, message.to_owned()));
    }
}
