//! Notification ports: desktop notifications and in-app toasts.

use std::fmt;

/// Desktop notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Play a sound.
    pub sound: bool,
    /// Keep the notification until dismissed.
    pub wait: bool,
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastSeverity {
    /// Operation succeeded.
    Success,
    /// Something needs attention.
    Warning,
    /// Operation failed.
    Error,
    /// Remote changes were pulled in.
    Update,
}

impl fmt::Display for ToastSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Update => "update",
        };
        f.write_str(label)
    }
}

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    /// Shows a desktop notification.
    fn notify(&self, notification: Notification);

    /// Shows an in-app toast.
    fn toast(&self, severity: ToastSeverity, message: &str);
}
