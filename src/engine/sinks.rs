//! Notification and busy-indicator collaborators of the fetcher.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
}

/// A human-readable message for the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Surfaces notifications to the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Shows or hides a busy indicator. Not reference-counted.
pub trait BusyIndicator: Send + Sync {
    fn set_busy(&self, busy: bool);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!("{}", notification.message),
            NotificationKind::Warning => tracing::warn!("{}", notification.message),
            NotificationKind::Error => tracing::error!("{}", notification.message),
        }
    }
}

/// Logs busy-indicator transitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBusyIndicator;

impl BusyIndicator for TracingBusyIndicator {
    fn set_busy(&self, busy: bool) {
        tracing::debug!(busy, "Busy indicator");
    }
}
