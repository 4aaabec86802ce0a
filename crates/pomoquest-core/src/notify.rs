//! Notification seam.
//!
//! The core decides *when* the user should hear about something; how it is
//! shown (toast, terminal line, system notification) belongs to the host.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
}

/// Fire-and-forget sink. Implementations must not fail the caller.
pub trait NotificationSink {
    fn show(&self, title: &str, body: &str, kind: NotificationKind);
}

impl<N: NotificationSink + ?Sized> NotificationSink for &N {
    fn show(&self, title: &str, body: &str, kind: NotificationKind) {
        (**self).show(title, body, kind)
    }
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn show(&self, title: &str, body: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Warning => tracing::warn!(title, body, "notification"),
            _ => tracing::info!(title, body, ?kind, "notification"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn show(&self, _title: &str, _body: &str, _kind: NotificationKind) {}
}
