//! Notifications — transient, dismissible user-facing events.
//!
//! DESIGN
//! ======
//! Fallible operations (the generation boundary, above all) never propagate
//! errors into the synchronous store path; they surface here instead. The
//! notifier is a bounded queue with non-blocking `try_send`: a full queue
//! drops the notification with a diagnostic rather than stalling an event
//! handler.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured notifications.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// NOTIFICATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One user-visible event. Transient: the UI shows it as an auto-dismissed
/// banner; the failed operation stays retryable by re-invoking the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub retryable: bool,
}

impl Notification {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, message: message.into(), code: None, retryable: false }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into(), code: None, retryable: false }
    }

    /// Structured error notification carrying the grepable code and
    /// retryable flag.
    #[must_use]
    pub fn from_error<E: ErrorCode + ?Sized>(err: &E) -> Self {
        Self {
            severity: Severity::Error,
            message: err.to_string(),
            code: Some(err.error_code().to_string()),
            retryable: err.retryable(),
        }
    }
}

// =============================================================================
// NOTIFIER
// =============================================================================

/// Clonable sender half of the notification queue.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    /// Create a bounded notification channel.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Best-effort, non-blocking emit. A full or closed queue drops the
    /// notification with a diagnostic.
    pub fn emit(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(n)) => {
                warn!(message = %n.message, "notify: queue full; dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(n)) => {
                warn!(message = %n.message, "notify: queue closed; dropping notification");
            }
        }
    }

    /// Emit a structured error notification.
    pub fn error<E: ErrorCode + ?Sized>(&self, err: &E) {
        self.emit(Notification::from_error(err));
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
