use super::*;
use crate::genai::types::GenError;

// =============================================================================
// Notification constructors
// =============================================================================

#[test]
fn info_notification_shape() {
    let n = Notification::info("saved");
    assert_eq!(n.severity, Severity::Info);
    assert_eq!(n.message, "saved");
    assert_eq!(n.code, None);
    assert!(!n.retryable);
}

#[test]
fn from_error_carries_code_and_retryable() {
    let err = GenError::ApiResponse { status: 503, body: "overloaded".into() };
    let n = Notification::from_error(&err);
    assert_eq!(n.severity, Severity::Error);
    assert_eq!(n.code.as_deref(), Some("E_API_RESPONSE"));
    assert!(n.retryable);
    assert!(n.message.contains("503"));
}

#[test]
fn from_error_non_retryable() {
    let err = GenError::Cancelled;
    let n = Notification::from_error(&err);
    assert_eq!(n.code.as_deref(), Some("E_CANCELLED"));
    assert!(!n.retryable);
}

#[test]
fn severity_serde_is_lowercase() {
    assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
}

// =============================================================================
// Notifier delivery
// =============================================================================

#[tokio::test]
async fn emit_delivers_in_order() {
    let (notifier, mut rx) = Notifier::channel(8);
    notifier.emit(Notification::info("first"));
    notifier.emit(Notification::error("second"));

    assert_eq!(rx.recv().await.unwrap().message, "first");
    assert_eq!(rx.recv().await.unwrap().message, "second");
}

#[tokio::test]
async fn full_queue_drops_newest() {
    let (notifier, mut rx) = Notifier::channel(1);
    notifier.emit(Notification::info("kept"));
    notifier.emit(Notification::info("dropped"));

    assert_eq!(rx.try_recv().unwrap().message, "kept");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn closed_queue_does_not_panic() {
    let (notifier, rx) = Notifier::channel(1);
    drop(rx);
    notifier.emit(Notification::info("into the void"));
}
