//! Content service — generation flows that merge payloads into records.
//!
//! DESIGN
//! ======
//! Snapshot the target record, run the adapter (driving the poll loop for
//! deferred jobs), and merge the payload through the upsert protocol. On any
//! failure the record is left untouched and exactly one notification is
//! emitted — generation errors never reach the synchronous store path.
//!
//! The batch flow continues past individual failures: each one is logged and
//! notified on its own, and the caller gets a per-item report. There is no
//! automatic retry; re-invoking the batch is the retry.

use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::genai::config::PollPolicy;
use crate::genai::poll::poll_until_done;
use crate::genai::types::{GenError, GenOutcome, GenPayload, GenRequest, GenerateContent};
use crate::notify::{ErrorCode, Notifier};
use crate::record::{Record, RecordId};
use crate::store::Store;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),
    #[error("store not initialized")]
    StoreNotReady,
    #[error(transparent)]
    Gen(#[from] GenError),
}

impl ErrorCode for ContentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RecordNotFound(_) => "E_RECORD_NOT_FOUND",
            Self::StoreNotReady => "E_STORE_NOT_READY",
            Self::Gen(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::RecordNotFound(_) | Self::StoreNotReady => false,
            Self::Gen(e) => e.retryable(),
        }
    }
}

/// One item of a bulk generation run.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub record_id: RecordId,
    pub request: GenRequest,
}

/// Per-item outcome of a bulk generation run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    /// Failed items with their error messages, in run order.
    pub failed: Vec<(RecordId, String)>,
    /// Items never attempted because the run was cancelled.
    pub skipped: usize,
}

impl BatchReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }
}

// =============================================================================
// SINGLE RECORD
// =============================================================================

/// Generate content for one record and merge the payload into it.
///
/// Text payloads land in `field`; structured field maps merge key-by-key;
/// media payloads land in `field` as a serialized reference. On failure the
/// record is untouched and one notification is emitted.
///
/// # Errors
///
/// Returns a [`ContentError`] mirroring the emitted notification; callers
/// may inspect it but need not re-surface it to the user.
pub async fn generate_into_record(
    store: &Store,
    adapter: &dyn GenerateContent,
    notifier: &Notifier,
    collection: &str,
    record_id: &RecordId,
    field: &str,
    request: &GenRequest,
    policy: PollPolicy,
    cancel: watch::Receiver<bool>,
) -> Result<Record, ContentError> {
    let result = run_generation(store, adapter, collection, record_id, field, request, policy, cancel).await;
    match &result {
        Ok(record) => {
            info!(collection, id = %record.id, field, "content: payload merged");
        }
        Err(e) => {
            warn!(collection, id = %record_id, field, error = %e, "content: generation failed, record untouched");
            notifier.error(e);
        }
    }
    result
}

#[allow(clippy::too_many_arguments)]
async fn run_generation(
    store: &Store,
    adapter: &dyn GenerateContent,
    collection: &str,
    record_id: &RecordId,
    field: &str,
    request: &GenRequest,
    policy: PollPolicy,
    cancel: watch::Receiver<bool>,
) -> Result<Record, ContentError> {
    // Snapshot before any suspension point: a failure later must provably
    // leave this value out of the store.
    let slice = store.slice(collection).await;
    let snapshot = slice
        .get(record_id)
        .cloned()
        .ok_or_else(|| ContentError::RecordNotFound(record_id.clone()))?;

    let payload = match adapter.generate(request).await? {
        GenOutcome::Immediate(payload) => payload,
        GenOutcome::Deferred(handle) => poll_until_done(adapter, &handle, policy, cancel).await?,
    };

    let merged = apply_payload(&snapshot, field, &payload);
    if !store.upsert(collection, merged.clone()).await {
        return Err(ContentError::StoreNotReady);
    }
    Ok(merged)
}

fn apply_payload(record: &Record, field: &str, payload: &GenPayload) -> Record {
    let mut next = record.clone();
    match payload {
        GenPayload::Text { text } => next.set(field, text.as_str()),
        GenPayload::Fields { fields } => next.merge_fields(fields),
        GenPayload::Media { .. } => {
            next.set(field, serde_json::to_value(payload).unwrap_or(Value::Null));
        }
    }
    next
}

// =============================================================================
// BATCH
// =============================================================================

/// Run generation over many records, continuing past individual failures.
///
/// Each failure logs and notifies on its own; cancellation between items
/// stops the run and counts the remainder as skipped.
#[allow(clippy::too_many_arguments)]
pub async fn generate_batch(
    store: &Store,
    adapter: &dyn GenerateContent,
    notifier: &Notifier,
    collection: &str,
    field: &str,
    items: Vec<BatchItem>,
    policy: PollPolicy,
    cancel: watch::Receiver<bool>,
) -> BatchReport {
    let total = items.len();
    let mut report = BatchReport::default();

    for (index, item) in items.into_iter().enumerate() {
        if *cancel.borrow() {
            report.skipped = total - index;
            warn!(collection, skipped = report.skipped, "content: batch cancelled");
            break;
        }

        let outcome = generate_into_record(
            store,
            adapter,
            notifier,
            collection,
            &item.record_id,
            field,
            &item.request,
            policy,
            cancel.clone(),
        )
        .await;

        match outcome {
            Ok(_) => report.succeeded += 1,
            Err(e) => {
                // Already logged and notified per item by generate_into_record.
                report.failed.push((item.record_id, e.to_string()));
            }
        }
    }

    info!(
        collection,
        total,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        skipped = report.skipped,
        "content: batch complete"
    );
    report
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
