//! Poll driver — bounded, cancellable loop for long-running generation jobs.
//!
//! DESIGN
//! ======
//! Video jobs resolve through repeated polling. The driver sleeps, polls,
//! and repeats until the job finishes, the attempt budget runs out, or the
//! owner cancels — a panel flips the watch flag on unmount so no orphaned
//! loop keeps scheduling polls. Delays carry a small jitter so panels that
//! started jobs together don't poll in lockstep.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::config::{Backoff, PollPolicy};
use super::types::{GenError, GenPayload, GenerateContent, OperationHandle, PollStatus};

/// Cancellation flag for an in-flight poll loop. The owner keeps the sender
/// and sends `true` (or drops it) to stop the loop.
#[must_use]
pub fn cancellation() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Drive a deferred job to completion.
///
/// # Errors
///
/// - [`GenError::Cancelled`] when the flag flips (or the owner drops it).
/// - [`GenError::PollTimeout`] when the attempt budget is exhausted.
/// - [`GenError::JobFailed`] when the provider reports a failed job.
/// - Any transport error from the underlying poll call.
pub async fn poll_until_done(
    adapter: &dyn GenerateContent,
    handle: &OperationHandle,
    policy: PollPolicy,
    mut cancel: watch::Receiver<bool>,
) -> Result<GenPayload, GenError> {
    for attempt in 1..=policy.max_attempts {
        let delay = delay_for(policy, attempt);
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            _ = cancel.wait_for(|cancelled| *cancelled) => {
                // A dropped sender means the owner is gone; stop either way.
                info!(op = %handle.name, attempt, "genai: poll loop cancelled");
                return Err(GenError::Cancelled);
            }
        }

        match adapter.poll(handle).await? {
            PollStatus::Pending => {
                debug!(op = %handle.name, attempt, "genai: job still pending");
            }
            PollStatus::Done(payload) => {
                info!(op = %handle.name, attempt, "genai: job complete");
                return Ok(payload);
            }
            PollStatus::Failed(message) => {
                warn!(op = %handle.name, attempt, error = %message, "genai: job failed");
                return Err(GenError::JobFailed(message));
            }
        }
    }

    warn!(op = %handle.name, attempts = policy.max_attempts, "genai: poll attempt budget exhausted");
    Err(GenError::PollTimeout { attempts: policy.max_attempts })
}

/// Delay before the given 1-based attempt, with ±12.5% jitter.
pub(crate) fn delay_for(policy: PollPolicy, attempt: u32) -> Duration {
    let base = match policy.backoff {
        Backoff::Fixed => policy.interval_ms,
        Backoff::Linear => policy.interval_ms.saturating_mul(u64::from(attempt)),
    };
    let jitter = base / 8;
    if jitter == 0 {
        return Duration::from_millis(base);
    }
    let ms = rand::rng().random_range(base - jitter..=base + jitter);
    Duration::from_millis(ms)
}

#[cfg(test)]
#[path = "poll_test.rs"]
mod tests;
