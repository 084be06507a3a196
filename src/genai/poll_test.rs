use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::genai::types::{GenOutcome, GenRequest};

/// Serves queued poll statuses in order; optionally flips a cancellation
/// flag after serving one, to exercise mid-loop cancellation.
struct MockAdapter {
    statuses: Mutex<Vec<PollStatus>>,
    polls: Mutex<u32>,
    cancel_after_poll: Mutex<Option<watch::Sender<bool>>>,
}

impl MockAdapter {
    fn new(statuses: Vec<PollStatus>) -> Self {
        Self { statuses: Mutex::new(statuses), polls: Mutex::new(0), cancel_after_poll: Mutex::new(None) }
    }

    fn poll_count(&self) -> u32 {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl GenerateContent for MockAdapter {
    async fn generate(&self, _request: &GenRequest) -> Result<GenOutcome, GenError> {
        unimplemented!("poll tests never call generate")
    }

    async fn poll(&self, _handle: &OperationHandle) -> Result<PollStatus, GenError> {
        *self.polls.lock().unwrap() += 1;
        let status = if self.statuses.lock().unwrap().is_empty() {
            PollStatus::Pending
        } else {
            self.statuses.lock().unwrap().remove(0)
        };
        if let Some(tx) = self.cancel_after_poll.lock().unwrap().take() {
            let _ = tx.send(true);
        }
        Ok(status)
    }
}

fn handle() -> OperationHandle {
    OperationHandle { name: "models/veo/operations/op-1".into() }
}

fn policy(max_attempts: u32) -> PollPolicy {
    PollPolicy { interval_ms: 1_000, max_attempts, backoff: Backoff::Fixed }
}

// =============================================================================
// completion paths
// =============================================================================

#[tokio::test(start_paused = true)]
async fn pending_then_done_resolves() {
    let adapter = MockAdapter::new(vec![
        PollStatus::Pending,
        PollStatus::Pending,
        PollStatus::Done(GenPayload::Text { text: "clip ready".into() }),
    ]);
    let (_tx, rx) = cancellation();

    let payload = poll_until_done(&adapter, &handle(), policy(10), rx).await.unwrap();
    assert_eq!(payload, GenPayload::Text { text: "clip ready".into() });
    assert_eq!(adapter.poll_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_job_surfaces_error() {
    let adapter = MockAdapter::new(vec![PollStatus::Failed("safety filter".into())]);
    let (_tx, rx) = cancellation();

    let err = poll_until_done(&adapter, &handle(), policy(10), rx).await.unwrap_err();
    assert!(matches!(err, GenError::JobFailed(ref m) if m == "safety filter"));
}

#[tokio::test(start_paused = true)]
async fn attempt_budget_exhaustion_times_out() {
    let adapter = MockAdapter::new(vec![]);
    let (_tx, rx) = cancellation();

    let err = poll_until_done(&adapter, &handle(), policy(4), rx).await.unwrap_err();
    assert!(matches!(err, GenError::PollTimeout { attempts: 4 }));
    assert_eq!(adapter.poll_count(), 4);
}

// =============================================================================
// cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn pre_cancelled_flag_stops_before_first_poll() {
    let adapter = MockAdapter::new(vec![]);
    let (tx, rx) = cancellation();
    tx.send(true).unwrap();

    let err = poll_until_done(&adapter, &handle(), policy(10), rx).await.unwrap_err();
    assert!(matches!(err, GenError::Cancelled));
    assert_eq!(adapter.poll_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn mid_loop_cancellation_stops_the_loop() {
    let adapter = MockAdapter::new(vec![]);
    let (tx, rx) = cancellation();
    *adapter.cancel_after_poll.lock().unwrap() = Some(tx);

    let err = poll_until_done(&adapter, &handle(), policy(10), rx).await.unwrap_err();
    assert!(matches!(err, GenError::Cancelled));
    assert_eq!(adapter.poll_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropped_sender_counts_as_cancelled() {
    let adapter = MockAdapter::new(vec![]);
    let (tx, rx) = cancellation();
    drop(tx);

    let err = poll_until_done(&adapter, &handle(), policy(10), rx).await.unwrap_err();
    assert!(matches!(err, GenError::Cancelled));
    assert_eq!(adapter.poll_count(), 0);
}

// =============================================================================
// delay schedule
// =============================================================================

#[test]
fn fixed_delay_stays_within_jitter_band() {
    let p = PollPolicy { interval_ms: 1_000, max_attempts: 10, backoff: Backoff::Fixed };
    for attempt in 1..=10 {
        let ms = delay_for(p, attempt).as_millis() as u64;
        assert!((875..=1_125).contains(&ms), "attempt {attempt}: {ms}ms out of band");
    }
}

#[test]
fn linear_delay_grows_with_attempt() {
    let p = PollPolicy { interval_ms: 1_000, max_attempts: 10, backoff: Backoff::Linear };
    let ms = delay_for(p, 3).as_millis() as u64;
    assert!((2_625..=3_375).contains(&ms), "attempt 3: {ms}ms out of band");
}

#[test]
fn tiny_interval_skips_jitter() {
    let p = PollPolicy { interval_ms: 4, max_attempts: 1, backoff: Backoff::Fixed };
    assert_eq!(delay_for(p, 1), Duration::from_millis(4));
}
