//! Generic async retry executor

use std::future::Future;

use mapvault_domain::Result;
use tracing::{debug, warn};

use super::{LinearBackoff, RetryPolicy};
use crate::events::{ProgressSink, ProgressUpdate};

/// Message surfaced as a progress note before each granted retry.
const RETRY_NOTE: &str = "Network problem... will retry shortly";

/// Repeats an asynchronous operation until it succeeds or the policy says
/// stop.
///
/// On failure the policy is consulted; if it grants a retry, a "retrying"
/// progress note is emitted and the next backoff delay is awaited before the
/// operation runs again. Otherwise the last error is propagated unchanged,
/// preserving its reason for the orchestrator to classify. Progress from the
/// operation itself flows through the shared [`ProgressSink`] untouched.
pub struct RetryExecutor<P> {
    policy: P,
    backoff: LinearBackoff,
    progress: ProgressSink,
}

impl<P: RetryPolicy> RetryExecutor<P> {
    pub fn new(policy: P, backoff: LinearBackoff, progress: ProgressSink) -> Self {
        Self { policy, backoff, progress }
    }

    /// Execute `operation`, retrying per the policy and backoff.
    pub async fn execute<F, Fut, T>(mut self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !self.policy.should_retry(&error) {
                        debug!(attempt, reason = %error.kind(), "not retrying");
                        return Err(error);
                    }
                    let delay = self.backoff.next_delay();
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %error,
                        "operation failed, retrying");
                    self.progress.report(ProgressUpdate::note(RETRY_NOTE));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use mapvault_domain::{FailureKind, MapVaultError};

    use super::*;
    use crate::resilience::TransientRetry;

    fn executor(budget: u32) -> RetryExecutor<TransientRetry> {
        RetryExecutor::new(
            TransientRetry::new(budget),
            LinearBackoff::with_increment(Duration::from_millis(1)),
            ProgressSink::noop(),
        )
    }

    #[tokio::test]
    async fn resolves_with_the_first_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result = executor(5)
            .execute(|| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn budget_of_n_means_n_plus_one_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<()> = executor(3)
            .execute(|| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(MapVaultError::Network("connection reset".into()))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), FailureKind::NetworkError);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_transient_failure_stops_immediately() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<()> = executor(5)
            .execute(|| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(MapVaultError::NotAuthenticated("token expired".into()))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), FailureKind::NotAuthenticated);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result = executor(5)
            .execute(|| {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(MapVaultError::Network("flaky".into()))
                    } else {
                        Ok("loaded")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "loaded");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn emits_a_retry_note_per_granted_retry() {
        let notes: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_notes = Arc::clone(&notes);
        let sink = ProgressSink::new(move |update| {
            sink_notes.lock().unwrap().push(update.message());
        });

        let executor = RetryExecutor::new(
            TransientRetry::new(2),
            LinearBackoff::with_increment(Duration::from_millis(1)),
            sink,
        );

        let _: Result<()> = executor
            .execute(|| async { Err(MapVaultError::Network("down".into())) })
            .await;

        assert_eq!(notes.lock().unwrap().as_slice(), [RETRY_NOTE, RETRY_NOTE]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_out_the_linear_backoff_sequence() {
        let start = tokio::time::Instant::now();

        let executor = RetryExecutor::new(
            TransientRetry::new(3),
            LinearBackoff::new(),
            ProgressSink::noop(),
        );
        let _: Result<()> = executor
            .execute(|| async { Err(MapVaultError::Network("down".into())) })
            .await;

        // 1000 + 2000 + 3000 ms of virtual time across the three retries.
        assert_eq!(start.elapsed(), Duration::from_millis(6000));
    }
}
