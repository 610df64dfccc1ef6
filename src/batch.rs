//! Batch job submission and status polling.
//!
//! A batch job is submitted as a single multipart upload; the gateway answers
//! with a status URL that the client re-reads on a fixed interval until the
//! job reaches a terminal state. Poll-level transport failures are masked:
//! the tick is skipped and polling continues, so a flaky network never ends
//! job tracking on its own.
//!
//! Unlike the original front-end, polling here runs as a task with an
//! explicit stop capability, so an abandoned job does not poll forever.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::client::Gateway;
use crate::error::Result;
use crate::observability;
use crate::types::{Agent, BatchReceipt, JobState, JobStatus};

/// Wall-clock spacing between status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A source of batch job status reads.
///
/// [`Gateway`] is the production implementation; tests script status
/// sequences through this seam.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Read the job's status URL once.
    async fn job_status(&self, status_url: &str) -> Result<JobStatus>;
}

#[async_trait]
impl StatusSource for Gateway {
    async fn job_status(&self, status_url: &str) -> Result<JobStatus> {
        Gateway::job_status(self, status_url).await
    }
}

/// Terminal outcome of a tracked batch job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The job finished; the result file is available at this URL.
    Completed {
        /// Download URL for the result file, possibly origin-relative.
        result_url: String,
    },
    /// The job failed with the given description.
    Failed {
        /// Server-supplied error text, or a generic fallback.
        message: String,
    },
}

/// Poll a status URL on a fixed interval until a terminal state is observed.
///
/// The first read happens one interval after the call, matching the original
/// client's timer. Non-terminal states (including states this client does not
/// recognize) continue polling unconditionally; so do transport failures.
/// There is no maximum poll count and no timeout; callers wanting an upper
/// bound run this under a [`BatchTracker`] and stop it.
///
/// A `completed` status without a result URL is reported as a failure; there
/// is nothing to link to.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use parlance::{BatchOutcome, JobState, JobStatus, StatusSource, poll_until_terminal};
///
/// struct AlreadyDone;
///
/// #[async_trait::async_trait]
/// impl StatusSource for AlreadyDone {
///     async fn job_status(&self, _status_url: &str) -> parlance::Result<JobStatus> {
///         Ok(JobStatus {
///             status: JobState::Completed,
///             result_url: Some("/results/report.csv".to_string()),
///             error: None,
///         })
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let outcome = poll_until_terminal(
///     &AlreadyDone,
///     "/api/batch_status/engine-1/report",
///     Duration::from_millis(1),
/// )
/// .await;
/// assert_eq!(
///     outcome,
///     BatchOutcome::Completed {
///         result_url: "/results/report.csv".to_string()
///     }
/// );
/// # });
/// ```
pub async fn poll_until_terminal(
    source: &dyn StatusSource,
    status_url: &str,
    interval: Duration,
) -> BatchOutcome {
    let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        observability::POLL_TICKS.click();

        let status = match source.job_status(status_url).await {
            Ok(status) => status,
            Err(_) => {
                // Masked: skipped tick, retried implicitly on the next one.
                observability::POLL_ERRORS.click();
                continue;
            }
        };

        match status.status {
            JobState::Completed => {
                observability::POLL_TERMINALS.click();
                return match status.result_url {
                    Some(result_url) => BatchOutcome::Completed { result_url },
                    None => BatchOutcome::Failed {
                        message: "job completed without a result URL".to_string(),
                    },
                };
            }
            JobState::Failed => {
                observability::POLL_TERMINALS.click();
                return BatchOutcome::Failed {
                    message: status
                        .error
                        .unwrap_or_else(|| "batch job failed".to_string()),
                };
            }
            _ => continue,
        }
    }
}

/// A spawned polling task for one submitted batch job.
///
/// The tracker owns the poll loop. [`BatchTracker::try_outcome`] integrates
/// with an event loop without blocking; [`BatchTracker::wait`] blocks until
/// the job terminates; [`BatchTracker::stop`] abandons tracking.
pub struct BatchTracker {
    label: String,
    status_url: String,
    handle: Option<JoinHandle<BatchOutcome>>,
    stopped: bool,
}

impl BatchTracker {
    /// Spawn a polling task for a submitted job.
    pub fn spawn(
        source: Arc<dyn StatusSource>,
        receipt: &BatchReceipt,
        interval: Duration,
        label: impl Into<String>,
    ) -> Self {
        let status_url = receipt.status_url.clone();
        let poll_url = status_url.clone();
        let handle = tokio::spawn(async move {
            poll_until_terminal(source.as_ref(), &poll_url, interval).await
        });
        Self {
            label: label.into(),
            status_url,
            handle: Some(handle),
            stopped: false,
        }
    }

    /// Human-readable label for this job (typically the uploaded file name).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The status URL being polled.
    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    /// Whether the poll task has ended, by terminal state or by stop.
    pub fn is_finished(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_finished(),
            None => true,
        }
    }

    /// Whether the tracker was stopped before reaching a terminal state.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Stop polling without waiting for a terminal state.
    ///
    /// After a stop, no outcome will be reported for this job.
    pub fn stop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
        self.stopped = true;
    }

    /// Take the outcome if the poll task has already terminated.
    ///
    /// Returns None while polling is still in progress, and None forever
    /// after a stop. The outcome is yielded exactly once.
    pub fn try_outcome(&mut self) -> Option<BatchOutcome> {
        let handle = self.handle.as_mut()?;
        if !handle.is_finished() {
            return None;
        }
        let outcome = match (&mut *handle).now_or_never() {
            Some(Ok(outcome)) => Some(outcome),
            // Aborted (or panicked) poll task: no outcome to report.
            Some(Err(_)) => None,
            None => return None,
        };
        self.handle = None;
        outcome
    }

    /// Wait for the job to reach a terminal state.
    ///
    /// Returns None if the tracker was stopped or the outcome was already
    /// taken.
    pub async fn wait(&mut self) -> Option<BatchOutcome> {
        let handle = self.handle.take()?;
        handle.await.ok()
    }
}

impl Drop for BatchTracker {
    fn drop(&mut self) {
        // A dropped tracker must not leave a poll loop running forever.
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Submit a file from disk and start tracking the resulting job.
///
/// A submission failure surfaces immediately and no poller starts.
pub async fn submit_and_track(
    gateway: &Gateway,
    agent: Agent,
    path: &Path,
    interval: Duration,
) -> Result<BatchTracker> {
    let receipt = gateway.submit_batch_file(agent, path).await?;
    let label = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("batch upload")
        .to_string();
    Ok(BatchTracker::spawn(
        Arc::new(gateway.clone()),
        &receipt,
        interval,
        label,
    ))
}
