//! Waits for a background index job by re-reading the job snapshot on a
//! fixed schedule.
//!
//! Each tick fetches the whole `index_status` table and looks the job up by
//! key. A job that is not in the table yet counts as "not ready". Failed
//! fetches are logged and retried on the next tick; only the deadline, an
//! `error` status, a terminal status or a cancel ends the poll. Fetches never
//! overlap: a tick's request is awaited before the next tick is taken, and
//! ticks missed while a slow request was in flight are skipped. A request
//! still in flight at the deadline is dropped and the poll times out.

use portal_client::{config, JobStatusSource};
use portal_model::{IndexJob, JobStatus};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const DEFAULT_FAILURE_MESSAGE: &str = "Index job failed";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("Index build timed out")]
    TimedOut,
    #[error("{0}")]
    JobFailed(String),
    #[error("polling cancelled")]
    Cancelled,
    #[error("job id must not be empty")]
    InvalidJobId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: config::poll_interval(),
            timeout: config::poll_timeout(),
        }
    }
}

impl PollSettings {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            timeout,
        }
    }
}

#[derive(Clone)]
pub struct JobPoller {
    source: Arc<dyn JobStatusSource>,
    settings: PollSettings,
}

impl JobPoller {
    pub fn new(source: Arc<dyn JobStatusSource>) -> Self {
        Self {
            source,
            settings: PollSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = PollSettings::new(settings.interval, settings.timeout);
        self
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Polls on the caller's task until the job settles.
    pub async fn wait_for(&self, job_id: &str) -> Result<IndexJob, PollError> {
        validate(job_id)?;
        poll_until_settled(self.source.as_ref(), job_id, self.settings).await
    }

    /// Polls on a background task. The returned handle can cancel the poll;
    /// dropping it stops the task as well.
    pub fn spawn(&self, job_id: impl Into<String>) -> Result<PollHandle, PollError> {
        let job_id = job_id.into();
        validate(&job_id)?;
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let source = self.source.clone();
        let settings = self.settings;
        let id = job_id.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                outcome = poll_until_settled(source.as_ref(), &id, settings) => outcome,
                Ok(()) = &mut cancel_rx => {
                    info!(target: "engine::poller", "polling for job {} cancelled", id);
                    Err(PollError::Cancelled)
                }
            }
        });
        Ok(PollHandle {
            job_id,
            cancel: Some(cancel_tx),
            task: Some(task),
        })
    }
}

pub struct PollHandle {
    job_id: String,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<IndexJob, PollError>>>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stops polling. A later `wait` yields [`PollError::Cancelled`] unless the
    /// job had already settled.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Outcome of the poll. Dropping the returned future stops the poll just
    /// like dropping the handle.
    pub async fn wait(mut self) -> Result<IndexJob, PollError> {
        let Some(task) = self.task.as_mut() else {
            return Err(PollError::Cancelled);
        };
        let joined = task.await;
        self.task = None;
        match joined {
            Ok(outcome) => outcome,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(PollError::Cancelled),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn validate(job_id: &str) -> Result<(), PollError> {
    if job_id.trim().is_empty() {
        return Err(PollError::InvalidJobId);
    }
    Ok(())
}

async fn poll_until_settled(
    source: &dyn JobStatusSource,
    job_id: &str,
    settings: PollSettings,
) -> Result<IndexJob, PollError> {
    let start = Instant::now();
    let deadline = start + settings.timeout;
    let mut ticker = interval_at(start + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let timed_out = || {
        warn!(
            target: "engine::poller",
            "job {} not settled after {:?}",
            job_id,
            settings.timeout
        );
        PollError::TimedOut
    };

    loop {
        ticker.tick().await;
        if start.elapsed() > settings.timeout {
            return Err(timed_out());
        }

        let snapshot = match timeout_at(deadline, source.index_status()).await {
            Err(_) => return Err(timed_out()),
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(err)) => {
                warn!(target: "engine::poller", "index status fetch failed: {}", err);
                continue;
            }
        };

        let Some(job) = snapshot.job(job_id) else {
            debug!(target: "engine::poller", "job {} not in snapshot yet", job_id);
            continue;
        };

        match &job.status {
            JobStatus::Pending | JobStatus::Running => {
                info!(target: "engine::poller", "job {} {}", job_id, job.status);
            }
            JobStatus::Error => {
                let message = job
                    .error
                    .clone()
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                warn!(target: "engine::poller", "job {} failed: {}", job_id, message);
                return Err(PollError::JobFailed(message));
            }
            status => {
                info!(target: "engine::poller", "job {} finished with {}", job_id, status);
                return Ok(job.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portal_client::{ApiError, StatusCode};
    use portal_model::IndexStatus;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn server_error() -> ApiError {
        ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error_id: None,
        }
    }

    /// Replays canned snapshots; the last one repeats forever.
    struct Scripted {
        steps: Mutex<VecDeque<Result<IndexStatus, ApiError>>>,
        last: Mutex<Option<IndexStatus>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl Scripted {
        fn new(steps: Vec<Result<IndexStatus, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                last: Mutex::new(None),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            })
        }

        fn slow(steps: Vec<Result<IndexStatus, ApiError>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                last: Mutex::new(None),
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobStatusSource for Scripted {
        async fn index_status(&self) -> Result<IndexStatus, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.steps.lock().unwrap().pop_front();
            match next {
                Some(Ok(snapshot)) => {
                    *self.last.lock().unwrap() = Some(snapshot.clone());
                    Ok(snapshot)
                }
                Some(Err(err)) => Err(err),
                None => Ok(self.last.lock().unwrap().clone().unwrap_or_default()),
            }
        }
    }

    fn snapshot(job_id: &str, job: serde_json::Value) -> IndexStatus {
        serde_json::from_value(json!({ "jobs": { job_id: job } })).unwrap()
    }

    fn empty() -> IndexStatus {
        serde_json::from_value(json!({ "jobs": {} })).unwrap()
    }

    fn poller(source: Arc<Scripted>, interval_ms: u64, timeout_ms: u64) -> JobPoller {
        JobPoller::new(source).with_settings(PollSettings::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_after_running_ticks() {
        let mut steps: Vec<_> = (0..5)
            .map(|_| Ok(snapshot("job-123", json!({"status": "running"}))))
            .collect();
        steps.push(Ok(snapshot(
            "job-123",
            json!({"status": "completed", "result": {"count": 42}}),
        )));
        let source = Scripted::new(steps);
        let started = Instant::now();

        let job = poller(source.clone(), 10, 100)
            .wait_for("job-123")
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result, Some(json!({"count": 42})));
        assert_eq!(source.calls(), 6);
        assert!(started.elapsed() <= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn no_fetch_after_resolution() {
        let source = Scripted::new(vec![Ok(snapshot("j", json!({"status": "completed"})))]);
        let handle = poller(source.clone(), 10, 1_000).spawn("j").unwrap();
        handle.wait().await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn error_status_uses_server_message() {
        let source = Scripted::new(vec![Ok(snapshot(
            "j",
            json!({"status": "error", "error": "disk full"}),
        ))]);
        let err = poller(source, 10, 100).wait_for("j").await.unwrap_err();
        assert_eq!(err, PollError::JobFailed("disk full".into()));
        assert_eq!(err.to_string(), "disk full");
    }

    #[tokio::test(start_paused = true)]
    async fn error_status_without_message_is_generic() {
        let source = Scripted::new(vec![Ok(snapshot("j", json!({"status": "error"})))]);
        let err = poller(source, 10, 100).wait_for("j").await.unwrap_err();
        assert_eq!(err.to_string(), "Index job failed");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_terminal_status_resolves() {
        let source = Scripted::new(vec![Ok(snapshot("j", json!({"status": "cancelled"})))]);
        let job = poller(source, 10, 100).wait_for("j").await.unwrap();
        assert_eq!(job.status, JobStatus::Other("cancelled".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn job_without_status_resolves() {
        let source = Scripted::new(vec![Ok(snapshot("j", json!({"result": {"count": 1}})))]);
        let job = poller(source.clone(), 10, 100).wait_for("j").await.unwrap();
        assert_eq!(job.result, Some(json!({"count": 1})));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_sibling_job_does_not_block_resolution() {
        let table: IndexStatus = serde_json::from_value(json!({
            "jobs": {
                "stale": {"status": 17},
                "broken": [],
                "j": {"status": "completed", "result": {"count": 4}}
            }
        }))
        .unwrap();
        let source = Scripted::new(vec![Ok(table)]);
        let job = poller(source, 10, 100).wait_for("j").await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_is_cut_off_at_the_deadline() {
        let source = Scripted::slow(
            vec![Ok(snapshot("j", json!({"status": "running"})))],
            Duration::from_secs(5),
        );
        let started = Instant::now();
        let err = poller(source.clone(), 10, 100).wait_for("j").await.unwrap_err();
        assert_eq!(err, PollError::TimedOut);
        assert!(started.elapsed() <= Duration::from_millis(100));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_job_times_out_and_stops() {
        let source = Scripted::new(vec![Ok(empty())]);
        let started = Instant::now();
        let handle = poller(source.clone(), 10, 100).spawn("job-123").unwrap();
        let err = handle.wait().await.unwrap_err();

        assert_eq!(err, PollError::TimedOut);
        assert_eq!(err.to_string(), "Index build timed out");
        assert!(started.elapsed() > Duration::from_millis(100));
        let calls = source.calls();
        assert_eq!(calls, 10);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_is_retried() {
        let source = Scripted::new(vec![
            Err(server_error()),
            Err(server_error()),
            Ok(snapshot("j", json!({"status": "completed"}))),
        ]);
        let job = poller(source.clone(), 10, 100).wait_for("j").await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_keeps_the_poll_open() {
        let source = Scripted::new(vec![Ok(snapshot("j", json!({"status": "pending"})))]);
        let handle = poller(source.clone(), 10, 10_000).spawn("j").unwrap();
        tokio::time::sleep(Duration::from_millis(55)).await;
        assert!(!handle.is_finished());
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetches_never_overlap() {
        let source = Scripted::slow(
            vec![
                Ok(snapshot("j", json!({"status": "running"}))),
                Ok(snapshot("j", json!({"status": "running"}))),
                Ok(snapshot("j", json!({"status": "completed"}))),
            ],
            Duration::from_millis(35),
        );
        let job = poller(source.clone(), 10, 1_000).wait_for("j").await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_polling() {
        let source = Scripted::new(vec![Ok(snapshot("j", json!({"status": "running"})))]);
        let mut handle = poller(source.clone(), 10, 10_000).spawn("j").unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        handle.cancel();
        assert_eq!(handle.wait().await.unwrap_err(), PollError::Cancelled);
        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_polling() {
        let source = Scripted::new(vec![Ok(snapshot("j", json!({"status": "running"})))]);
        let handle = poller(source.clone(), 10, 10_000).spawn("j").unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        drop(handle);
        tokio::task::yield_now().await;
        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn empty_job_id_is_rejected() {
        let source = Scripted::new(vec![]);
        let poller = poller(source.clone(), 10, 100);
        assert_eq!(poller.wait_for("  ").await.unwrap_err(), PollError::InvalidJobId);
        assert!(matches!(poller.spawn(""), Err(PollError::InvalidJobId)));
        assert_eq!(source.calls(), 0);
    }
}
