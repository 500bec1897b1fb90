use std::time::Duration;

use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;
use voxline_config::SubmissionConfig;
use voxline_core::preview;
use voxline_queue::{JobHandle, JobResult, JobStatus, QueueError, SYNTHESIZE_TASK, WorkQueue};

use crate::error::SubmissionError;

/// Public view of a job for out-of-band status checks
#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Accepts text, enqueues a job and waits a bounded time for its outcome
///
/// The wait is measured from submission and is independent of the execution
/// deadline the worker enforces. Giving up on the wait never cancels the job.
pub struct SubmissionService {
    queue: WorkQueue,
    wait_timeout: Duration,
    poll_interval: Duration,
    job_timeout: Duration,
    max_text_length: usize,
}

impl SubmissionService {
    pub fn new(queue: WorkQueue, config: &SubmissionConfig) -> Self {
        Self {
            queue,
            wait_timeout: config.wait_timeout,
            poll_interval: config.poll_interval,
            job_timeout: config.job_timeout,
            max_text_length: config.max_text_length,
        }
    }

    /// Check the submitted text without touching the queue
    pub fn validate<'a>(&self, text: Option<&'a str>) -> Result<&'a str, SubmissionError> {
        let text = text.ok_or_else(|| SubmissionError::Validation("the 'text' field is required".to_string()))?;

        if text.trim().is_empty() {
            return Err(SubmissionError::Validation(
                "the 'text' field must not be empty".to_string(),
            ));
        }

        if text.chars().count() > self.max_text_length {
            return Err(SubmissionError::Validation(format!(
                "the 'text' field exceeds {} characters",
                self.max_text_length
            )));
        }

        Ok(text)
    }

    /// Submit `text` and wait for the job to finish or fail
    pub async fn submit(&self, text: Option<&str>) -> Result<JobResult, SubmissionError> {
        let text = self.validate(text)?;
        let deadline = Instant::now() + self.wait_timeout;

        // An unresponsive broker must not hold the caller past the wait budget
        let enqueue = self.queue.enqueue(SYNTHESIZE_TASK, text, self.job_timeout);
        let enqueued = tokio::time::timeout_at(deadline, enqueue).await;

        let mut handle = match enqueued {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "failed to enqueue job");
                return Err(SubmissionError::QueueUnavailable(e.to_string()));
            }
            Err(_) => {
                tracing::error!(wait_timeout = ?self.wait_timeout, "queue did not accept the job in time");
                return Err(SubmissionError::QueueUnavailable("enqueue timed out".to_string()));
            }
        };

        let job_id = handle.id();
        tracing::info!(%job_id, text = %preview(text, 30), "job enqueued");

        match tokio::time::timeout_at(deadline, self.wait_for_terminal(&mut handle)).await {
            Err(_) => {
                tracing::warn!(%job_id, wait_timeout = ?self.wait_timeout, "gave up waiting for job");
                Err(SubmissionError::Timeout { job_id })
            }
            Ok(Err(e)) => {
                tracing::error!(%job_id, error = %e, "failed to poll job");
                Err(SubmissionError::Internal(e.to_string()))
            }
            Ok(Ok(JobStatus::Finished)) => handle
                .result()
                .cloned()
                .ok_or_else(|| SubmissionError::Internal(format!("job {job_id} finished without a result"))),
            Ok(Ok(_)) => {
                let reason = handle.error().unwrap_or("unknown error").to_string();
                tracing::warn!(%job_id, %reason, "job failed");
                Err(SubmissionError::JobFailed { job_id, reason })
            }
        }
    }

    /// Current state of a job
    pub async fn job(&self, id: Uuid) -> Result<JobView, SubmissionError> {
        let job = self
            .queue
            .job(id)
            .await
            .map_err(|e| SubmissionError::Internal(e.to_string()))?
            .ok_or(SubmissionError::NotFound(id))?;

        Ok(JobView {
            id: job.id,
            status: job.status,
            result: job.result,
            error: job.error,
        })
    }

    /// Poll until the job is terminal; the first check happens immediately
    async fn wait_for_terminal(&self, handle: &mut JobHandle) -> Result<JobStatus, QueueError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let status = handle.refresh().await?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use voxline_queue::{Job, JobStore, MemoryStore};

    use super::*;

    fn config() -> SubmissionConfig {
        SubmissionConfig {
            wait_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
            job_timeout: Duration::from_secs(120),
            max_text_length: 20,
        }
    }

    fn queue() -> WorkQueue {
        WorkQueue::new(Arc::new(MemoryStore::new()), "tts", Duration::from_secs(500))
    }

    /// Completes the next job after `delay` with the given outcome
    fn fake_worker(queue: WorkQueue, delay: Duration, outcome: Result<JobResult, String>) {
        tokio::spawn(async move {
            let mut job = queue.dequeue("fake", Duration::from_secs(30)).await.unwrap().unwrap();
            tokio::time::sleep(delay).await;
            queue.complete(&mut job, outcome).await.unwrap();
        });
    }

    fn result() -> JobResult {
        JobResult {
            filename: "abc.gsm".into(),
            saved_to: "pbx:/sounds/abc.gsm".into(),
        }
    }

    #[test]
    fn validation_rules() {
        let service = SubmissionService::new(queue(), &config());

        assert!(matches!(service.validate(None), Err(SubmissionError::Validation(_))));
        assert!(matches!(service.validate(Some("")), Err(SubmissionError::Validation(_))));
        assert!(matches!(service.validate(Some("  \t")), Err(SubmissionError::Validation(_))));
        assert!(matches!(
            service.validate(Some("this text is longer than twenty")),
            Err(SubmissionError::Validation(_))
        ));
        assert_eq!(service.validate(Some("Hola mundo")).unwrap(), "Hola mundo");
    }

    #[test]
    fn length_is_counted_in_characters() {
        let service = SubmissionService::new(queue(), &config());
        // 20 characters, more than 20 bytes
        assert!(service.validate(Some("ññññññññññññññññññññ")).is_ok());
    }

    #[tokio::test]
    async fn invalid_text_never_reaches_queue() {
        let queue = queue();
        let service = SubmissionService::new(queue.clone(), &config());

        assert!(service.submit(Some("")).await.is_err());
        assert!(queue.dequeue("w", Duration::ZERO).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_job_returns_result() {
        let queue = queue();
        let service = SubmissionService::new(queue.clone(), &config());
        fake_worker(queue, Duration::from_secs(3), Ok(result()));

        assert_eq!(service.submit(Some("Hola mundo")).await.unwrap(), result());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_is_reported_with_reason() {
        let queue = queue();
        let service = SubmissionService::new(queue.clone(), &config());
        fake_worker(queue, Duration::from_secs(1), Err("transcode: ffmpeg exited".into()));

        match service.submit(Some("Hola mundo")).await.unwrap_err() {
            SubmissionError::JobFailed { reason, .. } => assert_eq!(reason, "transcode: ffmpeg exited"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_budget_is_bounded_and_job_survives() {
        let queue = queue();
        let service = SubmissionService::new(queue.clone(), &config());
        let started = Instant::now();

        let job_id = match service.submit(Some("Hola mundo")).await.unwrap_err() {
            SubmissionError::Timeout { job_id } => job_id,
            other => panic!("unexpected error: {other}"),
        };

        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(60));
        assert!(waited < Duration::from_secs(61));

        // Still queued; a worker can pick it up later
        let view = service.job(job_id).await.unwrap();
        assert_eq!(view.status, JobStatus::Queued);

        let mut job = queue.dequeue("late", Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(job.id, job_id);
        queue.complete(&mut job, Ok(result())).await.unwrap();

        let view = service.job(job_id).await.unwrap();
        assert_eq!(view.status, JobStatus::Finished);
        assert_eq!(view.result, Some(result()));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let service = SubmissionService::new(queue(), &config());
        assert!(matches!(
            service.job(Uuid::new_v4()).await,
            Err(SubmissionError::NotFound(_))
        ));
    }

    struct DownStore;

    #[async_trait]
    impl JobStore for DownStore {
        async fn push(&self, _job: &Job) -> Result<(), QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }

        async fn pop(&self, _topic: &str, _wait: Duration) -> Result<Option<Uuid>, QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }

        async fn load(&self, _id: Uuid) -> Result<Option<Job>, QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }

        async fn save(&self, _job: &Job, _ttl: Option<Duration>) -> Result<(), QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }
    }

    /// Accepts connections but never answers
    struct BlackholeStore;

    #[async_trait]
    impl JobStore for BlackholeStore {
        async fn push(&self, _job: &Job) -> Result<(), QueueError> {
            std::future::pending().await
        }

        async fn pop(&self, _topic: &str, _wait: Duration) -> Result<Option<Uuid>, QueueError> {
            std::future::pending().await
        }

        async fn load(&self, _id: Uuid) -> Result<Option<Job>, QueueError> {
            std::future::pending().await
        }

        async fn save(&self, _job: &Job, _ttl: Option<Duration>) -> Result<(), QueueError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_broker_is_bounded_by_wait_budget() {
        let queue = WorkQueue::new(Arc::new(BlackholeStore), "tts", Duration::from_secs(500));
        let service = SubmissionService::new(queue, &config());
        let started = Instant::now();

        assert!(matches!(
            service.submit(Some("Hola mundo")).await,
            Err(SubmissionError::QueueUnavailable(_))
        ));
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(60));
        assert!(waited < Duration::from_secs(61));
    }

    #[tokio::test]
    async fn broker_down_fails_before_polling() {
        let queue = WorkQueue::new(Arc::new(DownStore), "tts", Duration::from_secs(500));
        let service = SubmissionService::new(queue, &config());

        assert!(matches!(
            service.submit(Some("Hola mundo")).await,
            Err(SubmissionError::QueueUnavailable(_))
        ));
    }
}
