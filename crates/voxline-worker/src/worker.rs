use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use voxline_core::preview;
use voxline_queue::{Job, JobResult, JobStatus, QueueError, SYNTHESIZE_TASK, WorkQueue};

use crate::{error::PipelineError, pipeline::JobPipeline};

/// Delay before pulling again after the queue backend failed
const BACKOFF: Duration = Duration::from_secs(1);

/// Attempts at persisting a job outcome before it is given up
const COMPLETE_ATTEMPTS: u32 = 4;

/// Pulls jobs from a [`WorkQueue`] and runs them through a [`JobPipeline`]
///
/// One job at a time. A failing job is recorded on the job and never stops
/// the loop.
pub struct Worker {
    name: String,
    queue: WorkQueue,
    pipeline: JobPipeline,
    dequeue_timeout: Duration,
}

impl Worker {
    pub fn new(name: impl Into<String>, queue: WorkQueue, pipeline: JobPipeline, dequeue_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            queue,
            pipeline,
            dequeue_timeout,
        }
    }

    /// Process jobs until `shutdown` is cancelled
    ///
    /// Cancellation is checked between jobs, so a running job always
    /// reaches a terminal state before the worker stops.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(worker = %self.name, topic = %self.queue.topic(), "worker started");

        while !shutdown.is_cancelled() {
            if let Err(e) = self.work_one().await {
                tracing::error!(worker = %self.name, error = %e, "queue error, backing off");

                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(BACKOFF) => {}
                }
            }
        }

        tracing::info!(worker = %self.name, "worker stopped");
    }

    /// Claim and process at most one job
    ///
    /// Returns the terminal status of the processed job, or `None` when the
    /// queue stayed empty for the dequeue timeout.
    pub async fn work_one(&mut self) -> Result<Option<JobStatus>, QueueError> {
        let Some(job) = self.queue.dequeue(&self.name, self.dequeue_timeout).await? else {
            return Ok(None);
        };

        self.process(job).await.map(Some)
    }

    async fn process(&mut self, mut job: Job) -> Result<JobStatus, QueueError> {
        tracing::info!(
            job_id = %job.id,
            text = %preview(&job.input, 30),
            "processing job"
        );

        let started = Instant::now();
        let outcome = self.execute(&job).await;
        let elapsed_ms = started.elapsed().as_millis();

        let outcome = match outcome {
            Ok(result) => {
                tracing::info!(job_id = %job.id, filename = %result.filename, elapsed_ms, "job finished");
                Ok(result)
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, elapsed_ms, "job failed");
                Err(e.to_string())
            }
        };

        self.record(&mut job, outcome).await?;

        Ok(job.status)
    }

    /// Persist the outcome, retrying backend failures with doubling delays
    ///
    /// If every attempt fails the job stays running in the store until it
    /// is failed as abandoned once its deadline and grace period pass.
    async fn record(&mut self, job: &mut Job, outcome: Result<JobResult, String>) -> Result<(), QueueError> {
        let mut delay = BACKOFF;
        let mut attempt = 1;

        loop {
            match self.queue.complete(job, outcome.clone()).await {
                Err(QueueError::Unavailable(e)) if attempt < COMPLETE_ATTEMPTS => {
                    tracing::warn!(job_id = %job.id, attempt, error = %e, "failed to record job outcome, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn execute(&mut self, job: &Job) -> Result<JobResult, PipelineError> {
        if job.task != SYNTHESIZE_TASK {
            return Err(PipelineError::UnknownTask(job.task.clone()));
        }

        if let Ok(outcome) = tokio::time::timeout(job.timeout, self.pipeline.execute(&job.input)).await {
            outcome
        } else {
            // An upload may have been cut off midway
            self.pipeline.reset_channel();
            Err(PipelineError::Timeout(job.timeout))
        }
    }
}
