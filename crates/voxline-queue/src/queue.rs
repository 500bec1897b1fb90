use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use uuid::Uuid;
use voxline_config::{QueueConfig, QueueStorage};

use crate::{
    error::QueueError,
    handle::JobHandle,
    job::{Job, JobResult, JobStatus},
    storage::{JobStore, memory::MemoryStore, redis::RedisStore},
};

/// Slack past a job's execution deadline before it counts as abandoned
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// A named FIFO job queue over a [`JobStore`]
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct WorkQueue {
    store: Arc<dyn JobStore>,
    topic: String,
    result_ttl: Duration,
    grace_period: Duration,
}

impl WorkQueue {
    pub fn new(store: Arc<dyn JobStore>, topic: impl Into<String>, result_ttl: Duration) -> Self {
        Self {
            store,
            topic: topic.into(),
            result_ttl,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// How long a running job may outlive its deadline before it is failed
    #[must_use]
    pub const fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Build a queue from configuration
    pub fn from_config(config: &QueueConfig) -> Result<Self, QueueError> {
        let store: Arc<dyn JobStore> = match &config.storage {
            QueueStorage::Memory => {
                tracing::warn!("using in-memory job storage; queued jobs will not survive a restart");
                Arc::new(MemoryStore::new())
            }
            QueueStorage::Redis(redis) => Arc::new(RedisStore::new(&redis.url, redis.key_prefix.clone())?),
        };

        Ok(Self::new(store, config.topic.clone(), config.result_ttl).with_grace_period(config.grace_period))
    }

    /// Queue name
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Push a new job running `task` on `payload`
    ///
    /// `timeout` is the execution deadline the worker enforces once it picks
    /// the job up; time spent waiting in the queue does not count.
    pub async fn enqueue(&self, task: &str, payload: &str, timeout: Duration) -> Result<JobHandle, QueueError> {
        let job = Job::new(self.topic.as_str(), task, payload, timeout);
        self.store.push(&job).await?;

        tracing::debug!(job_id = %job.id, topic = %self.topic, task, "job enqueued");

        Ok(JobHandle::new(self.clone(), job))
    }

    /// Read a job by id
    ///
    /// A running job found past its deadline plus the grace period lost its
    /// worker or its outcome; it is failed and persisted before returning.
    /// If its outcome lands first, that outcome is returned instead.
    pub async fn job(&self, id: Uuid) -> Result<Option<Job>, QueueError> {
        let Some(mut job) = self.store.load(id).await? else {
            return Ok(None);
        };

        if job.is_abandoned(Timestamp::now(), self.grace_period) {
            tracing::warn!(job_id = %id, worker = ?job.worker, timeout = ?job.timeout, "running job overdue, failing it");
            job.expire()?;

            if !self.store.settle(&job, self.result_ttl).await? {
                return self.store.load(id).await;
            }
        }

        Ok(Some(job))
    }

    /// Claim the next queued job for `worker`, waiting up to `wait`
    ///
    /// The claimed job is persisted as running before it is returned. The
    /// running record expires on its own if nobody ever reads or completes
    /// it. Ids whose record expired or that are no longer queued are skipped.
    pub async fn dequeue(&self, worker: &str, wait: Duration) -> Result<Option<Job>, QueueError> {
        let Some(id) = self.store.pop(&self.topic, wait).await? else {
            return Ok(None);
        };

        let Some(mut job) = self.store.load(id).await? else {
            tracing::warn!(job_id = %id, "dequeued job has no record, skipping");
            return Ok(None);
        };

        if job.status != JobStatus::Queued {
            tracing::warn!(job_id = %id, status = %job.status, "dequeued job is not queued, skipping");
            return Ok(None);
        }

        job.start(worker)?;
        let ttl = job
            .timeout
            .saturating_add(self.grace_period)
            .saturating_add(self.result_ttl);
        self.store.save(&job, Some(ttl)).await?;

        Ok(Some(job))
    }

    /// Record the terminal outcome of a running job
    ///
    /// `job` is only updated once the record is saved, so a failed call can
    /// be retried. The save only applies while the stored record is still
    /// running; one that was failed as abandoned in the meantime is never
    /// overwritten. Terminal records expire after the configured result TTL.
    pub async fn complete(&self, job: &mut Job, outcome: Result<JobResult, String>) -> Result<(), QueueError> {
        let mut done = job.clone();
        match outcome {
            Ok(result) => done.finish(result)?,
            Err(error) => done.fail(error)?,
        }

        if !self.store.settle(&done, self.result_ttl).await? {
            let from = self
                .store
                .load(job.id)
                .await?
                .ok_or(QueueError::NotFound(job.id))?
                .status;

            return Err(QueueError::InvalidTransition {
                id: job.id,
                from,
                to: done.status,
            });
        }

        *job = done;

        Ok(())
    }
}
