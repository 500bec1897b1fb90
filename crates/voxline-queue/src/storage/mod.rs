pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::QueueError,
    job::{Job, JobStatus},
};

/// Durable FIFO-per-topic job storage
///
/// Lifecycle rules live in [`crate::WorkQueue`]; a store only persists
/// records and hands out queued ids in push order.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job record and append its id to the job's topic
    async fn push(&self, job: &Job) -> Result<(), QueueError>;

    /// Remove and return the oldest id on `topic`, waiting up to `wait` for one
    async fn pop(&self, topic: &str, wait: Duration) -> Result<Option<Uuid>, QueueError>;

    /// Read a job record
    async fn load(&self, id: Uuid) -> Result<Option<Job>, QueueError>;

    /// Overwrite a job record, expiring it after `ttl` when given
    async fn save(&self, job: &Job, ttl: Option<Duration>) -> Result<(), QueueError>;

    /// Replace a record with `job` only while the stored record is running
    ///
    /// Returns `false` and leaves the record alone when it is missing or
    /// already terminal. Backends that can check and write atomically
    /// should override this load-then-save default.
    async fn settle(&self, job: &Job, ttl: Duration) -> Result<bool, QueueError> {
        match self.load(job.id).await? {
            Some(stored) if stored.status == JobStatus::Running => {
                self.save(job, Some(ttl)).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
