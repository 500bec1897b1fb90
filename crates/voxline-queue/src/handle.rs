use uuid::Uuid;

use crate::{
    error::QueueError,
    job::{Job, JobResult, JobStatus},
    queue::WorkQueue,
};

/// Caller-side view of a job that can be refreshed from the store
pub struct JobHandle {
    queue: WorkQueue,
    job: Job,
}

impl JobHandle {
    pub(crate) const fn new(queue: WorkQueue, job: Job) -> Self {
        Self { queue, job }
    }

    pub const fn id(&self) -> Uuid {
        self.job.id
    }

    /// Status as of the last refresh
    pub const fn status(&self) -> JobStatus {
        self.job.status
    }

    /// Re-read the job from the store and return its current status
    ///
    /// A job whose record disappeared (expired) yields [`QueueError::NotFound`].
    pub async fn refresh(&mut self) -> Result<JobStatus, QueueError> {
        let id = self.job.id;
        self.job = self.queue.job(id).await?.ok_or(QueueError::NotFound(id))?;
        Ok(self.job.status)
    }

    /// Pipeline result; only present once the job finished
    pub fn result(&self) -> Option<&JobResult> {
        match self.job.status {
            JobStatus::Finished => self.job.result.as_ref(),
            _ => None,
        }
    }

    /// Failure summary; only present once the job failed
    pub fn error(&self) -> Option<&str> {
        match self.job.status {
            JobStatus::Failed => self.job.error.as_deref(),
            _ => None,
        }
    }
}
