use std::fmt;
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QueueError;

/// Task name of text-to-speech jobs
pub const SYNTHESIZE_TASK: &str = "tts.synthesize";

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

impl JobStatus {
    /// Finished and failed jobs never change again
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Finished => write!(f, "finished"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Where a finished job's audio ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    /// Generated object name on the remote host
    pub filename: String,
    /// `host:/remote/dir/filename`
    pub saved_to: String,
}

/// A unit of work as stored in the queue backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    /// Queue the job was pushed to
    pub topic: String,
    /// Task the worker should run for this job
    pub task: String,
    /// Text to synthesize
    pub input: String,
    pub status: JobStatus,
    /// Present only when finished
    pub result: Option<JobResult>,
    /// Present only when failed
    pub error: Option<String>,
    /// Execution deadline enforced by the worker
    pub timeout: Duration,
    pub enqueued_at: Timestamp,
    pub started_at: Option<Timestamp>,
    /// `started_at + timeout`; set while running
    #[serde(default)]
    pub deadline_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    /// Name of the worker that claimed the job
    pub worker: Option<String>,
}

impl Job {
    /// Create a queued job with a fresh id
    pub fn new(topic: impl Into<String>, task: impl Into<String>, input: impl Into<String>, timeout: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            task: task.into(),
            input: input.into(),
            status: JobStatus::Queued,
            result: None,
            error: None,
            timeout,
            enqueued_at: Timestamp::now(),
            started_at: None,
            deadline_at: None,
            ended_at: None,
            worker: None,
        }
    }

    /// Claim the job for a worker
    pub fn start(&mut self, worker: &str) -> Result<(), QueueError> {
        self.transition(JobStatus::Running)?;
        let now = Timestamp::now();
        self.worker = Some(worker.to_string());
        self.started_at = Some(now);
        self.deadline_at = SignedDuration::try_from(self.timeout)
            .ok()
            .and_then(|timeout| now.checked_add(timeout).ok());
        Ok(())
    }

    /// Whether a running job is still running `grace` after its deadline
    ///
    /// Such a job lost its worker or its outcome; nothing will finish it.
    pub fn is_abandoned(&self, now: Timestamp, grace: Duration) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }

        let Some(grace) = SignedDuration::try_from(grace).ok() else {
            return false;
        };

        self.deadline_at
            .and_then(|deadline| deadline.checked_add(grace).ok())
            .is_some_and(|cutoff| cutoff <= now)
    }

    /// Fail a job that ran out of time
    pub fn expire(&mut self) -> Result<(), QueueError> {
        let error = format!("job exceeded execution timeout of {:?}", self.timeout);
        self.fail(error)
    }

    /// Record a successful pipeline run
    pub fn finish(&mut self, result: JobResult) -> Result<(), QueueError> {
        self.transition(JobStatus::Finished)?;
        self.result = Some(result);
        self.ended_at = Some(Timestamp::now());
        Ok(())
    }

    /// Record a failed pipeline run
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), QueueError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(error.into());
        self.ended_at = Some(Timestamp::now());
        Ok(())
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), QueueError> {
        let allowed = matches!(
            (self.status, to),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Finished | JobStatus::Failed)
        );

        if !allowed {
            return Err(QueueError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }

        self.status = to;
        Ok(())
    }
}
