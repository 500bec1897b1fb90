use thiserror::Error;
use uuid::Uuid;

use crate::job::JobStatus;

/// Work queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Backing store unreachable or a command failed
    #[error("queue backend unavailable: {0}")]
    Unavailable(String),

    /// Stored job record could not be encoded or decoded
    #[error("job serialization: {0}")]
    Serialization(String),

    /// Job id unknown or its record expired
    #[error("job not found: {0}")]
    NotFound(Uuid),

    /// Lifecycle violation, e.g. finishing a job that already failed
    #[error("job {id} cannot move from {from} to {to}")]
    InvalidTransition { id: Uuid, from: JobStatus, to: JobStatus },
}
