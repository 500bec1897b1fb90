use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use voxline_core::HttpError;

/// Outcomes of a submission that are not a delivered file
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Missing, empty or oversized text
    #[error("{0}")]
    Validation(String),

    /// The job could not be enqueued
    #[error("queue unavailable: {0}")]
    QueueUnavailable(String),

    /// The worker ran the job and it failed
    #[error("job {job_id} failed: {reason}")]
    JobFailed { job_id: Uuid, reason: String },

    /// The wait budget ran out before the job reached a terminal state
    #[error("timed out waiting for job {job_id}")]
    Timeout { job_id: Uuid },

    /// Unknown or expired job id
    #[error("job not found: {0}")]
    NotFound(Uuid),

    /// Anything else, e.g. the queue failing while being polled
    #[error("internal error: {0}")]
    Internal(String),
}

impl HttpError for SubmissionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::QueueUnavailable(_) | Self::JobFailed { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::QueueUnavailable(_) => "queue_unavailable",
            Self::JobFailed { .. } => "job_failed",
            Self::Timeout { .. } => "timeout",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::QueueUnavailable(_) => "could not enqueue the task".to_string(),
            Self::JobFailed { .. } => "the worker failed to process the task".to_string(),
            Self::Timeout { .. } => "timed out waiting for the task to finish".to_string(),
            Self::NotFound(id) => format!("job {id} not found"),
            Self::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl SubmissionError {
    /// Job the error refers to, when one was enqueued
    pub const fn job_id(&self) -> Option<Uuid> {
        match self {
            Self::JobFailed { job_id, .. } | Self::Timeout { job_id } => Some(*job_id),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<Uuid>,
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        tracing::debug!(error_type = self.error_type(), %status, "request failed");

        (
            status,
            Json(ErrorBody {
                error: self.client_message(),
                job_id: self.job_id(),
            }),
        )
            .into_response()
    }
}
