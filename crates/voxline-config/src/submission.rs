use std::time::Duration;

use serde::Deserialize;

/// Settings for the synchronous-over-asynchronous submission endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmissionConfig {
    /// How long a caller waits for a terminal job state, measured from submission
    #[serde(default = "default_wait_timeout", deserialize_with = "crate::duration::deserialize")]
    pub wait_timeout: Duration,
    /// Delay between two job status checks
    #[serde(default = "default_poll_interval", deserialize_with = "crate::duration::deserialize")]
    pub poll_interval: Duration,
    /// Execution deadline a worker enforces on each job
    #[serde(default = "default_job_timeout", deserialize_with = "crate::duration::deserialize")]
    pub job_timeout: Duration,
    /// Longest accepted text, in characters
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            wait_timeout: default_wait_timeout(),
            poll_interval: default_poll_interval(),
            job_timeout: default_job_timeout(),
            max_text_length: default_max_text_length(),
        }
    }
}

const fn default_wait_timeout() -> Duration {
    Duration::from_secs(60)
}

const fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

const fn default_job_timeout() -> Duration {
    Duration::from_secs(120)
}

const fn default_max_text_length() -> usize {
    5000
}
