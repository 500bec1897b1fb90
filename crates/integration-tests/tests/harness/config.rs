//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use voxline_config::{Config, HealthConfig, QueueConfig, QueueStorage, ServerConfig, SubmissionConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// In-memory queue, loopback listener and short timings
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: SocketAddr::from(([127, 0, 0, 1], 0)),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                queue: QueueConfig {
                    storage: QueueStorage::Memory,
                    dequeue_timeout: Duration::from_millis(50),
                    ..QueueConfig::default()
                },
                submission: SubmissionConfig {
                    wait_timeout: Duration::from_secs(5),
                    poll_interval: Duration::from_millis(20),
                    job_timeout: Duration::from_secs(5),
                    ..SubmissionConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// How long a submission waits for its job
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.submission.wait_timeout = timeout;
        self
    }

    /// Execution deadline stamped on new jobs
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.config.submission.job_timeout = timeout;
        self
    }

    pub fn with_max_text_length(mut self, max: usize) -> Self {
        self.config.submission.max_text_length = max;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
