use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// SFTP delivery target
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Remote host name or address
    pub host: String,
    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user
    pub username: String,
    /// Login password
    pub password: SecretString,
    /// Absolute directory that files are uploaded into; created when missing
    pub remote_dir: String,
    /// TCP connect and per-operation timeout
    #[serde(default = "default_connect_timeout", deserialize_with = "crate::duration::deserialize")]
    pub connect_timeout: Duration,
}

const fn default_port() -> u16 {
    22
}

const fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}
