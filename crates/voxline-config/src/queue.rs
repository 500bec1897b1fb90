use std::time::Duration;

use serde::Deserialize;

/// Work queue configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Queue name that submissions are pushed to and workers listen on
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Storage backend
    #[serde(default)]
    pub storage: QueueStorage,
    /// How long finished or failed jobs stay readable
    #[serde(default = "default_result_ttl", deserialize_with = "crate::duration::deserialize")]
    pub result_ttl: Duration,
    /// Upper bound for a single blocking dequeue; also bounds worker shutdown latency
    #[serde(default = "default_dequeue_timeout", deserialize_with = "crate::duration::deserialize")]
    pub dequeue_timeout: Duration,
    /// How long a running job may outlive its execution deadline before it is failed as abandoned
    #[serde(default = "default_grace_period", deserialize_with = "crate::duration::deserialize")]
    pub grace_period: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            storage: QueueStorage::default(),
            result_ttl: default_result_ttl(),
            dequeue_timeout: default_dequeue_timeout(),
            grace_period: default_grace_period(),
        }
    }
}

/// Queue storage backend
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueStorage {
    /// Process-local storage; jobs do not survive a restart
    Memory,
    /// Redis-backed durable storage shared by servers and workers
    Redis(RedisConfig),
}

impl Default for QueueStorage {
    fn default() -> Self {
        Self::Redis(RedisConfig::default())
    }
}

/// Redis connection settings for the work queue
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prefix for every key written by voxline
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_topic() -> String {
    "tts".to_string()
}

const fn default_result_ttl() -> Duration {
    Duration::from_secs(500)
}

const fn default_dequeue_timeout() -> Duration {
    Duration::from_secs(5)
}

const fn default_grace_period() -> Duration {
    Duration::from_secs(30)
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_key_prefix() -> String {
    "voxline".to_string()
}
