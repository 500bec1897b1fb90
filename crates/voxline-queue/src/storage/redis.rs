use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::JobStore;
use crate::{error::QueueError, job::Job};

/// Write `ARGV[1]` with a TTL of `ARGV[2]` seconds over `KEYS[1]` while the
/// stored record is still running
const SETTLE_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[1])
if not current or cjson.decode(current).status ~= 'running' then
    return 0
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
return 1
";

/// Redis-backed durable job store
///
/// Job records are JSON strings under `{prefix}:job:{id}`; each topic is a
/// list `{prefix}:queue:{topic}` that is appended with `RPUSH` and drained
/// with `BLPOP`, giving FIFO order across all workers.
///
/// Connections are established on first use. Until Redis answers, every
/// call fails with [`QueueError::Unavailable`] and the next call retries;
/// once connected, the connection manager reconnects on its own. Blocking
/// pops get their own connection so they never stall status reads.
pub struct RedisStore {
    client: redis::Client,
    commands: OnceCell<ConnectionManager>,
    blocking: OnceCell<ConnectionManager>,
    settle: redis::Script,
    key_prefix: String,
}

impl RedisStore {
    /// Create a store for the given Redis URL
    ///
    /// Only the URL is validated here; no connection is made.
    pub fn new(url: &str, key_prefix: impl Into<String>) -> Result<Self, QueueError> {
        let client =
            redis::Client::open(url).map_err(|e| QueueError::Unavailable(format!("invalid Redis URL: {e}")))?;

        Ok(Self {
            client,
            commands: OnceCell::new(),
            blocking: OnceCell::new(),
            settle: redis::Script::new(SETTLE_SCRIPT),
            key_prefix: key_prefix.into(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, QueueError> {
        self.connect(&self.commands).await
    }

    async fn connect(&self, cell: &OnceCell<ConnectionManager>) -> Result<ConnectionManager, QueueError> {
        let manager = cell
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| QueueError::Unavailable(format!("failed to connect to Redis: {e}")))?;
                tracing::info!(prefix = %self.key_prefix, "connected to Redis");
                Ok::<_, QueueError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }

    fn job_key(&self, id: Uuid) -> String {
        format!("{}:job:{id}", self.key_prefix)
    }

    fn queue_key(&self, topic: &str) -> String {
        format!("{}:queue:{topic}", self.key_prefix)
    }
}

fn encode(job: &Job) -> Result<String, QueueError> {
    serde_json::to_string(job).map_err(|e| QueueError::Serialization(format!("serialize job {}: {e}", job.id)))
}

#[async_trait]
impl JobStore for RedisStore {
    async fn push(&self, job: &Job) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        let data = encode(job)?;

        // Record and queue entry land together or not at all
        let () = redis::pipe()
            .atomic()
            .set(self.job_key(job.id), data)
            .ignore()
            .rpush(self.queue_key(&job.topic), job.id.to_string())
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| QueueError::Unavailable(format!("enqueue failed: {e}")))?;

        Ok(())
    }

    async fn pop(&self, topic: &str, wait: Duration) -> Result<Option<Uuid>, QueueError> {
        let mut conn = self.connect(&self.blocking).await?;

        // BLPOP treats 0 as "block forever"
        let timeout = wait.as_secs_f64().max(0.01);

        let popped: Option<(String, String)> = conn
            .blpop(self.queue_key(topic), timeout)
            .await
            .map_err(|e| QueueError::Unavailable(format!("BLPOP failed: {e}")))?;

        popped
            .map(|(_, id)| {
                Uuid::parse_str(&id).map_err(|e| QueueError::Serialization(format!("queued id '{id}': {e}")))
            })
            .transpose()
    }

    async fn load(&self, id: Uuid) -> Result<Option<Job>, QueueError> {
        let mut conn = self.connection().await?;

        let data: Option<String> = conn
            .get(self.job_key(id))
            .await
            .map_err(|e| QueueError::Unavailable(format!("GET failed: {e}")))?;

        data.map(|data| {
            serde_json::from_str(&data).map_err(|e| QueueError::Serialization(format!("deserialize job {id}: {e}")))
        })
        .transpose()
    }

    async fn save(&self, job: &Job, ttl: Option<Duration>) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        let key = self.job_key(job.id);
        let data = encode(job)?;

        let () = match ttl {
            Some(ttl) => conn.set_ex(key, data, ttl.as_secs().max(1)).await,
            None => conn.set(key, data).await,
        }
        .map_err(|e| QueueError::Unavailable(format!("SET failed: {e}")))?;

        Ok(())
    }

    async fn settle(&self, job: &Job, ttl: Duration) -> Result<bool, QueueError> {
        let mut conn = self.connection().await?;
        let data = encode(job)?;

        let written: i32 = self
            .settle
            .key(self.job_key(job.id))
            .arg(data)
            .arg(ttl.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| QueueError::Unavailable(format!("settle failed: {e}")))?;

        Ok(written == 1)
    }
}
