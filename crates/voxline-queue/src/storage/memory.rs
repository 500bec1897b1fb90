use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;
use uuid::Uuid;

use super::JobStore;
use crate::{
    error::QueueError,
    job::{Job, JobStatus},
};

/// In-process job store
///
/// Shares jobs between tasks of a single process only; nothing survives a
/// restart. Used for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    pushed: Notify,
}

#[derive(Default)]
struct State {
    jobs: HashMap<Uuid, Entry>,
    topics: HashMap<String, VecDeque<Uuid>>,
}

struct Entry {
    job: Job,
    expires_at: Option<Instant>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn try_pop(&self, topic: &str) -> Option<Uuid> {
        self.lock().topics.get_mut(topic).and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn push(&self, job: &Job) -> Result<(), QueueError> {
        {
            let mut state = self.lock();
            state.jobs.insert(
                job.id,
                Entry {
                    job: job.clone(),
                    expires_at: None,
                },
            );
            state.topics.entry(job.topic.clone()).or_default().push_back(job.id);
        }

        self.pushed.notify_waiters();
        Ok(())
    }

    async fn pop(&self, topic: &str, wait: Duration) -> Result<Option<Uuid>, QueueError> {
        let deadline = Instant::now() + wait;

        loop {
            // Register interest before checking so a push in between is not missed
            let pushed = self.pushed.notified();

            if let Some(id) = self.try_pop(topic) {
                return Ok(Some(id));
            }

            if tokio::time::timeout_at(deadline, pushed).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn load(&self, id: Uuid) -> Result<Option<Job>, QueueError> {
        let mut state = self.lock();

        let expired = state
            .jobs
            .get(&id)
            .and_then(|entry| entry.expires_at)
            .is_some_and(|at| at <= Instant::now());

        if expired {
            state.jobs.remove(&id);
            return Ok(None);
        }

        Ok(state.jobs.get(&id).map(|entry| entry.job.clone()))
    }

    async fn save(&self, job: &Job, ttl: Option<Duration>) -> Result<(), QueueError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);

        self.lock().jobs.insert(
            job.id,
            Entry {
                job: job.clone(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn settle(&self, job: &Job, ttl: Duration) -> Result<bool, QueueError> {
        let now = Instant::now();
        let mut state = self.lock();

        let Some(entry) = state.jobs.get_mut(&job.id) else {
            return Ok(false);
        };

        if entry.expires_at.is_some_and(|at| at <= now) || entry.job.status != JobStatus::Running {
            return Ok(false);
        }

        entry.job = job.clone();
        entry.expires_at = Some(now + ttl);

        Ok(true)
    }
}
