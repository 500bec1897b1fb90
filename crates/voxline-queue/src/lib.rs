#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod handle;
mod job;
mod queue;
pub mod storage;

pub use error::QueueError;
pub use handle::JobHandle;
pub use job::{Job, JobResult, JobStatus, SYNTHESIZE_TASK};
pub use queue::WorkQueue;
pub use storage::{JobStore, memory::MemoryStore, redis::RedisStore};
