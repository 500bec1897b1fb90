//! In-process stand-ins for the model, codec, delivery host and job store

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;
use voxline_audio::{AudioError, Codec, SpeechModel, SynthesisStage, TargetFormat, TranscodeStage};
use voxline_config::TranscodeConfig;
use voxline_delivery::{Connection, Connector, DeliveryError, RemoteChannel};
use voxline_queue::{Job, JobStore, MemoryStore, QueueError};

use crate::pipeline::JobPipeline;

/// Returns one 16-bit sample per input byte, optionally after a delay
pub struct ToneModel {
    pub delay: Duration,
}

#[async_trait]
impl SpeechModel for ToneModel {
    fn sample_rate(&self) -> u32 {
        22_050
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AudioError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(text.bytes().flat_map(|b| i16::from(b).to_le_bytes()).collect())
    }
}

pub struct FailingModel;

#[async_trait]
impl SpeechModel for FailingModel {
    fn sample_rate(&self) -> u32 {
        22_050
    }

    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, AudioError> {
        Err(AudioError::Synthesis("voice model crashed".to_string()))
    }
}

/// Emits a fixed-size frame per call
pub struct FrameCodec;

#[async_trait]
impl Codec for FrameCodec {
    async fn encode(&self, wav: &[u8], _target: &TargetFormat) -> Result<Vec<u8>, AudioError> {
        Ok(vec![0xd8; 33 + wav.len() % 7])
    }
}

/// Remote files keyed by name
pub type Files = Arc<Mutex<HashMap<String, Vec<u8>>>>;

pub struct MemoryConnector {
    pub files: Files,
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, DeliveryError> {
        Ok(Box::new(MemoryConnection {
            files: Arc::clone(&self.files),
        }))
    }

    fn host(&self) -> &str {
        "pbx.local"
    }
}

struct MemoryConnection {
    files: Files,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn is_alive(&mut self) -> bool {
        true
    }

    async fn change_dir(&mut self, _dir: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn make_dir(&mut self, _dir: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn write_file(&mut self, name: &str, data: &[u8]) -> Result<(), DeliveryError> {
        self.files.lock().unwrap().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), DeliveryError> {
        let mut files = self.files.lock().unwrap();
        let data = files
            .remove(from)
            .ok_or_else(|| DeliveryError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), data);
        Ok(())
    }

    async fn remove(&mut self, name: &str) -> Result<(), DeliveryError> {
        self.files.lock().unwrap().remove(name);
        Ok(())
    }
}

/// Pipeline over the given model with an in-memory delivery target
pub fn pipeline(model: Arc<dyn SpeechModel>) -> (JobPipeline, Files) {
    let files = Files::default();
    let channel = RemoteChannel::new(
        Box::new(MemoryConnector {
            files: Arc::clone(&files),
        }),
        "/var/lib/asterisk/sounds",
    );

    let pipeline = JobPipeline::new(
        SynthesisStage::new(model),
        TranscodeStage::new(Arc::new(FrameCodec), TargetFormat::from(&TranscodeConfig::default())),
        channel,
        "gsm",
    );

    (pipeline, files)
}

/// Memory store that refuses the next `n` writes of a terminal record
pub struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_outcomes(n: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(n),
        }
    }
}

#[async_trait]
impl JobStore for FlakyStore {
    async fn push(&self, job: &Job) -> Result<(), QueueError> {
        self.inner.push(job).await
    }

    async fn pop(&self, topic: &str, wait: Duration) -> Result<Option<Uuid>, QueueError> {
        self.inner.pop(topic, wait).await
    }

    async fn load(&self, id: Uuid) -> Result<Option<Job>, QueueError> {
        self.inner.load(id).await
    }

    async fn save(&self, job: &Job, ttl: Option<Duration>) -> Result<(), QueueError> {
        if job.status.is_terminal()
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(QueueError::Unavailable("connection reset by peer".into()));
        }
        self.inner.save(job, ttl).await
    }
}
