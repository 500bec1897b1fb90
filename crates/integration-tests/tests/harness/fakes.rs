//! Stand-ins for the voice model, the codec and the delivery host

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;
use voxline_audio::{AudioError, Codec, SpeechModel, SynthesisStage, TargetFormat, TranscodeStage};
use voxline_config::TranscodeConfig;
use voxline_delivery::{Connection, Connector, DeliveryError, RemoteChannel};
use voxline_queue::{Job, JobStore, QueueError};
use voxline_worker::JobPipeline;

pub const HOST: &str = "pbx.local";
pub const REMOTE_DIR: &str = "/var/lib/asterisk/sounds";

/// Two bytes of PCM per input byte, after an optional delay
pub struct ToneModel {
    pub delay: Duration,
}

impl ToneModel {
    pub fn instant() -> Arc<Self> {
        Arc::new(Self { delay: Duration::ZERO })
    }
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

/// Emits one GSM frame worth of bytes
pub struct FrameCodec;

#[async_trait]
impl Codec for FrameCodec {
    async fn encode(&self, _wav: &[u8], _target: &TargetFormat) -> Result<Vec<u8>, AudioError> {
        Ok(vec![0xd8; 33])
    }
}

/// Files on the fake delivery host, keyed by name
#[derive(Clone, Default)]
pub struct Remote {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Remote {
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.lock().unwrap().contains_key(name)
    }
}

struct RemoteConnector {
    remote: Remote,
}

#[async_trait]
impl Connector for RemoteConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, DeliveryError> {
        Ok(Box::new(RemoteConnection {
            remote: self.remote.clone(),
        }))
    }

    fn host(&self) -> &str {
        HOST
    }
}

struct RemoteConnection {
    remote: Remote,
}

#[async_trait]
impl Connection for RemoteConnection {
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
        self.remote.files.lock().unwrap().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), DeliveryError> {
        let mut files = self.remote.files.lock().unwrap();
        let data = files
            .remove(from)
            .ok_or_else(|| DeliveryError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), data);
        Ok(())
    }

    async fn remove(&mut self, name: &str) -> Result<(), DeliveryError> {
        self.remote.files.lock().unwrap().remove(name);
        Ok(())
    }
}

/// Worker pipeline over `model` that delivers into a fresh [`Remote`]
pub fn pipeline(model: Arc<dyn SpeechModel>) -> (JobPipeline, Remote) {
    let remote = Remote::default();
    let channel = RemoteChannel::new(
        Box::new(RemoteConnector {
            remote: remote.clone(),
        }),
        REMOTE_DIR,
    );

    let pipeline = JobPipeline::new(
        SynthesisStage::new(model),
        TranscodeStage::new(Arc::new(FrameCodec), TargetFormat::from(&TranscodeConfig::default())),
        channel,
        "gsm",
    );

    (pipeline, remote)
}

/// A broker that refuses every operation
pub struct DownStore;

#[async_trait]
impl JobStore for DownStore {
    async fn push(&self, _job: &Job) -> Result<(), QueueError> {
        Err(QueueError::Unavailable("connection refused".into()))
    }

    async fn pop(&self, _topic: &str, _wait: Duration) -> Result<Option<Uuid>, QueueError> {
        Err(QueueError::Unavailable("connection refused".into()))
    }

    async fn load(&self, _id: Uuid) -> Result<Option<Job>, QueueError> {
        Err(QueueError::Unavailable("connection refused".into()))
    }

    async fn save(&self, _job: &Job, _ttl: Option<Duration>) -> Result<(), QueueError> {
        Err(QueueError::Unavailable("connection refused".into()))
    }
}
