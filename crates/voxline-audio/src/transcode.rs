use std::sync::Arc;

use async_trait::async_trait;
use voxline_config::TranscodeConfig;

use crate::error::AudioError;

/// Output format requested from a [`Codec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    /// Container / muxer name, e.g. `gsm`
    pub format: String,
    /// Explicit encoder, when the container does not imply one
    pub codec: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl From<&TranscodeConfig> for TargetFormat {
    fn from(config: &TranscodeConfig) -> Self {
        Self {
            format: config.format.clone(),
            codec: config.codec.clone(),
            sample_rate: config.sample_rate,
            channels: config.channels,
        }
    }
}

/// Converts a WAV file into another format, in memory
#[async_trait]
pub trait Codec: Send + Sync {
    async fn encode(&self, wav: &[u8], target: &TargetFormat) -> Result<Vec<u8>, AudioError>;
}

/// Pipeline stage turning packaged WAV into the delivery format
#[derive(Clone)]
pub struct TranscodeStage {
    codec: Arc<dyn Codec>,
    target: TargetFormat,
}

impl TranscodeStage {
    pub fn new(codec: Arc<dyn Codec>, target: TargetFormat) -> Self {
        Self { codec, target }
    }

    pub async fn transcode(&self, wav: &[u8]) -> Result<Vec<u8>, AudioError> {
        if wav.is_empty() {
            return Err(AudioError::Transcode("no input audio".to_string()));
        }

        let encoded = self.codec.encode(wav, &self.target).await?;

        if encoded.is_empty() {
            return Err(AudioError::Transcode("codec produced no output".to_string()));
        }

        tracing::debug!(
            bytes = encoded.len(),
            format = %self.target.format,
            sample_rate = self.target.sample_rate,
            "audio transcoded"
        );

        Ok(encoded)
    }
}
