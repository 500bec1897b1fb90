use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AudioError;

/// A text-to-speech model producing raw PCM
///
/// Output is signed 16-bit little-endian mono samples at [`Self::sample_rate`].
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Native sample rate of the model output in Hz
    fn sample_rate(&self) -> u32;

    /// Synthesize `text` into concatenated PCM bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AudioError>;
}

/// Synthesized audio as produced by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speech {
    /// 16-bit little-endian mono samples
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
}

impl Speech {
    /// Package the samples into an in-memory WAV file
    pub fn to_wav(&self) -> Result<Vec<u8>, AudioError> {
        crate::wav::package_wav(&self.pcm, self.sample_rate)
    }
}

/// First pipeline stage: text in, PCM out
#[derive(Clone)]
pub struct SynthesisStage {
    model: Arc<dyn SpeechModel>,
}

impl SynthesisStage {
    pub fn new(model: Arc<dyn SpeechModel>) -> Self {
        Self { model }
    }

    /// Synthesize `text`
    ///
    /// Blank text and a model that returns no samples are both errors.
    pub async fn synthesize(&self, text: &str) -> Result<Speech, AudioError> {
        if text.trim().is_empty() {
            return Err(AudioError::EmptyText);
        }

        let pcm = self.model.synthesize(text).await?;

        if pcm.is_empty() {
            return Err(AudioError::Synthesis("model produced no audio".to_string()));
        }

        tracing::debug!(bytes = pcm.len(), sample_rate = self.model.sample_rate(), "speech synthesized");

        Ok(Speech {
            pcm,
            sample_rate: self.model.sample_rate(),
        })
    }
}
