use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use voxline_config::SynthesisConfig;

use crate::{error::AudioError, process::run_piped, synthesis::SpeechModel};

/// Piper voice driven through the `piper` executable
///
/// The model and its metadata are checked once at load time; each call
/// then runs `piper --output-raw` with the text on stdin.
#[derive(Debug)]
pub struct PiperModel {
    binary: PathBuf,
    model_path: PathBuf,
    config_path: PathBuf,
    speaker: Option<u32>,
    sample_rate: u32,
}

#[derive(Deserialize)]
struct VoiceMetadata {
    audio: AudioMetadata,
}

#[derive(Deserialize)]
struct AudioMetadata {
    sample_rate: u32,
}

impl PiperModel {
    /// Validate the model file and read its sample rate from the metadata file
    pub fn load(config: &SynthesisConfig) -> Result<Self, AudioError> {
        let config_path = config.config_path();

        if !config.model_path.is_file() {
            return Err(AudioError::ModelLoad(format!(
                "model file {} does not exist",
                config.model_path.display()
            )));
        }

        let sample_rate = read_sample_rate(&config_path)?;

        tracing::info!(
            model = %config.model_path.display(),
            sample_rate,
            "voice model loaded"
        );

        Ok(Self {
            binary: config.binary.clone(),
            model_path: config.model_path.clone(),
            config_path,
            speaker: config.speaker,
            sample_rate,
        })
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--model".to_string(),
            self.model_path.display().to_string(),
            "--config".to_string(),
            self.config_path.display().to_string(),
            "--output-raw".to_string(),
        ];

        if let Some(speaker) = self.speaker {
            args.push("--speaker".to_string());
            args.push(speaker.to_string());
        }

        args
    }
}

fn read_sample_rate(path: &Path) -> Result<u32, AudioError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AudioError::ModelLoad(format!("failed to read {}: {e}", path.display())))?;

    let metadata: VoiceMetadata = serde_json::from_str(&raw)
        .map_err(|e| AudioError::ModelLoad(format!("invalid voice metadata {}: {e}", path.display())))?;

    if metadata.audio.sample_rate == 0 {
        return Err(AudioError::ModelLoad(format!("{} declares a zero sample rate", path.display())));
    }

    Ok(metadata.audio.sample_rate)
}

#[async_trait]
impl SpeechModel for PiperModel {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AudioError> {
        // Piper reads one utterance per line
        let mut input = text.replace(['\r', '\n'], " ").into_bytes();
        input.push(b'\n');

        run_piped(&self.binary, &self.args(), input)
            .await
            .map_err(AudioError::Synthesis)
    }
}
