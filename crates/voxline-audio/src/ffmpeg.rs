use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    error::AudioError,
    process::run_piped,
    transcode::{Codec, TargetFormat},
};

/// [`Codec`] backed by the `ffmpeg` executable, reading and writing pipes
#[derive(Debug, Clone)]
pub struct FfmpegCodec {
    binary: PathBuf,
}

impl FfmpegCodec {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    fn args(target: &TargetFormat) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-f", "wav", "-i", "pipe:0"]
            .into_iter()
            .map(String::from)
            .collect();

        args.extend([
            "-ar".to_string(),
            target.sample_rate.to_string(),
            "-ac".to_string(),
            target.channels.to_string(),
        ]);

        if let Some(codec) = &target.codec {
            args.push("-c:a".to_string());
            args.push(codec.clone());
        }

        args.extend(["-f".to_string(), target.format.clone(), "pipe:1".to_string()]);

        args
    }
}

#[async_trait]
impl Codec for FfmpegCodec {
    async fn encode(&self, wav: &[u8], target: &TargetFormat) -> Result<Vec<u8>, AudioError> {
        run_piped(&self.binary, &Self::args(target), wav.to_vec())
            .await
            .map_err(AudioError::Transcode)
    }
}
