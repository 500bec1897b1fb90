use std::fmt::Write;

use voxline_audio::{SynthesisStage, TranscodeStage};
use voxline_delivery::RemoteChannel;
use voxline_queue::JobResult;

use crate::error::PipelineError;

/// Synthesis, packaging, transcoding and delivery for one job at a time
///
/// Owns the worker's [`RemoteChannel`], so the delivery connection is reused
/// across the jobs this pipeline runs.
pub struct JobPipeline {
    synthesis: SynthesisStage,
    transcode: TranscodeStage,
    channel: RemoteChannel,
    extension: String,
}

impl JobPipeline {
    pub fn new(
        synthesis: SynthesisStage,
        transcode: TranscodeStage,
        channel: RemoteChannel,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            synthesis,
            transcode,
            channel,
            extension: extension.into(),
        }
    }

    pub const fn channel(&self) -> &RemoteChannel {
        &self.channel
    }

    /// Forget the delivery connection, e.g. after an upload was abandoned midway
    pub fn reset_channel(&mut self) {
        self.channel.invalidate();
    }

    /// Turn `text` into a delivered audio file
    ///
    /// Stops at the first failing stage. The filename is only returned once
    /// the upload completed.
    pub async fn execute(&mut self, text: &str) -> Result<JobResult, PipelineError> {
        let speech = self
            .synthesis
            .synthesize(text)
            .await
            .map_err(PipelineError::Synthesis)?;

        let wav = speech.to_wav().map_err(PipelineError::Package)?;

        let encoded = self
            .transcode
            .transcode(&wav)
            .await
            .map_err(PipelineError::Transcode)?;

        let filename = generate_filename(&self.extension);

        let saved_to = self
            .channel
            .upload(&filename, &encoded)
            .await
            .map_err(PipelineError::Delivery)?;

        Ok(JobResult { filename, saved_to })
    }
}

/// Random 256-bit hex name with the given extension
pub fn generate_filename(extension: &str) -> String {
    let bytes: [u8; 32] = rand::random();

    let mut name = String::with_capacity(bytes.len() * 2 + 1 + extension.len());
    for byte in bytes {
        let _ = write!(name, "{byte:02x}");
    }
    name.push('.');
    name.push_str(extension);

    name
}
