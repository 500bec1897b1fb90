use std::sync::Arc;

use voxline_audio::{FfmpegCodec, PiperModel, SynthesisStage, TargetFormat, TranscodeStage};
use voxline_config::Config;
use voxline_delivery::{RemoteChannel, SftpConnector};

use crate::pipeline::JobPipeline;

/// Build the production pipeline from configuration
///
/// Loads the voice model up front; a missing or corrupt model is an error
/// here rather than on the first job. No remote connection is opened yet.
pub fn build_pipeline(config: &Config) -> anyhow::Result<JobPipeline> {
    let synthesis = config
        .synthesis
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("[synthesis] section is required to run a worker"))?;

    let delivery = config
        .delivery
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("[delivery] section is required to run a worker"))?;

    let model = PiperModel::load(synthesis).map_err(|e| anyhow::anyhow!("Failed to initialize synthesis: {e}"))?;

    let codec = FfmpegCodec::new(config.transcode.binary.clone());

    let channel = RemoteChannel::new(Box::new(SftpConnector::new(delivery)), delivery.remote_dir.clone());

    tracing::debug!(
        host = %delivery.host,
        dir = %delivery.remote_dir,
        format = %config.transcode.format,
        "worker pipeline configured"
    );

    Ok(JobPipeline::new(
        SynthesisStage::new(Arc::new(model)),
        TranscodeStage::new(Arc::new(codec), TargetFormat::from(&config.transcode)),
        channel,
        config.transcode.extension.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_section_is_required() {
        let err = build_pipeline(&Config::default()).err().unwrap();
        assert!(err.to_string().contains("[synthesis]"));
    }

    #[test]
    fn missing_model_file_fails_startup() {
        let config = Config::from_toml(
            r#"
            [synthesis]
            model_path = "/nonexistent/voice.onnx"

            [delivery]
            host = "pbx"
            username = "u"
            password = "p"
            remote_dir = "/srv/sounds"
            "#,
        )
        .unwrap();

        let err = build_pipeline(&config).err().unwrap();
        assert!(err.to_string().contains("does not exist"), "{err}");
    }
}
