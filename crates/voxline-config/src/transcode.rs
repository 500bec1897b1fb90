use std::path::PathBuf;

use serde::Deserialize;

/// Target audio format for delivered files
///
/// Defaults produce 8 kHz mono GSM 06.10, the format Asterisk plays natively.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscodeConfig {
    /// ffmpeg executable
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// ffmpeg output container (`-f`)
    #[serde(default = "default_format")]
    pub format: String,
    /// Optional ffmpeg audio codec (`-c:a`), e.g. `libgsm`
    #[serde(default)]
    pub codec: Option<String>,
    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Output channel count
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// File extension of uploaded objects, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            format: default_format(),
            codec: None,
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            extension: default_extension(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_format() -> String {
    "gsm".to_string()
}

const fn default_sample_rate() -> u32 {
    8000
}

const fn default_channels() -> u16 {
    1
}

fn default_extension() -> String {
    "gsm".to_string()
}
