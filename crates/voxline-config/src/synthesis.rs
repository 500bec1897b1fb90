use std::path::PathBuf;

use serde::Deserialize;

/// Piper voice model configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Path to the `.onnx` voice model
    pub model_path: PathBuf,
    /// Path to the voice metadata; defaults to `<model_path>.json`
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    /// Piper executable
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Speaker id for multi-speaker voices
    #[serde(default)]
    pub speaker: Option<u32>,
}

impl SynthesisConfig {
    /// Resolved path of the voice metadata file
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(|| {
            let mut path = self.model_path.clone().into_os_string();
            path.push(".json");
            PathBuf::from(path)
        })
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("piper")
}
