use thiserror::Error;

/// Errors raised by the audio stages
#[derive(Debug, Error)]
pub enum AudioError {
    /// Voice model or its metadata could not be loaded at startup
    #[error("failed to load voice model: {0}")]
    ModelLoad(String),

    /// Nothing to synthesize
    #[error("text is empty")]
    EmptyText,

    /// The speech model failed or produced no audio
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// PCM could not be packaged into a WAV container
    #[error("audio packaging failed: {0}")]
    Encoding(String),

    /// The codec failed or produced no output
    #[error("transcode failed: {0}")]
    Transcode(String),
}
