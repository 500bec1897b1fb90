#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod ffmpeg;
mod piper;
mod process;
mod synthesis;
mod transcode;
mod wav;

pub use error::AudioError;
pub use ffmpeg::FfmpegCodec;
pub use piper::PiperModel;
pub use synthesis::{Speech, SpeechModel, SynthesisStage};
pub use transcode::{Codec, TargetFormat, TranscodeStage};
pub use wav::package_wav;
