#![allow(clippy::must_use_candidate)]

pub mod cors;
pub mod delivery;
mod duration;
mod env;
pub mod health;
mod loader;
pub mod queue;
pub mod server;
pub mod submission;
pub mod synthesis;
pub mod telemetry;
pub mod transcode;

use serde::Deserialize;

pub use cors::*;
pub use delivery::*;
pub use health::*;
pub use queue::*;
pub use server::*;
pub use submission::*;
pub use synthesis::*;
pub use telemetry::*;
pub use transcode::*;

/// Top-level voxline configuration
///
/// The HTTP front end only needs `server`, `queue` and `submission`.
/// Workers additionally require `synthesis` and `delivery`, which are
/// therefore optional here and checked when a worker is built.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Work queue configuration
    #[serde(default)]
    pub queue: QueueConfig,
    /// Bounded-wait and validation settings for submissions
    #[serde(default)]
    pub submission: SubmissionConfig,
    /// Speech model configuration (workers only)
    #[serde(default)]
    pub synthesis: Option<SynthesisConfig>,
    /// Audio transcoding configuration
    #[serde(default)]
    pub transcode: TranscodeConfig,
    /// Remote delivery target (workers only)
    #[serde(default)]
    pub delivery: Option<DeliveryConfig>,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
