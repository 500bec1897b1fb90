use std::time::Duration;

use thiserror::Error;
use voxline_audio::AudioError;
use voxline_delivery::DeliveryError;

/// Why a job did not produce a delivered file
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("synthesize: {0}")]
    Synthesis(#[source] AudioError),

    #[error("package: {0}")]
    Package(#[source] AudioError),

    #[error("transcode: {0}")]
    Transcode(#[source] AudioError),

    #[error("deliver: {0}")]
    Delivery(#[source] DeliveryError),

    /// The execution deadline passed before the pipeline finished
    #[error("job exceeded execution timeout of {0:?}")]
    Timeout(Duration),

    /// The job names a task this worker does not run
    #[error("unknown task '{0}'")]
    UnknownTask(String),
}
