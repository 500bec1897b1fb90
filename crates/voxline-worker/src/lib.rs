#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod pipeline;
mod setup;
#[cfg(test)]
mod testing;
mod worker;

pub use error::PipelineError;
pub use pipeline::{JobPipeline, generate_filename};
pub use setup::build_pipeline;
pub use worker::Worker;
