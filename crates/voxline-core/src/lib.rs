#![allow(clippy::must_use_candidate)]

mod error;
mod text;

pub use error::HttpError;
pub use text::preview;
