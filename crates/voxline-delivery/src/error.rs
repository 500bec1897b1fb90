use thiserror::Error;

/// Remote delivery errors
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport could not be opened or authenticated
    #[error("connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    /// Remote path does not exist
    #[error("remote path not found: {0}")]
    NotFound(String),

    /// Remote directory could not be created or entered
    #[error("remote directory error: {0}")]
    Directory(String),

    /// Writing or renaming the remote file failed
    #[error("upload failed: {0}")]
    Upload(String),

    /// The connection was used after being torn down
    #[error("connection is closed")]
    Closed,
}
