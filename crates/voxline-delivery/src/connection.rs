use async_trait::async_trait;

use crate::error::DeliveryError;

/// Opens authenticated connections to one delivery host
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>, DeliveryError>;

    /// Host name used when reporting where a file was saved
    fn host(&self) -> &str;
}

/// An open file-transfer session
///
/// Relative names resolve against the directory last entered with
/// [`Connection::change_dir`].
#[async_trait]
pub trait Connection: Send {
    /// Cheap liveness probe; `false` means the session must be replaced
    async fn is_alive(&mut self) -> bool;

    /// Enter `dir`, failing with [`DeliveryError::NotFound`] when it does not exist
    async fn change_dir(&mut self, dir: &str) -> Result<(), DeliveryError>;

    async fn make_dir(&mut self, dir: &str) -> Result<(), DeliveryError>;

    /// Create or truncate `name` and write `data` to it
    async fn write_file(&mut self, name: &str, data: &[u8]) -> Result<(), DeliveryError>;

    /// Rename `from` to `to`, replacing `to` if it exists
    async fn rename(&mut self, from: &str, to: &str) -> Result<(), DeliveryError>;

    async fn remove(&mut self, name: &str) -> Result<(), DeliveryError>;
}
