#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod channel;
mod connection;
mod error;
mod sftp;

pub use channel::RemoteChannel;
pub use connection::{Connection, Connector};
pub use error::DeliveryError;
pub use sftp::SftpConnector;
