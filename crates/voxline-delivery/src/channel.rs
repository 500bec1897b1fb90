use crate::{
    connection::{Connection, Connector},
    error::DeliveryError,
};

/// A single reusable connection to the delivery host
///
/// Owned by one worker. The connection is opened on first use, positioned in
/// the remote directory (created when missing) and reused for later jobs
/// while it stays alive. Any failure drops the cached connection so the next
/// job starts from a fresh one.
pub struct RemoteChannel {
    connector: Box<dyn Connector>,
    remote_dir: String,
    connection: Option<Box<dyn Connection>>,
    alive: bool,
    connects: u64,
}

impl RemoteChannel {
    pub fn new(connector: Box<dyn Connector>, remote_dir: impl Into<String>) -> Self {
        Self {
            connector,
            remote_dir: remote_dir.into(),
            connection: None,
            alive: false,
            connects: 0,
        }
    }

    /// Whether a connection is cached and was alive when last checked
    pub const fn is_connected(&self) -> bool {
        self.alive && self.connection.is_some()
    }

    /// Number of connections opened so far
    pub const fn connects(&self) -> u64 {
        self.connects
    }

    /// `host:/dir/filename` for a file uploaded through this channel
    pub fn destination(&self, filename: &str) -> String {
        format!(
            "{}:{}/{filename}",
            self.connector.host(),
            self.remote_dir.trim_end_matches('/')
        )
    }

    /// Drop the cached connection
    pub fn invalidate(&mut self) {
        if self.connection.take().is_some() {
            tracing::debug!(host = %self.connector.host(), "remote connection dropped");
        }
        self.alive = false;
    }

    /// Return the cached connection, replacing it if it is missing or dead
    pub async fn get_or_reconnect(&mut self) -> Result<&mut dyn Connection, DeliveryError> {
        let reusable = match self.connection.as_mut() {
            Some(connection) if self.alive => connection.is_alive().await,
            _ => false,
        };

        if !reusable {
            if self.connection.is_some() {
                tracing::warn!(host = %self.connector.host(), "remote connection is dead, reconnecting");
            }
            self.invalidate();

            let connection = establish(self.connector.as_ref(), &self.remote_dir).await?;
            self.connection = Some(connection);
            self.alive = true;
            self.connects += 1;
        }

        match self.connection.as_deref_mut() {
            Some(connection) => Ok(connection),
            None => Err(DeliveryError::Closed),
        }
    }

    /// Upload `data` as `filename` into the remote directory
    ///
    /// The bytes land in a hidden part file that is renamed once complete,
    /// so the final name only ever refers to a whole file. Returns the
    /// destination on success.
    pub async fn upload(&mut self, filename: &str, data: &[u8]) -> Result<String, DeliveryError> {
        match self.try_upload(filename, data).await {
            Ok(()) => {
                let destination = self.destination(filename);
                tracing::info!(filename, bytes = data.len(), %destination, "file uploaded");
                Ok(destination)
            }
            Err(e) => {
                self.invalidate();
                Err(e)
            }
        }
    }

    async fn try_upload(&mut self, filename: &str, data: &[u8]) -> Result<(), DeliveryError> {
        let part = format!(".{filename}.part");
        let connection = self.get_or_reconnect().await?;

        let written = match connection.write_file(&part, data).await {
            Ok(()) => connection.rename(&part, filename).await,
            Err(e) => Err(e),
        };

        if written.is_err()
            && let Err(e) = connection.remove(&part).await
        {
            tracing::debug!(file = %part, error = %e, "could not remove partial upload");
        }

        written
    }
}

async fn establish(connector: &dyn Connector, remote_dir: &str) -> Result<Box<dyn Connection>, DeliveryError> {
    let mut connection = connector.connect().await?;

    match connection.change_dir(remote_dir).await {
        Ok(()) => {}
        Err(DeliveryError::NotFound(_)) => {
            tracing::info!(dir = %remote_dir, "remote directory missing, creating it");
            connection.make_dir(remote_dir).await?;
            connection.change_dir(remote_dir).await?;
        }
        Err(e) => return Err(e),
    }

    tracing::info!(host = %connector.host(), dir = %remote_dir, "remote connection established");

    Ok(connection)
}
