use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use ssh2::{ErrorCode, Session, Sftp};
use voxline_config::DeliveryConfig;

use crate::{
    connection::{Connection, Connector},
    error::DeliveryError,
};

/// `LIBSSH2_FX_NO_SUCH_FILE`
const NO_SUCH_FILE: i32 = 2;

/// Opens password-authenticated SFTP sessions
///
/// libssh2 is blocking, so every network call runs on the blocking pool.
pub struct SftpConnector {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    timeout: Duration,
}

impl SftpConnector {
    pub fn new(config: &DeliveryConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for SftpConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, DeliveryError> {
        let host = self.host.clone();
        let port = self.port;
        let username = self.username.clone();
        let password = self.password.clone();
        let timeout = self.timeout;

        tracing::debug!(host = %self.host, port, user = %self.username, "opening SFTP session");

        let session = tokio::task::spawn_blocking(move || open_session(&host, port, &username, &password, timeout))
            .await
            .map_err(|e| DeliveryError::Connection {
                host: self.host.clone(),
                reason: format!("connect task failed: {e}"),
            })??;

        Ok(Box::new(SftpConnection {
            session: Some(session),
            cwd: PathBuf::from("."),
        }))
    }

    fn host(&self) -> &str {
        &self.host
    }
}

struct SftpSession {
    // Keeps the transport open for the lifetime of the SFTP channel
    _session: Session,
    sftp: Sftp,
}

fn open_session(
    host: &str,
    port: u16,
    username: &str,
    password: &SecretString,
    timeout: Duration,
) -> Result<SftpSession, DeliveryError> {
    let fail = |reason: String| DeliveryError::Connection {
        host: host.to_string(),
        reason,
    };

    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| fail(format!("cannot resolve address: {e}")))?
        .next()
        .ok_or_else(|| fail("no address found".to_string()))?;

    let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| fail(e.to_string()))?;

    let mut session = Session::new().map_err(|e| fail(e.to_string()))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session
        .handshake()
        .map_err(|e| fail(format!("SSH handshake: {e}")))?;
    session
        .userauth_password(username, password.expose_secret())
        .map_err(|e| fail(format!("authentication as {username}: {e}")))?;

    let sftp = session
        .sftp()
        .map_err(|e| fail(format!("SFTP subsystem: {e}")))?;

    Ok(SftpSession {
        _session: session,
        sftp,
    })
}

struct SftpConnection {
    session: Option<SftpSession>,
    cwd: PathBuf,
}

impl SftpConnection {
    /// Run `op` on the blocking pool with the SFTP handle and current directory
    ///
    /// A panicking operation loses the session; later calls report
    /// [`DeliveryError::Closed`] and the connection reads as dead.
    async fn run<T, F>(&mut self, op: F) -> Result<T, DeliveryError>
    where
        T: Send + 'static,
        F: FnOnce(&Sftp, &Path) -> Result<T, DeliveryError> + Send + 'static,
    {
        let session = self.session.take().ok_or(DeliveryError::Closed)?;
        let cwd = self.cwd.clone();

        let (session, result) = tokio::task::spawn_blocking(move || {
            let result = op(&session.sftp, &cwd);
            (session, result)
        })
        .await
        .map_err(|e| DeliveryError::Upload(format!("SFTP task failed: {e}")))?;

        self.session = Some(session);
        result
    }
}

fn is_not_found(e: &ssh2::Error) -> bool {
    matches!(e.code(), ErrorCode::SFTP(NO_SUCH_FILE))
}

#[async_trait]
impl Connection for SftpConnection {
    async fn is_alive(&mut self) -> bool {
        self.run(|sftp, cwd| {
            sftp.stat(cwd)
                .map(|_| ())
                .map_err(|e| DeliveryError::Upload(e.to_string()))
        })
        .await
        .is_ok()
    }

    async fn change_dir(&mut self, dir: &str) -> Result<(), DeliveryError> {
        let target = self.cwd.join(dir);
        let checked = target.clone();

        self.run(move |sftp, _| {
            let shown = checked.display().to_string();
            let stat = sftp.stat(&checked).map_err(|e| {
                if is_not_found(&e) {
                    DeliveryError::NotFound(shown.clone())
                } else {
                    DeliveryError::Directory(format!("stat {shown}: {e}"))
                }
            })?;

            if stat.is_dir() {
                Ok(())
            } else {
                Err(DeliveryError::Directory(format!("{shown} is not a directory")))
            }
        })
        .await?;

        self.cwd = target;
        Ok(())
    }

    async fn make_dir(&mut self, dir: &str) -> Result<(), DeliveryError> {
        let dir = dir.to_string();

        self.run(move |sftp, cwd| {
            sftp.mkdir(&cwd.join(&dir), 0o755)
                .map_err(|e| DeliveryError::Directory(format!("mkdir {dir}: {e}")))
        })
        .await
    }

    async fn write_file(&mut self, name: &str, data: &[u8]) -> Result<(), DeliveryError> {
        let name = name.to_string();
        let data = data.to_vec();

        self.run(move |sftp, cwd| {
            let mut file = sftp
                .create(&cwd.join(&name))
                .map_err(|e| DeliveryError::Upload(format!("create {name}: {e}")))?;

            file.write_all(&data)
                .and_then(|()| file.flush())
                .map_err(|e| DeliveryError::Upload(format!("write {name}: {e}")))
        })
        .await
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), DeliveryError> {
        let (from, to) = (from.to_string(), to.to_string());

        self.run(move |sftp, cwd| {
            sftp.rename(&cwd.join(&from), &cwd.join(&to), None)
                .map_err(|e| DeliveryError::Upload(format!("rename {from} to {to}: {e}")))
        })
        .await
    }

    async fn remove(&mut self, name: &str) -> Result<(), DeliveryError> {
        let name = name.to_string();

        self.run(move |sftp, cwd| {
            sftp.unlink(&cwd.join(&name))
                .map_err(|e| DeliveryError::Upload(format!("remove {name}: {e}")))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(port: u16) -> DeliveryConfig {
        DeliveryConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: "asterisk".to_string(),
            password: SecretString::from("secret"),
            remote_dir: "/var/lib/asterisk/sounds".to_string(),
            connect_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn reports_configured_host() {
        assert_eq!(SftpConnector::new(&config(22)).host(), "127.0.0.1");
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        // Nothing listens on port 1
        let err = SftpConnector::new(&config(1)).connect().await.err().unwrap();

        match err {
            DeliveryError::Connection { host, .. } => assert_eq!(host, "127.0.0.1"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
