//! File-transfer channel
//!
//! [`FileTransferChannel`] is the narrow set of remote operations the upload
//! flow needs. [`SftpChannel`] implements it over the SFTP subsystem of an
//! [`SshSession`].

use async_trait::async_trait;
use russh_sftp::client::SftpSession as RusshSftpSession;
use tokio::io::AsyncWrite;
use tracing::{debug, info};

use super::error::SftpError;
use crate::ssh::SshSession;

/// Writable remote file handle
pub type RemoteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Remote file operations used by the transfer flow
#[async_trait]
pub trait FileTransferChannel: Send + Sync {
    /// Names of the entries in `path` (without `.` and `..`)
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, SftpError>;

    /// Create a single directory at `path`
    async fn create_dir(&self, path: &str) -> Result<(), SftpError>;

    /// Create (or truncate) the file at `path` for writing
    async fn create_file(&self, path: &str) -> Result<RemoteWriter, SftpError>;

    /// Close the channel
    async fn close(&self) -> Result<(), SftpError>;
}

/// SFTP channel over an authenticated SSH session
pub struct SftpChannel {
    sftp: RusshSftpSession,
}

impl SftpChannel {
    /// Request the SFTP subsystem on a fresh session channel
    pub async fn open(session: &SshSession) -> Result<Self, SftpError> {
        info!("Opening SFTP subsystem on {}", session.address());

        let channel = session
            .open_session_channel()
            .await
            .map_err(|e| SftpError::ChannelError(e.to_string()))?;

        channel.request_subsystem(true, "sftp").await.map_err(|e| {
            SftpError::SubsystemNotAvailable(format!("Failed to request SFTP subsystem: {}", e))
        })?;

        let sftp = RusshSftpSession::new(channel.into_stream())
            .await
            .map_err(|e| SftpError::SubsystemNotAvailable(e.to_string()))?;

        debug!("SFTP subsystem opened on {}", session.address());

        Ok(Self { sftp })
    }
}

#[async_trait]
impl FileTransferChannel for SftpChannel {
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, SftpError> {
        debug!("Listing directory: {}", path);

        let read_dir = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| SftpError::from_remote(e, path))?;

        let names: Vec<String> = read_dir
            .map(|entry| entry.file_name())
            .filter(|name| name != "." && name != "..")
            .collect();

        debug!("Listed {} entries in {}", names.len(), path);
        Ok(names)
    }

    async fn create_dir(&self, path: &str) -> Result<(), SftpError> {
        info!("Creating directory: {}", path);
        self.sftp
            .create_dir(path)
            .await
            .map_err(|e| SftpError::from_remote(e, path))
    }

    async fn create_file(&self, path: &str) -> Result<RemoteWriter, SftpError> {
        debug!("Creating remote file: {}", path);
        let file = self
            .sftp
            .create(path)
            .await
            .map_err(|e| SftpError::from_remote(e, path))?;
        Ok(Box::new(file))
    }

    async fn close(&self) -> Result<(), SftpError> {
        self.sftp
            .close()
            .await
            .map_err(|e| SftpError::ProtocolError(e.to_string()))
    }
}
