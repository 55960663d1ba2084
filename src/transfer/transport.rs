//! Transport seam
//!
//! A [`Transport`] opens one authenticated session per call; a
//! [`TransportSession`] yields file-transfer channels and is disconnected
//! when the job ends.

use std::sync::Arc;

use async_trait::async_trait;

use crate::sftp::{FileTransferChannel, SftpChannel, SftpError};
use crate::ssh::{KnownHostsStore, SshClient, SshConfig, SshError, SshSession};

/// Opens authenticated sessions to the remote host
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn TransportSession>, SshError>;
}

/// One authenticated session
#[async_trait]
pub trait TransportSession: Send + Sync {
    async fn open_channel(&self) -> Result<Box<dyn FileTransferChannel>, SftpError>;

    async fn disconnect(&self) -> Result<(), SshError>;
}

/// SSH/SFTP transport
pub struct SshTransport {
    config: SshConfig,
    known_hosts: Arc<KnownHostsStore>,
}

impl SshTransport {
    pub fn new(config: SshConfig) -> Self {
        let path = config
            .known_hosts
            .clone()
            .unwrap_or_else(KnownHostsStore::default_path);
        Self {
            config,
            known_hosts: Arc::new(KnownHostsStore::with_path(path)),
        }
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn connect(&self) -> Result<Box<dyn TransportSession>, SshError> {
        let session = SshClient::new(self.config.clone(), self.known_hosts.clone())
            .connect()
            .await?;
        Ok(Box::new(session))
    }
}

#[async_trait]
impl TransportSession for SshSession {
    async fn open_channel(&self) -> Result<Box<dyn FileTransferChannel>, SftpError> {
        let channel = SftpChannel::open(self).await?;
        Ok(Box::new(channel))
    }

    async fn disconnect(&self) -> Result<(), SshError> {
        SshSession::disconnect(self).await
    }
}
