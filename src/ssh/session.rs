//! Authenticated SSH session

use russh::client::{Handle, Msg};
use russh::{Channel, Disconnect};
use tracing::{debug, info};

use super::client::ClientHandler;
use super::error::SshError;

/// An authenticated SSH connection owning the russh `Handle`
pub struct SshSession {
    handle: Handle<ClientHandler>,
    address: String,
}

impl SshSession {
    pub fn new(handle: Handle<ClientHandler>, address: String) -> Self {
        Self { handle, address }
    }

    /// `host:port` this session is connected to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Open a new session channel (used for subsystems such as SFTP)
    pub async fn open_session_channel(&self) -> Result<Channel<Msg>, SshError> {
        debug!("Opening session channel on {}", self.address);
        self.handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))
    }

    /// Disconnect the SSH connection
    pub async fn disconnect(&self) -> Result<(), SshError> {
        info!("Disconnecting from {}", self.address);
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}
