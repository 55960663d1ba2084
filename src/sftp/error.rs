//! SFTP Error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SftpError {
    #[error("SFTP subsystem not available: {0}")]
    SubsystemNotAvailable(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("SFTP protocol error: {0}")]
    ProtocolError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Transfer error: {0}")]
    TransferError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SftpError {
    /// Map a russh-sftp error for `path` onto the matching variant
    pub fn from_remote(err: russh_sftp::client::error::Error, path: &str) -> Self {
        let err_str = err.to_string();
        if err_str.contains("No such file") || err_str.contains("not found") {
            SftpError::FileNotFound(path.to_string())
        } else if err_str.contains("Permission denied") {
            SftpError::PermissionDenied(path.to_string())
        } else {
            SftpError::ProtocolError(format!("{}: {}", path, err_str))
        }
    }
}
