//! Transfer Error types

use thiserror::Error;

use crate::sftp::SftpError;
use crate::ssh::SshError;

/// Failure of a single transfer job
#[derive(Error, Debug)]
pub enum TransferError {
    #[error(transparent)]
    Ssh(#[from] SshError),

    #[error(transparent)]
    Sftp(#[from] SftpError),
}
