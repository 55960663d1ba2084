//! SFTP module
//!
//! Remote file operations over the SFTP subsystem of an SSH session.

pub mod channel;
pub mod error;
pub mod path_utils;

pub use channel::{FileTransferChannel, RemoteWriter, SftpChannel};
pub use error::SftpError;
pub use path_utils::{join_remote_path, remote_file_name};
