//! Destination existence check

use tracing::debug;

use crate::sftp::{FileTransferChannel, SftpError};

/// Whether `file_name` is already present in `directory`.
///
/// Exact, case-sensitive name match. The directory must exist.
pub async fn exists(
    channel: &dyn FileTransferChannel,
    directory: &str,
    file_name: &str,
) -> Result<bool, SftpError> {
    let entries = channel.list_dir(directory).await?;
    let found = entries.iter().any(|name| name == file_name);
    debug!("{} in {}: {}", file_name, directory, if found { "present" } else { "absent" });
    Ok(found)
}
