//! Remote directory reconciliation

use tracing::{debug, info};

use super::job::RemoteDirectory;
use crate::sftp::{FileTransferChannel, SftpError};

/// What [`ensure_directory`] found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The directory was already present
    Existing,
    /// The directory was created
    Created,
}

/// Make sure the category directory exists, creating it when absent.
///
/// Lists the remote root and looks for the category leaf. The root itself is
/// never created; errors from the channel are returned unchanged.
pub async fn ensure_directory(
    channel: &dyn FileTransferChannel,
    directory: &RemoteDirectory,
) -> Result<Reconciled, SftpError> {
    let entries = channel.list_dir(directory.parent()).await?;

    if entries.iter().any(|name| name == directory.leaf()) {
        debug!("Remote directory {} already exists", directory);
        return Ok(Reconciled::Existing);
    }

    let path = directory.path();
    println!("Creating location: {} ...", path);
    channel.create_dir(&path).await?;
    println!("    Created...");
    info!("Created remote directory {}", path);

    Ok(Reconciled::Created)
}
