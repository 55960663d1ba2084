//! Progress-tracked streaming upload

use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::progress::{ProgressObserver, ProgressState};
use crate::sftp::{FileTransferChannel, SftpError};

/// Chunk size for streaming uploads (64 KB)
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Stream `local_path` to `remote_path`, reporting cumulative bytes.
///
/// The observer sees `(0, total)` first and `(total, total)` last on success,
/// followed by `finish()`. On error `finish()` is not called.
pub async fn upload(
    local_path: &Path,
    channel: &dyn FileTransferChannel,
    remote_path: &str,
    observer: &mut dyn ProgressObserver,
) -> Result<u64, SftpError> {
    let total_bytes = tokio::fs::metadata(local_path).await?.len();
    let local_file = tokio::fs::File::open(local_path).await?;

    // Bytes appended to the file after this point are not sent
    let mut reader = local_file.take(total_bytes);
    let mut state = ProgressState::new(total_bytes);

    let mut remote_file = channel.create_file(remote_path).await?;
    debug!(
        "Uploading {} ({} bytes) to {}",
        local_path.display(),
        total_bytes,
        remote_path
    );

    observer.on_progress(0, total_bytes);

    let mut buffer = vec![0u8; UPLOAD_CHUNK_SIZE];
    while !state.is_complete() {
        let bytes_read = reader.read(&mut buffer).await?;

        if bytes_read == 0 {
            return Err(SftpError::TransferError(format!(
                "{} shrank during upload: read {} of {} bytes",
                local_path.display(),
                state.transferred_bytes(),
                total_bytes
            )));
        }

        remote_file
            .write_all(&buffer[..bytes_read])
            .await
            .map_err(|e| SftpError::WriteError(format!("{}: {}", remote_path, e)))?;

        let transferred = state.advance(bytes_read as u64);
        observer.on_progress(transferred, total_bytes);
    }

    remote_file
        .flush()
        .await
        .map_err(|e| SftpError::WriteError(format!("{}: {}", remote_path, e)))?;
    remote_file
        .shutdown()
        .await
        .map_err(|e| SftpError::WriteError(format!("{}: {}", remote_path, e)))?;

    observer.finish();

    info!(
        "Upload complete: {} -> {} ({} bytes)",
        local_path.display(),
        remote_path,
        state.transferred_bytes()
    );

    Ok(state.transferred_bytes())
}
