//! Transfer jobs and remote layout

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sftp::path_utils::trim_remote_path;
use crate::sftp::{join_remote_path, remote_file_name};

/// Kind of media being transferred; selects the remote subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Movie,
    Series,
}

impl ContentCategory {
    /// Subdirectory under the remote root holding this category
    pub fn subdir(&self) -> &'static str {
        match self {
            ContentCategory::Movie => "movies",
            ContentCategory::Series => "series",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subdir())
    }
}

/// Category directory under the remote root: `<root>/<category>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDirectory {
    root: String,
    category: ContentCategory,
}

impl RemoteDirectory {
    pub fn new(root: impl Into<String>, category: ContentCategory) -> Self {
        Self {
            root: root.into(),
            category,
        }
    }

    pub fn category(&self) -> ContentCategory {
        self.category
    }

    /// Directory whose listing shows whether the category directory exists
    pub fn parent(&self) -> &str {
        trim_remote_path(&self.root)
    }

    /// Name of the category directory inside [`parent`](Self::parent)
    pub fn leaf(&self) -> &'static str {
        self.category.subdir()
    }

    /// Full path of the category directory
    pub fn path(&self) -> String {
        join_remote_path(self.parent(), self.leaf())
    }

    /// Full path of `file_name` inside the category directory
    pub fn file_path(&self, file_name: &str) -> String {
        join_remote_path(&self.path(), file_name)
    }
}

impl fmt::Display for RemoteDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// One local file to push, with its resolved remote destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    /// Position in the batch
    pub index: usize,
    pub local_path: PathBuf,
    pub remote_directory: RemoteDirectory,
    /// Remote file name (spaces replaced with underscores)
    pub file_name: String,
}

impl TransferJob {
    /// Build the job for `local_path`. Returns `None` for paths without a
    /// file name component (e.g. `/` or `..`).
    pub fn new(index: usize, local_path: &Path, remote_directory: RemoteDirectory) -> Option<Self> {
        let file_name = remote_file_name(local_path)?;
        Some(Self {
            index,
            local_path: local_path.to_path_buf(),
            remote_directory,
            file_name,
        })
    }

    pub fn category(&self) -> ContentCategory {
        self.remote_directory.category()
    }

    /// Destination path of the uploaded file
    pub fn remote_path(&self) -> String {
        self.remote_directory.file_path(&self.file_name)
    }
}

/// Build jobs for `files` in order, all targeting `<root>/<category>`.
/// Paths without a file name are skipped.
pub fn build_jobs(files: &[PathBuf], root: &str, category: ContentCategory) -> Vec<TransferJob> {
    let directory = RemoteDirectory::new(root, category);
    files
        .iter()
        .filter_map(|path| {
            let job = TransferJob::new(0, path, directory.clone());
            if job.is_none() {
                tracing::warn!("Ignoring {}: no file name", path.display());
            }
            job
        })
        .enumerate()
        .map(|(index, job)| TransferJob { index, ..job })
        .collect()
}
