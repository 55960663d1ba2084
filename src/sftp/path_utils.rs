//! Remote path helpers
//!
//! Remote SFTP paths always use `/` as separator, regardless of the local OS.

use std::path::Path;

/// Check if a remote SFTP path is absolute.
pub fn is_absolute_remote_path(path: &str) -> bool {
    path.starts_with('/')
}

/// Join remote SFTP path components using `/` separator.
pub fn join_remote_path(base: &str, component: &str) -> String {
    let component = component.trim_start_matches('/');
    if base.is_empty() {
        component.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, component)
    } else {
        format!("{}/{}", base, component)
    }
}

/// Strip trailing separators, keeping a bare `/` intact.
pub fn trim_remote_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && is_absolute_remote_path(path) {
        "/"
    } else {
        trimmed
    }
}

/// Remote file name for a local file: its base name with every space
/// replaced by an underscore.
pub fn remote_file_name(local_path: &Path) -> Option<String> {
    local_path
        .file_name()
        .map(|name| name.to_string_lossy().replace(' ', "_"))
}
