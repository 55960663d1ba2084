//! Defaults file format

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Current defaults file version
pub const CONFIG_VERSION: u32 = 1;

/// Built-in defaults used when neither a flag nor the defaults file sets a value
pub const DEFAULT_REMOTE_LOCATION: &str = "/opt/plexmedia/";
pub const DEFAULT_HOSTNAME: &str = "192.168.1.1";
pub const DEFAULT_USERNAME: &str = "user";
pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default private key: ~/.ssh/id_rsa
pub fn default_key_file() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".ssh").join("id_rsa"))
        .unwrap_or_else(|| PathBuf::from("~/.ssh/id_rsa"))
}

/// Contents of the defaults file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Remote media root (category directories live below it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Private key used for authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Alternate known_hosts file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_hosts: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_host_key_checking: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            remote_location: None,
            hostname: None,
            port: None,
            username: None,
            key_file: None,
            known_hosts: None,
            strict_host_key_checking: None,
            connect_timeout_secs: None,
        }
    }
}
