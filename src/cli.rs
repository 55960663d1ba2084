//! Command-line interface

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};
use tracing::warn;

use crate::config::types::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOSTNAME, DEFAULT_PORT, DEFAULT_REMOTE_LOCATION,
    DEFAULT_USERNAME,
};
use crate::config::{default_key_file, ConfigFile, StorageError};
use crate::ssh::{AuthMethod, SshConfig};
use crate::transfer::ContentCategory;

/// Environment variable holding the private key passphrase
pub const KEY_PASSPHRASE_ENV: &str = "MEDIAFERRY_KEY_PASSPHRASE";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] StorageError),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Transfer files to a remote server.
#[derive(Parser, Debug)]
#[command(name = "mediaferry", version, about, long_about = None)]
#[command(group(ArgGroup::new("category").required(true).args(["movie", "series"])))]
pub struct Cli {
    /// File or pattern to transfer
    pub files_to_transfer: String,

    /// Set this flag if using a file pattern
    #[arg(long, help_heading = "General")]
    pub pattern: bool,

    /// The transfer is one or more movies
    #[arg(long, help_heading = "General")]
    pub movie: bool,

    /// The transfer is one or more series episodes
    #[arg(long, help_heading = "General")]
    pub series: bool,

    /// Exit with status 1 when any transfer failed
    #[arg(long, help_heading = "General")]
    pub fail_on_error: bool,

    /// More diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, help_heading = "General")]
    pub verbose: u8,

    /// Remote location to store the files [default: /opt/plexmedia/]
    #[arg(long, alias = "remote_location", value_name = "PATH", help_heading = "Advanced")]
    pub remote_location: Option<String>,

    /// Hostname or IP address of the remote server [default: 192.168.1.1]
    #[arg(long, help_heading = "Advanced")]
    pub hostname: Option<String>,

    /// SSH port of the remote server [default: 22]
    #[arg(long, help_heading = "Advanced")]
    pub port: Option<u16>,

    /// Username for SSH authentication [default: user]
    #[arg(long, help_heading = "Advanced")]
    pub username: Option<String>,

    /// Path to the SSH private key file [default: ~/.ssh/id_rsa]
    #[arg(long, alias = "key_file", value_name = "PATH", help_heading = "Advanced")]
    pub key_file: Option<PathBuf>,

    /// Alternate known_hosts file [default: ~/.ssh/known_hosts]
    #[arg(long, value_name = "PATH", help_heading = "Advanced")]
    pub known_hosts: Option<PathBuf>,

    /// Reject hosts that are not in known_hosts
    #[arg(long, help_heading = "Advanced")]
    pub strict_host_key_checking: bool,

    /// Defaults file [default: ~/.mediaferry/config.json]
    #[arg(long, value_name = "PATH", help_heading = "Advanced")]
    pub config: Option<PathBuf>,
}

/// Effective settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub category: ContentCategory,
    pub remote_root: String,
    pub ssh: SshConfig,
}

impl Cli {
    pub fn category(&self) -> ContentCategory {
        if self.movie {
            ContentCategory::Movie
        } else {
            ContentCategory::Series
        }
    }

    /// Merge flags over the defaults file over built-in defaults
    pub fn resolve(&self, file: &ConfigFile, passphrase: Option<String>) -> RunSettings {
        let key_file = self
            .key_file
            .clone()
            .or_else(|| file.key_file.clone())
            .unwrap_or_else(default_key_file);

        let ssh = SshConfig {
            host: self
                .hostname
                .clone()
                .or_else(|| file.hostname.clone())
                .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            port: self.port.or(file.port).unwrap_or(DEFAULT_PORT),
            username: self
                .username
                .clone()
                .or_else(|| file.username.clone())
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            auth: AuthMethod::key(key_file, passphrase),
            timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            strict_host_key_checking: self.strict_host_key_checking
                || file.strict_host_key_checking.unwrap_or(false),
            known_hosts: self.known_hosts.clone().or_else(|| file.known_hosts.clone()),
        };

        RunSettings {
            category: self.category(),
            remote_root: self
                .remote_location
                .clone()
                .or_else(|| file.remote_location.clone())
                .unwrap_or_else(|| DEFAULT_REMOTE_LOCATION.to_string()),
            ssh,
        }
    }

    /// Local files to transfer, in order
    pub fn expand_inputs(&self) -> Result<Vec<PathBuf>, CliError> {
        if !self.pattern {
            return Ok(vec![PathBuf::from(&self.files_to_transfer)]);
        }

        let mut files = Vec::new();
        for entry in glob::glob(&self.files_to_transfer)? {
            match entry {
                Ok(path) => files.push(path),
                Err(e) => warn!("Skipping unreadable match: {}", e),
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_category_is_required() {
        let err = Cli::try_parse_from(["mediaferry", "Film.mkv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_categories_are_exclusive() {
        let err = Cli::try_parse_from(["mediaferry", "--movie", "--series", "Film.mkv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_underscore_aliases() {
        let cli = Cli::try_parse_from([
            "mediaferry",
            "--series",
            "--remote_location",
            "/srv/media",
            "--key_file",
            "/keys/id",
            "Show.mkv",
        ])
        .unwrap();
        assert_eq!(cli.category(), ContentCategory::Series);
        assert_eq!(cli.remote_location.as_deref(), Some("/srv/media"));
        assert_eq!(cli.key_file, Some(PathBuf::from("/keys/id")));
    }

    #[test]
    fn test_builtin_defaults() {
        let cli = Cli::try_parse_from(["mediaferry", "--movie", "Film.mkv"]).unwrap();
        let settings = cli.resolve(&ConfigFile::default(), None);

        assert_eq!(settings.category, ContentCategory::Movie);
        assert_eq!(settings.remote_root, "/opt/plexmedia/");
        assert_eq!(settings.ssh.host, "192.168.1.1");
        assert_eq!(settings.ssh.port, 22);
        assert_eq!(settings.ssh.username, "user");
        assert_eq!(settings.ssh.timeout_secs, 30);
        assert!(!settings.ssh.strict_host_key_checking);
        let AuthMethod::Key { key_path, passphrase } = settings.ssh.auth;
        assert_eq!(key_path, default_key_file());
        assert!(passphrase.is_none());
    }

    #[test]
    fn test_flags_override_config_file() {
        let cli = Cli::try_parse_from([
            "mediaferry",
            "--series",
            "--hostname",
            "cli.host",
            "--port",
            "2200",
            "Show.mkv",
        ])
        .unwrap();
        let file = ConfigFile {
            hostname: Some("file.host".to_string()),
            port: Some(2222),
            username: Some("plex".to_string()),
            remote_location: Some("/data/media".to_string()),
            strict_host_key_checking: Some(true),
            connect_timeout_secs: Some(5),
            ..ConfigFile::default()
        };

        let settings = cli.resolve(&file, Some("secret".to_string()));

        assert_eq!(settings.ssh.host, "cli.host");
        assert_eq!(settings.ssh.port, 2200);
        assert_eq!(settings.ssh.username, "plex");
        assert_eq!(settings.remote_root, "/data/media");
        assert_eq!(settings.ssh.timeout_secs, 5);
        assert!(settings.ssh.strict_host_key_checking);
        assert!(matches!(
            settings.ssh.auth,
            AuthMethod::Key { passphrase: Some(ref p), .. } if p == "secret"
        ));
    }

    #[test]
    fn test_single_path_is_used_verbatim() {
        let cli = Cli::try_parse_from(["mediaferry", "--movie", "My Film [2001].mkv"]).unwrap();
        assert_eq!(
            cli.expand_inputs().unwrap(),
            vec![PathBuf::from("My Film [2001].mkv")]
        );
    }

    #[test]
    fn test_pattern_expands_sorted() {
        let temp = tempdir().unwrap();
        for name in ["Show S01E02.mkv", "Show.S01E01.mkv", "notes.txt"] {
            std::fs::write(temp.path().join(name), b"x").unwrap();
        }
        let pattern = temp.path().join("Show*.mkv");

        let cli = Cli::try_parse_from([
            "mediaferry",
            "--series",
            "--pattern",
            pattern.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(
            cli.expand_inputs().unwrap(),
            vec![
                temp.path().join("Show S01E02.mkv"),
                temp.path().join("Show.S01E01.mkv"),
            ]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let cli = Cli::try_parse_from(["mediaferry", "--movie", "--pattern", "films/[abc"]).unwrap();
        assert!(matches!(cli.expand_inputs(), Err(CliError::Pattern(_))));
    }
}
