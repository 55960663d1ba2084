//! Known hosts management for SSH host key verification
//!
//! Reads OpenSSH `known_hosts` entries and appends newly trusted hosts.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::RwLock;
use russh::keys::{PublicKey, PublicKeyBase64};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::error::SshError;

/// Result of host key verification
#[derive(Debug, Clone, PartialEq)]
pub enum HostKeyVerification {
    /// Key matches known_hosts entry
    Verified,
    /// Host not in known_hosts (first connection)
    Unknown { fingerprint: String },
    /// Key changed from known_hosts entry (potential MITM)
    Changed {
        expected_fingerprint: String,
        actual_fingerprint: String,
    },
}

/// Entry in known_hosts: (key_type, base64_key)
#[derive(Clone, Debug)]
struct HostKeyEntry {
    key_type: String,
    key_data: String,
}

/// Known hosts store backed by a single file
pub struct KnownHostsStore {
    /// Cache of host -> list of keys (supports multiple key types per host)
    hosts: RwLock<HashMap<String, Vec<HostKeyEntry>>>,
    /// Path to known_hosts file
    path: PathBuf,
}

impl KnownHostsStore {
    /// Default location: ~/.ssh/known_hosts
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".ssh").join("known_hosts"))
            .unwrap_or_else(|| PathBuf::from("~/.ssh/known_hosts"))
    }

    /// Open the store at `path`. A missing or unreadable file yields an empty store.
    pub fn with_path(path: PathBuf) -> Self {
        let store = Self {
            hosts: RwLock::new(HashMap::new()),
            path,
        };

        if let Err(e) = store.load() {
            warn!("Failed to load known_hosts {}: {}", store.path.display(), e);
        }

        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load known_hosts file
    fn load(&self) -> Result<(), SshError> {
        if !self.path.exists() {
            debug!("Known hosts file {} not found", self.path.display());
            return Ok(());
        }

        let file = fs::File::open(&self.path)?;

        let reader = BufReader::new(file);
        let mut hosts = self.hosts.write();
        let mut entry_count = 0;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // hostname[,alias] keytype base64key [comment]
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                continue;
            }

            let hostnames = parts[0];
            let entry = HostKeyEntry {
                key_type: parts[1].to_string(),
                key_data: parts[2].to_string(),
            };

            for hostname in hostnames.split(',') {
                // Hashed hostnames (|1|...) cannot be matched by name
                if hostname.starts_with('|') {
                    continue;
                }

                hosts
                    .entry(Self::normalize_hostname(hostname))
                    .or_default()
                    .push(entry.clone());
                entry_count += 1;
            }
        }

        debug!(
            "Loaded {} known host entries ({} unique hosts)",
            entry_count,
            hosts.len()
        );
        Ok(())
    }

    /// Normalize a known_hosts host field to the lookup key format
    fn normalize_hostname(host: &str) -> String {
        // [host]:22 is stored as plain host, other ports keep the bracket form
        if let Some(rest) = host.strip_prefix('[') {
            if let Some((name, port)) = rest.split_once("]:") {
                return match port.parse::<u16>() {
                    Ok(22) | Err(_) => name.to_lowercase(),
                    Ok(port) => Self::make_key(name, port),
                };
            }
            return rest.trim_end_matches(']').to_lowercase();
        }
        host.to_lowercase()
    }

    /// Create lookup key for host:port
    fn make_key(host: &str, port: u16) -> String {
        let host = host.to_lowercase();
        if port == 22 {
            host
        } else {
            format!("[{}]:{}", host, port)
        }
    }

    /// Compute SHA256 fingerprint of public key
    pub fn fingerprint(key: &PublicKey) -> String {
        Self::fingerprint_bytes(&key.public_key_bytes())
    }

    fn fingerprint_bytes(bytes: &[u8]) -> String {
        let hash = Sha256::digest(bytes);
        format!("SHA256:{}", BASE64.encode(hash).trim_end_matches('='))
    }

    /// Verify a host's public key
    pub fn verify(&self, host: &str, port: u16, key: &PublicKey) -> HostKeyVerification {
        self.verify_raw(
            host,
            port,
            Self::key_type_name(key),
            &BASE64.encode(key.public_key_bytes()),
            Self::fingerprint(key),
        )
    }

    fn verify_raw(
        &self,
        host: &str,
        port: u16,
        key_type: &str,
        key_b64: &str,
        fingerprint: String,
    ) -> HostKeyVerification {
        let lookup_key = Self::make_key(host, port);
        let hosts = self.hosts.read();

        let Some(entries) = hosts.get(&lookup_key) else {
            debug!("Unknown host: {}", lookup_key);
            return HostKeyVerification::Unknown { fingerprint };
        };

        match entries.iter().find(|e| e.key_type == key_type) {
            Some(entry) if entry.key_data == key_b64 => {
                debug!("Host key verified for {} (type: {})", lookup_key, key_type);
                HostKeyVerification::Verified
            }
            Some(entry) => {
                let expected_fingerprint = Self::compute_fingerprint_from_b64(&entry.key_data);
                warn!(
                    "HOST KEY CHANGED for {} (type: {})! Expected {}, got {}",
                    lookup_key, key_type, expected_fingerprint, fingerprint
                );
                HostKeyVerification::Changed {
                    expected_fingerprint,
                    actual_fingerprint: fingerprint,
                }
            }
            None => {
                debug!(
                    "Host {} known but no {} key stored, treating as new",
                    lookup_key, key_type
                );
                HostKeyVerification::Unknown { fingerprint }
            }
        }
    }

    /// Compute fingerprint from stored base64 key
    fn compute_fingerprint_from_b64(stored_b64: &str) -> String {
        match BASE64.decode(stored_b64) {
            Ok(bytes) => Self::fingerprint_bytes(&bytes),
            Err(_) => "unknown".to_string(),
        }
    }

    /// Add a new host key to known_hosts
    pub fn add_host(&self, host: &str, port: u16, key: &PublicKey) -> Result<(), SshError> {
        self.add_raw(host, port, Self::key_type_name(key), &BASE64.encode(key.public_key_bytes()))
    }

    fn add_raw(&self, host: &str, port: u16, key_type: &str, key_b64: &str) -> Result<(), SshError> {
        let lookup_key = Self::make_key(host, port);

        self.hosts
            .write()
            .entry(lookup_key.clone())
            .or_default()
            .push(HostKeyEntry {
                key_type: key_type.to_string(),
                key_data: key_b64.to_string(),
            });

        self.append_to_file(&lookup_key, key_type, key_b64)?;

        info!(
            "Added host key for {} (type: {}) to {}",
            lookup_key,
            key_type,
            self.path.display()
        );
        Ok(())
    }

    /// Get key type name for known_hosts format
    fn key_type_name(key: &PublicKey) -> &'static str {
        match key.algorithm().as_str() {
            "ssh-ed25519" => "ssh-ed25519",
            "ssh-rsa" => "ssh-rsa",
            "ecdsa-sha2-nistp256" => "ecdsa-sha2-nistp256",
            "ecdsa-sha2-nistp384" => "ecdsa-sha2-nistp384",
            "ecdsa-sha2-nistp521" => "ecdsa-sha2-nistp521",
            _ => "ssh-rsa",
        }
    }

    /// Append entry to known_hosts file
    fn append_to_file(&self, host: &str, key_type: &str, key_b64: &str) -> Result<(), SshError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{} {} {}", host, key_type, key_b64)?;

        Ok(())
    }
}
