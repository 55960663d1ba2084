//! SSH Client implementation using russh

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use russh::client;
use russh::keys::key::PrivateKeyWithHashAlg;
use russh::keys::PublicKey;
use tracing::{debug, info, warn};

use super::config::{AuthMethod, SshConfig};
use super::error::SshError;
use super::known_hosts::{HostKeyVerification, KnownHostsStore};
use super::session::SshSession;

/// SSH client: resolves, handshakes and authenticates one connection
pub struct SshClient {
    config: SshConfig,
    known_hosts: Arc<KnownHostsStore>,
}

impl SshClient {
    pub fn new(config: SshConfig, known_hosts: Arc<KnownHostsStore>) -> Self {
        Self {
            config,
            known_hosts,
        }
    }

    /// Connect to the SSH server and return an authenticated session
    pub async fn connect(self) -> Result<SshSession, SshError> {
        let addr = self.config.address();

        info!("Connecting to SSH server at {}", addr);

        let socket_addr = resolve_address(&addr).await?;

        let ssh_config = client::Config {
            keepalive_interval: Some(Duration::from_secs(30)),
            keepalive_max: 3,
            ..Default::default()
        };

        let handler = ClientHandler::new(
            self.config.host.clone(),
            self.config.port,
            self.config.strict_host_key_checking,
            self.known_hosts.clone(),
        );

        let mut handle = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            client::connect(Arc::new(ssh_config), socket_addr, handler),
        )
        .await
        .map_err(|_| SshError::Timeout("Connection timed out".to_string()))?
        .map_err(|e| match e {
            // Host key rejections surface from the handler unchanged
            SshError::HostKeyRejected(msg) => SshError::HostKeyRejected(msg),
            other => SshError::ConnectionFailed(other.to_string()),
        })?;

        debug!("SSH handshake completed");

        let AuthMethod::Key {
            key_path,
            passphrase,
        } = &self.config.auth;
        let key = russh::keys::load_secret_key(key_path, passphrase.as_deref())
            .map_err(|e| SshError::KeyError(format!("{}: {}", key_path.display(), e)))?;

        // RSA keys need the strongest hash the server accepts (rsa-sha2-*)
        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .map_err(|e| SshError::AuthenticationFailed(e.to_string()))?
            .flatten();

        let key_with_hash = PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg);

        let authenticated = handle
            .authenticate_publickey(&self.config.username, key_with_hash)
            .await
            .map_err(|e| SshError::AuthenticationFailed(e.to_string()))?;

        if !authenticated.success() {
            return Err(SshError::AuthenticationFailed(format!(
                "Authentication rejected by server for user {}",
                self.config.username
            )));
        }

        info!("SSH authentication successful");

        Ok(SshSession::new(handle, addr))
    }
}

/// Resolve `host:port` to the first socket address
async fn resolve_address(addr: &str) -> Result<SocketAddr, SshError> {
    tokio::net::lookup_host(addr)
        .await
        .map_err(|e| SshError::ConnectionFailed(format!("Failed to resolve address: {}", e)))?
        .next()
        .ok_or_else(|| SshError::ConnectionFailed("No address found".to_string()))
}

/// Client handler for russh callbacks
///
/// Verifies the server host key against the known_hosts store.
pub struct ClientHandler {
    /// Target host for key verification
    host: String,
    /// Target port
    port: u16,
    /// Strict host key checking mode
    /// - true: reject unknown/changed keys
    /// - false: auto-accept unknown keys (still reject changed)
    strict: bool,
    known_hosts: Arc<KnownHostsStore>,
}

impl ClientHandler {
    pub fn new(host: String, port: u16, strict: bool, known_hosts: Arc<KnownHostsStore>) -> Self {
        Self {
            host,
            port,
            strict,
            known_hosts,
        }
    }
}

impl client::Handler for ClientHandler {
    type Error = SshError;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let verification = self
            .known_hosts
            .verify(&self.host, self.port, server_public_key);

        match verification {
            HostKeyVerification::Verified => {
                info!("Host key verified for {}:{}", self.host, self.port);
                Ok(true)
            }
            HostKeyVerification::Unknown { fingerprint } => {
                if self.strict {
                    warn!(
                        "Unknown host key for {}:{} (fingerprint: {}). Strict mode enabled, rejecting.",
                        self.host, self.port, fingerprint
                    );
                    return Err(SshError::HostKeyRejected(format!(
                        "unknown host {}:{}. Fingerprint: {}. \
                         Add it to {} or disable strict host key checking.",
                        self.host,
                        self.port,
                        fingerprint,
                        self.known_hosts.path().display()
                    )));
                }

                info!(
                    "New host {}:{}, adding to known_hosts (fingerprint: {})",
                    self.host, self.port, fingerprint
                );
                if let Err(e) = self
                    .known_hosts
                    .add_host(&self.host, self.port, server_public_key)
                {
                    warn!("Failed to save host key: {}", e);
                }
                Ok(true)
            }
            HostKeyVerification::Changed {
                expected_fingerprint,
                actual_fingerprint,
            } => {
                warn!(
                    "HOST KEY CHANGED for {}:{}! Expected {}, got {}. POSSIBLE MITM ATTACK!",
                    self.host, self.port, expected_fingerprint, actual_fingerprint
                );
                Err(SshError::HostKeyRejected(format!(
                    "key for {}:{} has changed! Expected: {}, Actual: {}. \
                     If the key change is legitimate, remove the old key from {}",
                    self.host,
                    self.port,
                    expected_fingerprint,
                    actual_fingerprint,
                    self.known_hosts.path().display()
                )))
            }
        }
    }
}
