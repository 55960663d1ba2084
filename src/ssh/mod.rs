//! SSH module - authenticated connections to the media host
//!
//! This module provides the SSH transport using the russh library.
//!
//! # Features
//! - Private key authentication (optional passphrase)
//! - Host key verification via ~/.ssh/known_hosts
//! - Connect timeout and keepalive

mod client;
mod config;
mod error;
pub mod known_hosts;
mod session;

pub use client::{ClientHandler, SshClient};
pub use config::{AuthMethod, SshConfig};
pub use error::SshError;
pub use known_hosts::{HostKeyVerification, KnownHostsStore};
pub use session::SshSession;
