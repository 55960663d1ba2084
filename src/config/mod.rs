//! Configuration Management Module
//!
//! Optional JSON defaults file for connection settings.

pub mod storage;
pub mod types;

pub use storage::{config_dir, config_file, load_defaults, ConfigStorage, StorageError};
pub use types::{default_key_file, ConfigFile, CONFIG_VERSION};
