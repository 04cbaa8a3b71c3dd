//! # Configuration
//!
//! Environment-driven process configuration plus the JSON config store the
//! save endpoints persist into.
//!
//! The config file is shared with other tooling, so writes are
//! read-modify-write: only the `ips`, `usernames`, and `grid` keys are
//! touched and any other keys in the document are preserved verbatim.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use lumen_backend::{BridgeSnapshot, GridCell, GridLayout};

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the server listens on (`LUMEN_PORT`, default 4711).
    pub port: u16,
    /// Path to the JSON config file (`LUMEN_CONFIG`, default `config.json`).
    pub config_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("LUMEN_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4711);
        let config_path = std::env::var("LUMEN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"));
        Self { port, config_path }
    }
}

/// The persisted document.
///
/// `extra` captures keys this server does not own so a rewrite never
/// drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub usernames: BTreeMap<String, String>,
    #[serde(default)]
    pub grid: Vec<Vec<GridCell>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Failures from config persistence.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-modify-write access to the config file.
///
/// A mutex serializes writers so two save endpoints racing each other
/// cannot interleave their read and write halves.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored document; a missing file reads as the default.
    pub fn load_or_default(&self) -> Result<StoredConfig, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(StoredConfig::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist the registered bridges (addresses and credentials).
    pub fn save_bridges(&self, bridges: &[BridgeSnapshot]) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock();
        let mut config = self.load_or_default()?;
        config.ips = bridges.iter().map(|b| b.ip_address.clone()).collect();
        config.usernames = bridges
            .iter()
            .filter_map(|b| {
                b.username
                    .as_ref()
                    .map(|name| (b.serial_number.clone(), name.clone()))
            })
            .collect();
        self.write(&config)
    }

    /// Persist the logical grid layout.
    pub fn save_grid(&self, layout: &GridLayout) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock();
        let mut config = self.load_or_default()?;
        config.grid = layout.rows.clone();
        self.write(&config)
    }

    fn write(&self, config: &StoredConfig) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}
