//! Application configuration.
//!
//! The configuration is loaded from a JSON file
//! (`$XDG_CONFIG_HOME/monsync/config.json`).  The top-level schema uses a
//! `"sync"` key so the file can be extended with additional sections later
//! without breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "sync": {
//!     "poll_interval_ms": 150,
//!     "debounce_ms": 50,
//!     "move_stagger_ms": 10
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Timing of the synchronization engine.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Timing of the synchronization engine.
///
/// All durations are in **milliseconds**.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How often the pointer is sampled to find the focused monitor.
    pub poll_interval_ms: u64,
    /// Delay between a workspace switch and the redistribution of the other
    /// monitors, so the host can finish its own switch first.
    pub debounce_ms: u64,
    /// Delay between two consecutive window moves of the same group.
    pub move_stagger_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 150,
            debounce_ms: 50,
            move_stagger_ms: 10,
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero period would spin the poll forever within one tick.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn move_stagger(&self) -> Duration {
        Duration::from_millis(self.move_stagger_ms)
    }
}

impl Config {
    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Why a config file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not a valid monsync config: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// The file does not exist, which simply means "use the defaults".
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ConfigError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
