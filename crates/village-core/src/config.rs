//! Project configuration loaded from `.shapevillage/config.json`.
//!
//! Configuration is optional. Every section falls back to defaults, so a
//! missing file or a partial file both work.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "subgraph_url": "https://example.com/subgraphs/shapevillage/api",
//!   "sentinel": "0x0000000000000000000000000000000000000000",
//!   "layout": {
//!     "horizontal_spacing": 600.0,
//!     "horizontal_offset": 200.0,
//!     "vertical_spacing": 350.0,
//!     "vertical_offset": 200.0
//!   },
//!   "server": { "port": 7432 }
//! }
//! ```

use crate::character::ZERO_ADDRESS;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding ShapeVillage state inside a project.
pub const CONFIG_DIR: &str = ".shapevillage";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding [`Config::subgraph_url`].
pub const SUBGRAPH_URL_ENV: &str = "SHAPEVILLAGE_SUBGRAPH_URL";

/// The deployed village subgraph; point elsewhere with [`SUBGRAPH_URL_ENV`].
const DEFAULT_SUBGRAPH_URL: &str = "https://subgraph.satsuma-prod.com/d928402980bf/leo-franklin-johns-team--150303/example-subgraph-name/version/v0.0.3/api";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schema version. Informational only.
    #[serde(default = "default_version")]
    pub version: String,

    /// GraphQL endpoint of the village subgraph.
    #[serde(default = "default_subgraph_url")]
    pub subgraph_url: String,

    /// Identifier marking an empty parent slot.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    #[serde(default)]
    pub layout: LayoutSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

/// Spacing used when positioning lineage nodes.
///
/// These are presentation parameters. They never change generations or
/// edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default = "default_horizontal_spacing")]
    pub horizontal_spacing: f64,
    #[serde(default = "default_offset")]
    pub horizontal_offset: f64,
    #[serde(default = "default_vertical_spacing")]
    pub vertical_spacing: f64,
    #[serde(default = "default_offset")]
    pub vertical_offset: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            horizontal_spacing: default_horizontal_spacing(),
            horizontal_offset: default_offset(),
            vertical_spacing: default_vertical_spacing(),
            vertical_offset: default_offset(),
        }
    }
}

/// JSON-RPC server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_subgraph_url() -> String {
    DEFAULT_SUBGRAPH_URL.to_string()
}

fn default_sentinel() -> String {
    ZERO_ADDRESS.to_string()
}

fn default_horizontal_spacing() -> f64 {
    600.0
}

fn default_vertical_spacing() -> f64 {
    350.0
}

fn default_offset() -> f64 {
    200.0
}

fn default_port() -> u16 {
    7432
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            subgraph_url: default_subgraph_url(),
            sentinel: default_sentinel(),
            layout: LayoutSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Config {
    /// Path of the config file for a project root.
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads the config for a project root.
    ///
    /// A missing file yields defaults. The subgraph URL can be overridden
    /// through `SHAPEVILLAGE_SUBGRAPH_URL`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(root);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(url) = std::env::var(SUBGRAPH_URL_ENV) {
            if !url.trim().is_empty() {
                config.subgraph_url = url;
            }
        }

        Ok(config)
    }

    /// Reads a config file without applying environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::invalid(path, e))
    }

    /// Writes the config under `root`, creating the state directory.
    pub fn write(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).map_err(|e| ConfigError::io(&dir, e))?;

        let path = dir.join(CONFIG_FILE);
        let text = serde_json::to_string_pretty(self).map_err(|e| ConfigError::invalid(&path, e))?;
        fs::write(&path, text).map_err(|e| ConfigError::io(&path, e))?;
        Ok(path)
    }

    /// Directory of the local snapshot store.
    pub fn snapshot_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join("snapshots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"layout": {"vertical_spacing": 100.0}}"#).unwrap();
        assert_eq!(config.sentinel, ZERO_ADDRESS);
        assert_eq!(config.layout.vertical_spacing, 100.0);
        assert_eq!(config.layout.horizontal_spacing, 600.0);
        assert_eq!(config.layout.vertical_offset, 200.0);
        assert!(config
            .subgraph_url
            .ends_with("/example-subgraph-name/version/v0.0.3/api"));
        assert_eq!(config.server.port, 7432);
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.server.port = 9000;

        let path = config.write(dir.path()).unwrap();
        assert!(path.ends_with("config.json"));

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
