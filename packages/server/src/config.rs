//! Server configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, environment variables (`BIND_ADDR`, `PORT`,
//! `VIRALCAST_ASSETS_DIR`, `VIRALCAST_VARIANT`), and command-line flags
//! applied by the binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Port used when neither the config file nor `PORT` provides one.
pub const DEFAULT_PORT: u16 = 5000;

/// Variant reported by `/api/current-stats` unless overridden.
pub const DEFAULT_VARIANT: &str = "PQ.2";

/// Errors that can occur while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Runtime settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory searched for `models/` and `output/` (its parent is tried
    /// next).
    pub assets_dir: PathBuf,
    /// Dominant variant label.
    pub variant: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            assets_dir: PathBuf::from("."),
            variant: DEFAULT_VARIANT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Parses a TOML document. Omitted keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    ///
    /// An unparseable `PORT` is logged and replaced by [`DEFAULT_PORT`].
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.bind_addr = bind_addr;
        }

        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().unwrap_or_else(|_| {
                log::warn!("Invalid PORT {port:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            });
        }

        if let Some(assets_dir) = lookup("VIRALCAST_ASSETS_DIR") {
            self.assets_dir = PathBuf::from(assets_dir);
        }

        if let Some(variant) = lookup("VIRALCAST_VARIANT") {
            self.variant = variant;
        }
    }
}
