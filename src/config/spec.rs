//! Settings types for the envstate tool.
//!
//! This module defines the structs that map to the `envstate.yaml` file.
//! Every section is optional; missing values fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Environment store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Reconciliation configuration.
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Environment store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend type.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base directory for the local backend. Defaults to the user data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Store backend types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Local file-based storage.
    #[default]
    Local,
    /// Process-local memory; nothing survives the process.
    Memory,
}

/// Reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Directory holding desired states as `<project>/<name>.yaml`.
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    /// Attempts made to resolve desired materials before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between resolve attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: Option<String>,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    2000
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            source_path: None,
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Settings {
    /// Applies command-line overrides, which win over the file and the
    /// environment. Validate afterwards.
    pub const fn apply_cli_overrides(&mut self, max_attempts: Option<u32>) {
        if let Some(max_attempts) = max_attempts {
            self.reconcile.max_attempts = max_attempts;
        }
    }
}

impl ReconcileConfig {
    /// Returns the retry delay as a duration.
    #[must_use]
    pub const fn retry_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retry_delay_ms)
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}
