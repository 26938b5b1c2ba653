//! Settings parser for loading configuration files.
//!
//! This module handles loading settings from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, EnvStateError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::spec::Settings;

/// Settings parser.
#[derive(Debug, Default)]
pub struct SettingsParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl SettingsParser {
    /// Creates a new settings parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        info!("Loading settings from: {}", path.display());

        if !path.exists() {
            return Err(EnvStateError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            EnvStateError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        let mut settings = self.parse_yaml(&content, Some(path))?;
        self.resolve_relative_paths(&mut settings);
        Ok(settings)
    }

    /// Parses settings from a YAML string.
    ///
    /// An empty document yields the default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Settings> {
        debug!("Parsing YAML settings");

        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            EnvStateError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })
    }

    /// Loads settings with environment variable overrides.
    ///
    /// Recognized variables: `ENVSTATE_STORE_PATH`, `ENVSTATE_SOURCE_PATH`,
    /// `ENVSTATE_MAX_ATTEMPTS` and `ENVSTATE_LOG_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an override
    /// holds an invalid value.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<Settings> {
        let mut settings = self.load_file(path)?;
        apply_overrides(&mut settings, |name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                EnvStateError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Resolves relative store and source paths against the base path.
    fn resolve_relative_paths(&self, settings: &mut Settings) {
        let Some(base) = &self.base_path else {
            return;
        };

        if let Some(path) = &settings.store.path
            && path.is_relative()
        {
            settings.store.path = Some(base.join(path));
        }

        if let Some(path) = &settings.reconcile.source_path
            && path.is_relative()
        {
            settings.reconcile.source_path = Some(base.join(path));
        }
    }
}

/// Applies `ENVSTATE_*` overrides read through `lookup`.
///
/// # Errors
///
/// Returns an error if an override holds an invalid value.
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("ENVSTATE_STORE_PATH") {
        debug!("Overriding store.path from environment");
        settings.store.path = Some(PathBuf::from(path));
    }

    if let Some(path) = lookup("ENVSTATE_SOURCE_PATH") {
        debug!("Overriding reconcile.source_path from environment");
        settings.reconcile.source_path = Some(PathBuf::from(path));
    }

    if let Some(value) = lookup("ENVSTATE_MAX_ATTEMPTS") {
        debug!("Overriding reconcile.max_attempts from environment");
        settings.reconcile.max_attempts = value.parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: String::from("ENVSTATE_MAX_ATTEMPTS"),
            value: value.clone(),
        })?;
    }

    if let Some(value) = lookup("ENVSTATE_LOG_FORMAT") {
        debug!("Overriding logging.format from environment");
        settings.logging.format = value.parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: String::from("ENVSTATE_LOG_FORMAT"),
            value: value.clone(),
        })?;
    }

    Ok(())
}

/// Default settings file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["envstate.yaml", "envstate.yml", ".envstate.yaml"];

/// Finds the settings file in the given directory or its parents.
///
/// A relative `start_dir` is taken from the current directory, so the
/// search always reaches the filesystem root.
///
/// Returns `None` when no file is found; settings are optional.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_default();
    find_config_file_from(start_dir.as_ref(), &cwd)
}

fn find_config_file_from(start_dir: &Path, cwd: &Path) -> Option<PathBuf> {
    let mut current = normalize(&cwd.join(start_dir));

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found settings file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
