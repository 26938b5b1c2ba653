//! Configuration module for the envstate tool.
//!
//! This module handles all settings-related functionality:
//! - Parsing and deserializing `envstate.yaml`
//! - Applying `ENVSTATE_*` environment overrides
//! - Validation of settings values

mod parser;
mod spec;
mod validator;

pub use parser::{apply_overrides, find_config_file, SettingsParser, DEFAULT_CONFIG_FILES};
pub use spec::{LogFormat, LoggingConfig, ReconcileConfig, Settings, StoreBackend, StoreConfig};
pub use validator::{SettingsValidator, ValidationError, ValidationResult};
