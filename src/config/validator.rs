//! Settings validation.
//!
//! Collects every problem found in a settings file, then reports the first
//! error together with its field path.

use crate::error::{ConfigError, EnvStateError, Result};
use tracing::debug;

use super::spec::{Settings, StoreBackend};

/// Upper bound on resolve attempts per reconcile pass.
const MAX_ATTEMPTS_LIMIT: u32 = 20;

/// Validator for settings.
#[derive(Debug, Default)]
pub struct SettingsValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl SettingsValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates settings.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem if validation fails.
    pub fn validate(&self, settings: &Settings) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_store(settings, &mut result);
        Self::validate_reconcile(settings, &mut result);
        Self::validate_logging(settings, &mut result);

        if result.errors.is_empty() {
            debug!("Settings validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(EnvStateError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    fn validate_store(settings: &Settings, result: &mut ValidationResult) {
        match settings.store.backend {
            StoreBackend::Local => {
                if settings
                    .store
                    .path
                    .as_ref()
                    .is_some_and(|p| p.as_os_str().is_empty())
                {
                    result.errors.push(ValidationError {
                        field: String::from("store.path"),
                        message: String::from("Store path cannot be empty"),
                    });
                }
            }
            StoreBackend::Memory => {
                result.warnings.push(String::from(
                    "Memory store selected: environments are lost when the process exits",
                ));
                if settings.store.path.is_some() {
                    result
                        .warnings
                        .push(String::from("store.path is ignored by the memory backend"));
                }
            }
        }
    }

    fn validate_reconcile(settings: &Settings, result: &mut ValidationResult) {
        let reconcile = &settings.reconcile;

        if reconcile.max_attempts == 0 {
            result.errors.push(ValidationError {
                field: String::from("reconcile.max_attempts"),
                message: String::from("At least one resolve attempt is required"),
            });
        } else if reconcile.max_attempts > MAX_ATTEMPTS_LIMIT {
            result.errors.push(ValidationError {
                field: String::from("reconcile.max_attempts"),
                message: format!(
                    "max_attempts {} exceeds the limit of {MAX_ATTEMPTS_LIMIT}",
                    reconcile.max_attempts
                ),
            });
        }

        if reconcile.source_path.is_none() {
            result.warnings.push(String::from(
                "reconcile.source_path is not set; reconcile requires --source",
            ));
        }
    }

    fn validate_logging(settings: &Settings, result: &mut ValidationResult) {
        if let Some(level) = &settings.logging.level
            && tracing_subscriber::EnvFilter::try_new(level).is_err()
        {
            result.errors.push(ValidationError {
                field: String::from("logging.level"),
                message: format!("Invalid log filter directive '{level}'"),
            });
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_settings_are_valid() {
        let result = SettingsValidator::new().validate(&Settings::default()).unwrap();

        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut settings = Settings::default();
        settings.reconcile.max_attempts = 0;

        let err = SettingsValidator::new().validate(&settings).unwrap_err();
        match err {
            EnvStateError::Config(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field.as_deref(), Some("reconcile.max_attempts"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_store_path_rejected() {
        let mut settings = Settings::default();
        settings.store.path = Some(PathBuf::new());

        assert!(SettingsValidator::new().validate(&settings).is_err());
    }

    #[test]
    fn test_memory_backend_warns() {
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Memory;
        settings.reconcile.source_path = Some(PathBuf::from("/desired"));

        let result = SettingsValidator::new().validate(&settings).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }
}
