//! Error types for the envstate system.
//!
//! This module provides the error hierarchy for every layer around the
//! materials comparator: configuration, the environment store, the
//! get-environment handler and reconciliation. The comparator itself is
//! total and never fails.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the envstate system.
#[derive(Debug, Error)]
pub enum EnvStateError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Environment store errors.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Errors returned by the API boundary.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// A state file could not be used.
    #[error("Invalid state file {path}: {message}")]
    StateFile {
        /// Path to the state file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// An environment override held an unusable value.
    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnvVar {
        /// Name of the variable.
        name: String,
        /// The rejected value.
        value: String,
    },
}

/// Environment store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The project namespace does not exist.
    #[error("Namespace not found: {project}")]
    NamespaceNotFound {
        /// Project whose namespace is missing.
        project: String,
    },

    /// A stored resource is corrupted.
    #[error("Stored resource is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// The backend could not be read or written.
    #[error("Store backend error: {message}")]
    Backend {
        /// Description of the backend failure.
        message: String,
    },

    /// Serialization error.
    #[error("Resource serialization error: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },

    /// A project or environment name cannot be used as a store key.
    #[error("Invalid resource key: {key}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}

/// Errors exposed by the get-environment boundary.
///
/// Every variant is terminal from the handler's point of view; any retry
/// policy belongs to its caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A required request field is missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The project or the environment does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other failure from the backing store.
    #[error("internal: {0}")]
    Internal(String),
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The environment to reconcile does not exist.
    #[error("Environment '{name}' not found in project '{project}'")]
    EnvironmentNotFound {
        /// Project name.
        project: String,
        /// Environment name.
        name: String,
    },

    /// Desired materials could not be resolved.
    #[error("Failed to resolve materials for {project}/{name}: {reason}")]
    ResolveFailed {
        /// Project name.
        project: String,
        /// Environment name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// Maximum retry attempts exceeded.
    #[error("Maximum retry attempts ({attempts}) exceeded for {resource}")]
    MaxRetriesExceeded {
        /// Number of attempts made.
        attempts: u32,
        /// Resource that failed.
        resource: String,
    },
}

/// Result type alias for envstate operations.
pub type Result<T> = std::result::Result<T, EnvStateError>;

impl EnvStateError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Backend { .. })
                | Self::Reconcile(ReconcileError::ResolveFailed { .. })
                | Self::Io(_)
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl StoreError {
    /// Creates a backend error with the given message.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a corruption error with the given message.
    #[must_use]
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates a serialization error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl ApiError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// The human-readable message without the code prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m) | Self::NotFound(m) | Self::Internal(m) => m,
        }
    }
}
