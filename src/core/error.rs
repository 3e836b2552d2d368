//! Application error types and error handling utilities
//!
//! The fee calculations themselves never fail. Errors only arise at the
//! edges: loading configuration, validating fee and milestone tables, and
//! parsing user input in the CLI shell.

use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Main application error type
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<Box<AppError>>,
    },

    /// Input validation errors
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
        /// Offending field
        field: Option<String>,
        /// Offending value, rendered as text
        value: Option<String>,
    },

    /// A fee tier or milestone table breaks one of its invariants
    #[error("Invalid {table} schedule: {message}")]
    Schedule {
        /// Which table was rejected (`fee_tiers`, `milestones`)
        table: String,
        /// Human-readable description
        message: String,
    },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable description
        message: String,
        /// Component that raised the error
        component: Option<String>,
        /// Underlying cause, if any
        #[source]
        source: Option<Box<AppError>>,
    },
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Bad user input, nothing to page anyone about
    Low,
    /// Degraded but recoverable
    Medium,
    /// The engine cannot be built
    High,
    /// Should never happen
    Critical,
}

/// Error context for additional debugging information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Component where the error occurred
    pub component: String,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Timestamp when the error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Configuration and setup errors
    Configuration,
    /// Business rule table errors
    Business,
    /// Validation and input errors
    Validation,
    /// System errors
    System,
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            value: None,
        }
    }

    /// Create a validation error pinned to a field
    pub fn invalid_field<F: Into<String>, V: ToString>(field: F, value: V, message: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            field: Some(field.into()),
            value: Some(value.to_string()),
        }
    }

    /// Create a new schedule error
    pub fn schedule<T: Into<String>, S: Into<String>>(table: T, message: S) -> Self {
        Self::Schedule {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            component: None,
            source: None,
        }
    }

    /// Get the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Configuration,
            Self::Schedule { .. } => ErrorKind::Business,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Internal { .. } => ErrorKind::System,
        }
    }

    /// Get the error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } => ErrorSeverity::Low,
            Self::Config { .. } | Self::Schedule { .. } => ErrorSeverity::High,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Add source error
    pub fn with_source(mut self, source: AppError) -> Self {
        match &mut self {
            Self::Config { source: s, .. } | Self::Internal { source: s, .. } => {
                *s = Some(Box::new(source));
            }
            _ => {}
        }
        self
    }

    /// Convert to error context for logging
    pub fn to_context(&self, component: &str) -> ErrorContext {
        let mut metadata = std::collections::HashMap::new();

        match self {
            Self::Validation { field, value, .. } => {
                if let Some(f) = field {
                    metadata.insert("field".to_string(), f.clone());
                }
                if let Some(v) = value {
                    metadata.insert("value".to_string(), v.clone());
                }
            }
            Self::Schedule { table, .. } => {
                metadata.insert("table".to_string(), table.clone());
            }
            _ => {}
        }

        ErrorContext {
            severity: self.severity(),
            component: component.to_string(),
            metadata,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation(format!("JSON serialization error: {err}"))
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config(format!("YAML parsing error: {err}"))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {err}"))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::config(format!("Environment configuration error: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("IO error: {err}"))
    }
}
