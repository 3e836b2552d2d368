//! Result type definitions and utilities for the application

use crate::core::error::AppError;

/// Application result type alias
///
/// # Examples
///
/// ```rust
/// use shx_fee_engine::core::result::AppResult;
/// use shx_fee_engine::core::error::AppError;
///
/// fn example_function() -> AppResult<u32> {
///     Ok(18)
/// }
///
/// fn failing_function() -> AppResult<()> {
///     Err(AppError::validation("Invalid input"))
/// }
/// ```
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Extension trait for `Result` to provide additional utility methods
pub trait ResultExt<T> {
    /// Map an error to a configuration error, keeping the original message
    fn map_config_err<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;

    /// Map an error to a validation error with field context
    fn map_validation_err<F>(self, field: &str, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;

    /// Add context to any error
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn map_config_err<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::config(format!("{}: {e}", f())))
    }

    fn map_validation_err<F>(self, field: &str, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::Validation {
            message: format!("{}: {e}", f()),
            field: Some(field.to_string()),
            value: None,
        })
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::internal(format!("{}: {e}", f())))
    }
}

/// Macros for convenient error handling
#[macro_export]
macro_rules! bail_config {
    ($msg:expr) => {
        return Err($crate::core::error::AppError::config($msg))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::core::error::AppError::config(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! bail_validation {
    ($msg:expr) => {
        return Err($crate::core::error::AppError::validation($msg))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::core::error::AppError::validation(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
