//! Input validation helpers for configuration and command-line values

use anyhow::{anyhow, Result};
use std::collections::HashSet;

/// Validate a string length
pub fn validate_string_length(
    value: &str,
    min_length: Option<usize>,
    max_length: Option<usize>,
    field_name: &str,
) -> Result<()> {
    let len = value.len();

    if let Some(min) = min_length {
        if len < min {
            return Err(anyhow!(
                "{} too short: {} characters (minimum: {})",
                field_name, len, min
            ));
        }
    }

    if let Some(max) = max_length {
        if len > max {
            return Err(anyhow!(
                "{} too long: {} characters (maximum: {})",
                field_name, len, max
            ));
        }
    }

    Ok(())
}

/// Validate that a string holds only letters, digits, underscores and hyphens
pub fn validate_identifier(value: &str, field_name: &str) -> Result<()> {
    if value.is_empty() {
        return Err(anyhow!("{} cannot be empty", field_name));
    }

    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(anyhow!(
            "{} must contain only letters, numbers, underscores, and hyphens",
            field_name
        ));
    }

    Ok(())
}

/// Return the items that occur more than once, in first-repeat order
pub fn find_duplicates<T: std::hash::Hash + Eq + Copy>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();

    for item in items {
        if !seen.insert(item) && !repeated.contains(&item) {
            repeated.push(item);
        }
    }

    repeated
}

/// Configuration-specific validation
pub mod config {
    use super::*;

    /// Validate log level
    pub fn validate_log_level(level: &str) -> Result<()> {
        match level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(anyhow!("Invalid log level: {}. Must be 'trace', 'debug', 'info', 'warn', or 'error'", level)),
        }
    }

    /// Validate log format
    pub fn validate_log_format(format: &str) -> Result<()> {
        match format {
            "json" | "pretty" | "compact" => Ok(()),
            _ => Err(anyhow!("Invalid log format '{}'. Must be 'json', 'pretty', or 'compact'", format)),
        }
    }

    /// Validate environment name
    pub fn validate_environment(env: &str) -> Result<()> {
        validate_identifier(env, "Environment")?;
        validate_string_length(env, Some(1), Some(50), "Environment")?;
        Ok(())
    }

    /// Validate a referral code prefix
    pub fn validate_code_prefix(prefix: &str) -> Result<()> {
        validate_string_length(prefix, Some(1), Some(16), "Referral code prefix")?;
        if !prefix.is_ascii() {
            return Err(anyhow!("Referral code prefix must be ASCII: {}", prefix));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_length_validation() {
        assert!(validate_string_length("hello", Some(1), Some(10), "test").is_ok());
        assert!(validate_string_length("", Some(1), None, "test").is_err());
        assert!(validate_string_length("too long string", None, Some(5), "test").is_err());
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("staging-eu_1", "env").is_ok());
        assert!(validate_identifier("", "env").is_err());
        assert!(validate_identifier("prod env", "env").is_err());
    }

    #[test]
    fn test_find_duplicates() {
        assert_eq!(find_duplicates([1, 2, 2, 3, 2, 1]), vec![2, 1]);
        assert!(find_duplicates([1, 2, 3]).is_empty());
    }

    #[test]
    fn test_config_validators() {
        assert!(config::validate_log_level("DEBUG").is_ok());
        assert!(config::validate_log_level("verbose").is_err());
        assert!(config::validate_log_format("json").is_ok());
        assert!(config::validate_log_format("xml").is_err());
        assert!(config::validate_environment("production").is_ok());
        assert!(config::validate_code_prefix("SHX-").is_ok());
        assert!(config::validate_code_prefix("").is_err());
    }
}
