//! Generic helpers shared by provider bindings and the fakes.
//!
//! - [`validate_resource_name`] - Validate resource names
//! - [`config_from_env`] - Collect prefixed environment variables
//! - [`IntoCloudError`] - Convert foreign errors into [`CloudError`]

use crate::cloud::traits::{CloudError, CloudResult, ErrorKind};
use std::collections::HashMap;

// ============================================================================
// Config Helpers
// ============================================================================

/// Collect environment variables starting with `prefix`.
///
/// Keys are returned with the prefix stripped and lower-cased, so
/// `STRATUS_THREADS=4` with prefix `STRATUS_` yields `threads -> 4`.
#[must_use]
pub fn config_from_env(prefix: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();

    for (key, value) in std::env::vars() {
        if let Some(key_name) = key.strip_prefix(prefix) {
            config.insert(key_name.to_lowercase(), value);
        }
    }

    config
}

// ============================================================================
// Error Conversion Helpers
// ============================================================================

/// Convert common error types to `CloudError`
pub trait IntoCloudError<T> {
    /// Convert a standard Result to a cloud Result
    ///
    /// # Errors
    ///
    /// Returns a `CloudError` with the specified kind if the Result is an error
    fn into_cloud_error(self, kind: ErrorKind) -> CloudResult<T>;
}

impl<T, E: std::error::Error> IntoCloudError<T> for std::result::Result<T, E> {
    fn into_cloud_error(self, kind: ErrorKind) -> CloudResult<T> {
        self.map_err(|e| CloudError::new(kind, e.to_string()))
    }
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate a resource name according to common cloud provider rules
///
/// # Errors
///
/// Returns an error if:
/// - The resource name is empty
/// - The resource name exceeds 255 characters
/// - The resource name contains invalid characters (only alphanumeric, hyphens, underscores, and periods are allowed)
pub fn validate_resource_name(name: &str) -> CloudResult<()> {
    if name.is_empty() {
        return Err(CloudError::new(
            ErrorKind::InvalidInput,
            "Resource name cannot be empty",
        ));
    }

    if name.len() > 255 {
        return Err(CloudError::new(
            ErrorKind::InvalidInput,
            "Resource name too long (max 255 characters)",
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(CloudError::new(
            ErrorKind::InvalidInput,
            format!("Resource name contains invalid characters: {name:?}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_resource_name() {
        assert!(validate_resource_name("my-resource").is_ok());
        assert!(validate_resource_name("my_resource").is_ok());
        assert!(validate_resource_name("my.resource").is_ok());
        assert!(validate_resource_name("").is_err());
        assert!(validate_resource_name("invalid name with spaces").is_err());
        assert!(validate_resource_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_into_cloud_error() {
        let parsed: Result<u32, _> = "not-a-number".parse::<u32>();
        let err = parsed.into_cloud_error(ErrorKind::InvalidInput).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }
}
