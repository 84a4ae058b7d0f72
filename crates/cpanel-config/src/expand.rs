//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CPANEL_TEST_VAR_SIMPLE", "localhost");
        }
        let result = expand_env("${CPANEL_TEST_VAR_SIMPLE}", "host.host").unwrap();
        assert_eq!(result, "localhost");
        unsafe {
            std::env::remove_var("CPANEL_TEST_VAR_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CPANEL_UNSET_VAR_TEST");
        }
        let result = expand_env("${CPANEL_UNSET_VAR_TEST:-0.0.0.0}", "panel.bind_host").unwrap();
        assert_eq!(result, "0.0.0.0");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CPANEL_MISSING_VAR_TEST");
        }
        let err = expand_env("${CPANEL_MISSING_VAR_TEST}", "host.host").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("CPANEL_MISSING_VAR_TEST"));
        assert!(err.to_string().contains("host.host"));
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("127.0.0.1", "host.host").unwrap();
        assert_eq!(result, "127.0.0.1");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("$HOST", "host.host").unwrap();
        assert_eq!(result, "$HOST");
    }
}
