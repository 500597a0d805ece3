//! Environment variable and home directory expansion for configuration paths.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - a leading `~` - expands to the home directory

use crate::ConfigError;

/// Expand environment variable references, then a leading `~`.
///
/// Bare `$VAR` syntax is only expanded alongside a `${}` pattern.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(shellexpand::tilde(&expanded).into_owned())
}

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
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
    fn test_expand_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GLIDE_TEST_OUT", "/srv/slides");
        }
        let result = expand_env("${GLIDE_TEST_OUT}/deck", "build.output_dir").unwrap();
        assert_eq!(result, "/srv/slides/deck");
        unsafe {
            std::env::remove_var("GLIDE_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GLIDE_TEST_UNSET");
        }
        let result = expand_env("${GLIDE_TEST_UNSET:-_build}", "build.output_dir").unwrap();
        assert_eq!(result, "_build");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GLIDE_TEST_MISSING");
        }
        let err = expand_env("${GLIDE_TEST_MISSING}", "build.output_dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in build.output_dir: ${GLIDE_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("$HOME/x", "build.output_dir").unwrap(), "$HOME/x");
    }

    #[test]
    fn test_expand_tilde() {
        let previous = std::env::var_os("HOME");
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("HOME", "/home/presenter");
        }
        let result = expand_path("~/slides", "build.output_dir");
        unsafe {
            match previous {
                Some(home) => std::env::set_var("HOME", home),
                None => std::env::remove_var("HOME"),
            }
        }
        assert_eq!(result.unwrap(), "/home/presenter/slides");
    }

    #[test]
    fn test_tilde_only_at_start() {
        assert_eq!(expand_path("a/~/b", "build.output_dir").unwrap(), "a/~/b");
    }
}
