//! Credential resolution for the remote analysis backend.
//!
//! A credential can come from three places, checked in priority order:
//!
//! 1. **Direct value** - inline in the config (`api_key`), handy for local runs
//! 2. **File reference** - Docker secrets style (`api_key_file: /run/secrets/openai`)
//! 3. **Env var reference** - (`api_key_env_var: OPENAI_API_KEY`)
//!
//! The resolved value is wrapped in [`SecretString`] so it never shows up in
//! `Debug` output or log lines.

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from the first source that yields a non-empty value.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct {
        if !value.is_empty() {
            return Ok(SecretString::from(value.to_string()));
        }
    }

    if let Some(path) = file_path {
        if !path.is_empty() {
            let expanded = expand_home(path);
            return match fs::read_to_string(&expanded) {
                Ok(content) => Ok(SecretString::from(content.trim().to_string())),
                Err(e) => Err(SecretError::FileReadError {
                    path: expanded,
                    source: e,
                }),
            };
        }
    }

    if let Some(var_name) = env_var {
        if !var_name.is_empty() {
            return match std::env::var(var_name) {
                // Env vars may carry a trailing newline when set from files
                Ok(value) => Ok(SecretString::from(value.trim())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: var_name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: var_name.to_string(),
                }),
            };
        }
    }

    Err(SecretError::NoSourceProvided)
}

/// Resolves an optional secret.
///
/// Returns `Ok(None)` when no source is configured, when the referenced env
/// var is unset, or when the resolved value is blank. A configured file that
/// cannot be read is still an error.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    use secrecy::ExposeSecret;

    match resolve_secret(direct, file_path, env_var) {
        Ok(secret) if secret.expose_secret().trim().is_empty() => Ok(None),
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) | Err(SecretError::EnvVarNotSet { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Checks if at least one secret source is configured (non-empty).
pub fn has_secret_source(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> bool {
    direct.is_some_and(|s| !s.is_empty())
        || file_path.is_some_and(|s| !s.is_empty())
        || env_var.is_some_and(|s| !s.is_empty())
}

/// Expands a leading `~` to the user's home directory (HOME, then USERPROFILE).
/// `~user/path` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn test_direct_value_takes_priority() {
        std::env::set_var("DOCINSIGHT_TEST_KEY_1", "env_value");
        let result =
            resolve_secret(Some("sk-direct"), None, Some("DOCINSIGHT_TEST_KEY_1")).unwrap();
        assert_eq!(result.expose_secret(), "sk-direct");
        std::env::remove_var("DOCINSIGHT_TEST_KEY_1");
    }

    #[test]
    #[serial]
    fn test_file_takes_priority_over_env() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "sk-from-file").unwrap();

        std::env::set_var("DOCINSIGHT_TEST_KEY_2", "env_value");
        let result = resolve_secret(
            None,
            Some(temp_file.path().to_str().unwrap()),
            Some("DOCINSIGHT_TEST_KEY_2"),
        )
        .unwrap();
        assert_eq!(result.expose_secret(), "sk-from-file");
        std::env::remove_var("DOCINSIGHT_TEST_KEY_2");
    }

    #[test]
    #[serial]
    fn test_env_var_fallback() {
        std::env::set_var("DOCINSIGHT_TEST_KEY_3", "  sk-env\n");
        let result = resolve_secret(None, None, Some("DOCINSIGHT_TEST_KEY_3")).unwrap();
        assert_eq!(result.expose_secret(), "sk-env");
        std::env::remove_var("DOCINSIGHT_TEST_KEY_3");
    }

    #[test]
    fn test_no_source_error() {
        let result = resolve_secret(None, None, None);
        assert!(matches!(result, Err(SecretError::NoSourceProvided)));
    }

    #[test]
    fn test_file_not_found_error() {
        let result = resolve_secret(None, Some("/nonexistent/path/to/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    fn test_optional_treats_unset_env_var_as_absent() {
        let result =
            resolve_secret_optional(None, None, Some("DOCINSIGHT_DEFINITELY_UNSET_12345")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_optional_treats_blank_value_as_absent() {
        let result = resolve_secret_optional(Some("   "), None, None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_optional_still_reports_unreadable_file() {
        let result = resolve_secret_optional(None, Some("/nonexistent/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    fn test_has_secret_source() {
        assert!(has_secret_source(Some("value"), None, None));
        assert!(has_secret_source(None, Some("/path"), None));
        assert!(has_secret_source(None, None, Some("ENV_VAR")));
        assert!(!has_secret_source(None, None, None));
        assert!(!has_secret_source(Some(""), Some(""), Some("")));
    }

    #[test]
    #[serial]
    fn test_expand_home() {
        assert_eq!(expand_home("/absolute/path"), "/absolute/path");
        assert_eq!(expand_home("relative/path"), "relative/path");

        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_home("~/key"), format!("{}/key", home));
            assert_eq!(expand_home("~"), home);
        }
    }
}
