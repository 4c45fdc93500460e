//! Config loading for apptail.
//!
//! Loads and validates the winning YAML config file, then applies
//! environment overrides.

use std::fs;
use std::path::Path;

use crate::config::discovery::DiscoveryResult;
use crate::config::error::ConfigError;
use crate::config::types::{Config, RawConfig};

/// Overrides `api_url`.
pub const ENV_API_URL: &str = "APPTAIL_API_URL";
/// Overrides `api_token`.
pub const ENV_API_TOKEN: &str = "APPTAIL_API_TOKEN";

/// Load and parse a YAML config file.
///
/// Returns the parsed RawConfig or a ConfigError with location and suggestions.
fn load_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    // A file holding only comments is an empty config, not a null document.
    let has_content = content
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#'));
    if !has_content {
        return Ok(RawConfig::default());
    }

    let raw: RawConfig = serde_saphyr::from_str(&content)
        .map_err(|e| ConfigError::from_parse_message(path.to_path_buf(), e.to_string()))?;
    validate(path, &raw)?;
    Ok(raw)
}

/// Semantic checks the YAML types cannot express.
fn validate(path: &Path, raw: &RawConfig) -> Result<(), ConfigError> {
    if let Some(api_url) = &raw.api_url {
        match url::Url::parse(api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Validation {
                    path: path.to_path_buf(),
                    message: format!("api_url must be http or https, got '{}'", url.scheme()),
                })
            }
            Err(e) => {
                return Err(ConfigError::Validation {
                    path: path.to_path_buf(),
                    message: format!("api_url '{}' is not a valid URL: {}", api_url, e),
                })
            }
        }
    }
    if raw.reconnect.as_ref().and_then(|r| r.max_attempts) == Some(0) {
        return Err(ConfigError::Validation {
            path: path.to_path_buf(),
            message: "reconnect.max_attempts must be at least 1 (omit it to retry forever)"
                .to_string(),
        });
    }
    Ok(())
}

/// Load a single config file over the defaults, without environment
/// overrides. Used by `config validate`.
pub fn load_single_file(path: &Path) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    config.apply(load_file(path)?);
    config.loaded_from.push(path.to_path_buf());
    Ok(config)
}

/// Load the effective configuration.
///
/// The closest config file wins completely (project over global). Returns
/// defaults when no config file exists. Environment overrides come last.
pub fn load(discovery: &DiscoveryResult) -> Result<Config, ConfigError> {
    load_with_env(discovery, |key| std::env::var(key).ok())
}

/// [`load`] with an injectable environment lookup.
pub fn load_with_env<F>(discovery: &DiscoveryResult, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match discovery.effective() {
        Some(path) => load_single_file(path)?,
        None => Config::default(),
    };

    if let Some(api_url) = env(ENV_API_URL).filter(|v| !v.is_empty()) {
        config.api_url = Some(api_url);
    }
    if let Some(token) = env(ENV_API_TOKEN).filter(|v| !v.is_empty()) {
        config.api_token = Some(token);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::TransportPreference;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn project(temp: &TempDir, yaml: &str) -> DiscoveryResult {
        let config_path = temp.path().join("apptail.yaml");
        fs::write(&config_path, yaml).unwrap();
        DiscoveryResult {
            project_config: Some(config_path),
            global_config: None,
        }
    }

    #[test]
    fn test_load_empty_discovery() {
        let config = load_with_env(&DiscoveryResult::default(), no_env).unwrap();

        assert!(config.api_url.is_none());
        assert_eq!(config.lines, 20);
        assert!(config.color);
        assert_eq!(config.transport, TransportPreference::Auto);
        assert!(config.loaded_from.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        let discovery = project(
            &temp,
            r#"
api_url: https://api.example.com
api_token: tk-secret
color: false
lines: 100
transport: event-stream
reconnect:
  interval_ms: 500
  max_attempts: 10
"#,
        );

        let config = load_with_env(&discovery, no_env).unwrap();

        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.api_token.as_deref(), Some("tk-secret"));
        assert!(!config.color);
        assert_eq!(config.lines, 100);
        assert_eq!(config.transport, TransportPreference::EventStream);
        assert_eq!(config.reconnect.interval, Duration::from_millis(500));
        assert_eq!(config.reconnect.max_attempts, Some(10));
        assert_eq!(config.loaded_from, vec![temp.path().join("apptail.yaml")]);
    }

    #[test]
    fn test_load_empty_yaml() {
        let temp = TempDir::new().unwrap();
        let discovery = project(&temp, "# Empty config\n");

        let config = load_with_env(&discovery, no_env).unwrap();

        assert!(config.api_url.is_none());
        assert_eq!(config.lines, 20);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let discovery = project(&temp, "api_url: https://file.example.com\napi_token: from-file\n");

        let config = load_with_env(&discovery, |key| match key {
            ENV_API_URL => Some("https://env.example.com".to_string()),
            ENV_API_TOKEN => Some(String::new()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.api_token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_load_unknown_field_error() {
        let temp = TempDir::new().unwrap();
        let discovery = project(&temp, "api_ulr: https://api.example.com\n");

        let err = load_with_env(&discovery, no_env).unwrap_err();

        match err {
            ConfigError::Parse {
                message,
                suggestion,
                ..
            } => {
                assert!(message.contains("api_ulr"), "message: {}", message);
                assert_eq!(suggestion.as_deref(), Some("api_url"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_unknown_transport_error() {
        let temp = TempDir::new().unwrap();
        let discovery = project(&temp, "transport: carrier-pigeon\n");

        let err = load_with_env(&discovery, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_api_url_is_validation_error() {
        let temp = TempDir::new().unwrap();
        let discovery = project(&temp, "api_url: ftp://api.example.com\n");

        let err = load_with_env(&discovery, no_env).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref message, .. } if message.contains("ftp"))
        );
    }

    #[test]
    fn test_zero_max_attempts_rejected() {
        let temp = TempDir::new().unwrap();
        let discovery = project(&temp, "reconnect:\n  max_attempts: 0\n");

        let err = load_with_env(&discovery, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_single_file(&PathBuf::from("/nonexistent/apptail.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
