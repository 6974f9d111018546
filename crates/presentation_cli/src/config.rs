//! Configuration loading for the CLI
//!
//! Settings come from an optional TOML file; credentials given on the
//! command line or through `HERE_API_KEY` / `HERE_ACCESS_TOKEN` take
//! precedence over the file.

use std::path::Path;

use anyhow::Context;
use integration_here::HereConfig;
use secrecy::SecretString;
use tracing::debug;

/// Command-line overrides applied on top of the file
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub accept_invalid_certs: bool,
}

/// Load the client configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the resulting
/// configuration is invalid.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> anyhow::Result<HereConfig> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration file");
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        },
        None => HereConfig::default(),
    };

    if let Some(api_key) = overrides.api_key {
        config.api_key = Some(SecretString::from(api_key));
    }
    if let Some(access_token) = overrides.access_token {
        config.access_token = Some(SecretString::from(access_token));
    }
    if overrides.accept_invalid_certs {
        config.accept_invalid_certs = true;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_file_settings() {
        let file = write_config(
            r#"
            api_key = "file-key"
            router_base_url = "http://localhost:8080"
            timeout_secs = 3
            "#,
        );

        let config = load_config(Some(file.path()), Overrides::default()).unwrap();
        assert_eq!(config.api_key(), Some("file-key"));
        assert_eq!(config.router_base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 3);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn overrides_take_precedence() {
        let file = write_config(r#"api_key = "file-key""#);
        let overrides = Overrides {
            api_key: Some("cli-key".to_string()),
            access_token: Some("cli-token".to_string()),
            accept_invalid_certs: true,
        };

        let config = load_config(Some(file.path()), overrides).unwrap();
        assert_eq!(config.api_key(), Some("cli-key"));
        assert_eq!(config.access_token(), Some("cli-token"));
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn works_without_file() {
        let overrides = Overrides {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let config = load_config(None, overrides).unwrap();
        assert_eq!(config.geocode_base_url, "https://geocode.search.hereapi.com");
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = load_config(None, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn unreadable_file_is_reported() {
        let result = load_config(Some(Path::new("/nonexistent/here.toml")), Overrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn malformed_file_is_reported() {
        let file = write_config("timeout_secs = \"soon\"");
        let err = load_config(Some(file.path()), Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
