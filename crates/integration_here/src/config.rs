//! HERE client configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Configuration for the HERE API clients
///
/// Base URLs are configurable so tests can point the client at a mock server.
#[derive(Clone, Serialize, Deserialize)]
pub struct HereConfig {
    /// HERE API key, sent as the `apikey` query parameter
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// OAuth bearer token, sent as `bearerAuth` on matrix routing calls
    #[serde(default, skip_serializing)]
    pub access_token: Option<SecretString>,

    /// Base URL for geocode, revgeocode and browse
    #[serde(default = "default_geocode_base_url")]
    pub geocode_base_url: String,

    /// Base URL for the legacy 6.2 geocoder
    #[serde(default = "default_legacy_geocode_base_url")]
    pub legacy_geocode_base_url: String,

    /// Base URL for the v8 router
    #[serde(default = "default_router_base_url")]
    pub router_base_url: String,

    /// Base URL for the v8 matrix router
    #[serde(default = "default_matrix_base_url")]
    pub matrix_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip TLS certificate verification (off unless explicitly enabled)
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl std::fmt::Debug for HereConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HereConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field(
                "access_token",
                &if self.access_token.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("geocode_base_url", &self.geocode_base_url)
            .field("legacy_geocode_base_url", &self.legacy_geocode_base_url)
            .field("router_base_url", &self.router_base_url)
            .field("matrix_base_url", &self.matrix_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_geocode_base_url() -> String {
    "https://geocode.search.hereapi.com".to_string()
}

fn default_legacy_geocode_base_url() -> String {
    "https://geocoder.ls.hereapi.com".to_string()
}

fn default_router_base_url() -> String {
    "https://router.hereapi.com".to_string()
}

fn default_matrix_base_url() -> String {
    "https://matrix.router.hereapi.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("here-maps-helpers/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HereConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            access_token: None,
            geocode_base_url: default_geocode_base_url(),
            legacy_geocode_base_url: default_legacy_geocode_base_url(),
            router_base_url: default_router_base_url(),
            matrix_base_url: default_matrix_base_url(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }
}

impl HereConfig {
    /// Create a configuration with the given API key and default endpoints
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            ..Default::default()
        }
    }

    /// Create a configuration suitable for testing, with every endpoint on `base_url`
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: Some(SecretString::from("test-key".to_string())),
            access_token: Some(SecretString::from("test-token".to_string())),
            geocode_base_url: base_url.to_string(),
            legacy_geocode_base_url: base_url.to_string(),
            router_base_url: base_url.to_string(),
            matrix_base_url: base_url.to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// The API key, if configured and non-empty
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|secret| secret.expose_secret())
            .filter(|key| !key.is_empty())
    }

    /// The bearer token, if configured and non-empty
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_ref()
            .map(|secret| secret.expose_secret())
            .filter(|token| !token.is_empty())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key().is_none() {
            return Err("api_key must be set".to_string());
        }

        for (name, url) in [
            ("geocode_base_url", &self.geocode_base_url),
            ("legacy_geocode_base_url", &self.legacy_geocode_base_url),
            ("router_base_url", &self.router_base_url),
            ("matrix_base_url", &self.matrix_base_url),
        ] {
            if url.is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HereConfig::default();
        assert_eq!(config.geocode_base_url, "https://geocode.search.hereapi.com");
        assert_eq!(config.legacy_geocode_base_url, "https://geocoder.ls.hereapi.com");
        assert_eq!(config.router_base_url, "https://router.hereapi.com");
        assert_eq!(config.matrix_base_url, "https://matrix.router.hereapi.com");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.accept_invalid_certs);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_testing_config() {
        let config = HereConfig::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.router_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.api_key(), Some("test-key"));
        assert_eq!(config.access_token(), Some("test-token"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_requires_api_key() {
        assert!(HereConfig::default().validate().is_err());
        assert!(HereConfig::with_api_key("").validate().is_err());
        assert!(HereConfig::with_api_key("abc").validate().is_ok());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let config = HereConfig {
            matrix_base_url: String::new(),
            ..HereConfig::with_api_key("abc")
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("matrix_base_url"));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = HereConfig {
            timeout_secs: 0,
            ..HereConfig::with_api_key("abc")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = HereConfig::for_testing("http://localhost");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-key"));
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config: HereConfig = toml::from_str(
            r#"
            api_key = "from-file"
            timeout_secs = 12
            accept_invalid_certs = true
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key(), Some("from-file"));
        assert_eq!(config.timeout_secs, 12);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.router_base_url, "https://router.hereapi.com");
    }

    #[test]
    fn test_serialization_skips_secrets() {
        let config = HereConfig::for_testing("http://localhost");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("test-key"));
        let deserialized: HereConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.router_base_url, config.router_base_url);
        assert!(deserialized.api_key.is_none());
    }
}
