//! Configuration structures for Hotmart clients.
//!
//! This module provides the client configuration shared by the auth and
//! payments crates: target environment, endpoints, timeouts, retries and the
//! UTC offset used for date filters.

use crate::client::{ClientConfig, RetryPolicy};
use crate::date::DateNormalizer;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api-sec-vlc.hotmart.com/security/oauth/token";

/// Environment variable selecting `production` or `sandbox`.
pub const ENV_ENVIRONMENT: &str = "HOTMART_ENVIRONMENT";
/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "HOTMART_BASE_URL";
/// Environment variable overriding the token endpoint.
pub const ENV_TOKEN_URL: &str = "HOTMART_TOKEN_URL";
/// Environment variable for the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "HOTMART_TIMEOUT_SECS";
/// Environment variable for the maximum retry count.
pub const ENV_MAX_RETRIES: &str = "HOTMART_MAX_RETRIES";
/// Environment variable for the date filter UTC offset in minutes.
pub const ENV_UTC_OFFSET_MINUTES: &str = "HOTMART_UTC_OFFSET_MINUTES";

/// Hotmart deployment targeted by the clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live API.
    #[default]
    Production,
    /// Sandbox API for testing.
    Sandbox,
}

impl Environment {
    /// Base URL of the developer API for this environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Production => "https://developers.hotmart.com",
            Self::Sandbox => "https://sandbox.hotmart.com",
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(Error::ConfigError(format!(
                "Unknown environment `{other}` (expected production or sandbox)"
            ))),
        }
    }
}

/// Configuration for a Hotmart client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HotmartClientConfig {
    /// Target environment
    #[serde(default)]
    pub environment: Environment,

    /// Explicit API base URL, overriding the environment default
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// OAuth2 token endpoint
    #[validate(url)]
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of retry attempts
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Offset east of UTC, in minutes, used to anchor date filters at midnight
    #[validate(range(min = -720, max = 840))]
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

impl HotmartClientConfig {
    /// Create a validated configuration for the given environment.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn new(environment: Environment) -> Result<Self, Error> {
        let config = Self {
            environment,
            ..Self::default()
        };
        config.validated()
    }

    /// Build a configuration from `HOTMART_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if a variable is malformed or the result fails validation.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if a value is malformed or the result fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ENVIRONMENT) {
            config.environment = value.parse()?;
        }
        if let Some(value) = lookup(ENV_BASE_URL) {
            config.base_url = Some(value);
        }
        if let Some(value) = lookup(ENV_TOKEN_URL) {
            config.token_url = value;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_var(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_RETRIES) {
            config.max_retries = parse_var(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = lookup(ENV_UTC_OFFSET_MINUTES) {
            config.utc_offset_minutes = parse_var(ENV_UTC_OFFSET_MINUTES, &value)?;
        }

        config.validated()
    }

    /// Run field validation, e.g. after applying `with_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing every invalid field.
    pub fn validated(self) -> Result<Self, Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        Ok(self)
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the UTC offset for date filters.
    #[must_use]
    pub const fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the effective API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn api_base_url(&self) -> Result<Url, Error> {
        let raw = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url());
        Url::parse(raw).map_err(|e| Error::ConfigError(format!("Invalid base URL `{raw}`: {e}")))
    }

    /// Parse the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_token_url(&self) -> Result<Url, Error> {
        Url::parse(&self.token_url)
            .map_err(|e| Error::ConfigError(format!("Invalid token URL: {e}")))
    }

    /// Date normalizer for the configured UTC offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is out of range.
    pub fn date_normalizer(&self) -> Result<DateNormalizer, Error> {
        DateNormalizer::with_offset_minutes(self.utc_offset_minutes)
    }

    /// HTTP settings derived from this configuration.
    #[must_use]
    pub fn http_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.timeout())
            .with_retry_policy(RetryPolicy::new().with_max_retries(self.max_retries))
            .with_tls_verify(self.tls_verify)
    }
}

impl Default for HotmartClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            token_url: default_token_url(),
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            utc_offset_minutes: 0,
        }
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::ConfigError(format!("Invalid value for {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = HotmartClientConfig::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert!(config.tls_verify);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn test_environment_base_urls() {
        assert_eq!(
            Environment::Production.base_url(),
            "https://developers.hotmart.com"
        );
        assert_eq!(Environment::Sandbox.base_url(), "https://sandbox.hotmart.com");
        assert_eq!("SANDBOX".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_api_base_url_prefers_override() {
        let config = HotmartClientConfig::new(Environment::Sandbox).unwrap();
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "https://sandbox.hotmart.com/"
        );

        let config = config.with_base_url("http://localhost:9000");
        assert_eq!(config.api_base_url().unwrap().port(), Some(9000));
    }

    #[test]
    fn test_config_builder() {
        let config = HotmartClientConfig::default()
            .with_tls_verify(false)
            .with_timeout(60)
            .with_max_retries(5)
            .with_utc_offset_minutes(-180);

        assert!(!config.tls_verify);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.http_config().retry_policy.max_retries, 5);
        assert_eq!(config.date_normalizer().unwrap().offset().local_minus_utc(), -180 * 60);
    }

    #[test]
    fn test_from_lookup() {
        let config = HotmartClientConfig::from_lookup(lookup(&[
            (ENV_ENVIRONMENT, "sandbox"),
            (ENV_TIMEOUT_SECS, "45"),
            (ENV_MAX_RETRIES, "0"),
            (ENV_UTC_OFFSET_MINUTES, "-180"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.request_timeout_secs, 45);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.utc_offset_minutes, -180);
    }

    #[test]
    fn test_from_lookup_rejects_malformed_values() {
        let err = HotmartClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        let err = HotmartClientConfig::from_lookup(lookup(&[(ENV_BASE_URL, "not-a-url")]))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_config_validation_ranges() {
        let mut config = HotmartClientConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        config.max_retries = 11;
        assert!(config.validate().is_err());

        config.max_retries = 3;
        config.utc_offset_minutes = 900;
        assert!(config.validate().is_err());

        config.utc_offset_minutes = -720;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = HotmartClientConfig::new(Environment::Sandbox)
            .unwrap()
            .with_utc_offset_minutes(60);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"sandbox\""));
        assert!(!json.contains("base_url"));

        let deserialized: HotmartClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.environment, Environment::Sandbox);
        assert_eq!(deserialized.utc_offset_minutes, 60);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: HotmartClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.max_retries, 3);
    }
}
