//! Asynchronous OAuth2 token client.

use crate::credentials::Credentials;
use crate::models::TokenResponse;
use crate::Result;
use async_trait::async_trait;
use hotmart_core::client::{map_status_to_error, ClientConfig, RetryPolicy, AUTH_DEFAULT_TIMEOUT};
use hotmart_core::config::HotmartClientConfig;
use hotmart_core::{Error, TokenProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("hotmart-auth/", env!("CARGO_PKG_VERSION"));

/// Tokens are refreshed this long before the upstream expiry.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Builder for [`HotmartAuthClient`].
#[derive(Debug)]
pub struct HotmartAuthClientBuilder {
    token_url: Url,
    credentials: Credentials,
    http_config: ClientConfig,
    refresh_margin: Duration,
}

impl HotmartAuthClientBuilder {
    /// Create a builder for the given token endpoint.
    pub fn new(token_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        let url = Url::parse(token_url.as_ref()).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid token URL `{}`: {err}",
                token_url.as_ref()
            ))
        })?;

        Ok(Self {
            token_url: url,
            credentials,
            http_config: ClientConfig::new().with_timeout(Duration::from_secs(AUTH_DEFAULT_TIMEOUT)),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
        })
    }

    /// Create a builder from a [`HotmartClientConfig`].
    pub fn from_config(config: &HotmartClientConfig, credentials: Credentials) -> Result<Self> {
        let token_url = config.parse_token_url()?;
        Ok(Self {
            token_url,
            credentials,
            http_config: config.http_config(),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
        })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.http_config.retry_policy = retry_policy;
        self
    }

    /// Set how long before expiry a cached token is considered stale.
    #[must_use]
    pub const fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HotmartAuthClient> {
        let http = self.http_config.build_http_client(USER_AGENT)?;

        Ok(HotmartAuthClient {
            http,
            token_url: self.token_url,
            credentials: self.credentials,
            retry_policy: self.http_config.retry_policy,
            refresh_margin: self.refresh_margin,
            cache: RwLock::new(None),
        })
    }
}

struct CachedToken {
    token: SecretString,
    expires_at: Instant,
}

/// OAuth2 client-credentials client with an in-memory token cache.
pub struct HotmartAuthClient {
    http: Client,
    token_url: Url,
    credentials: Credentials,
    retry_policy: RetryPolicy,
    refresh_margin: Duration,
    cache: RwLock<Option<CachedToken>>,
}

impl HotmartAuthClient {
    /// Create a client for the given token endpoint with default settings.
    pub fn new(token_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        HotmartAuthClientBuilder::new(token_url, credentials)?.build()
    }

    /// The token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Perform the client-credentials exchange, bypassing the cache.
    ///
    /// The fresh token is stored in the cache on success.
    pub async fn request_token(&self) -> Result<TokenResponse> {
        let response = self.send_token_request().await?;
        self.store(&response);
        Ok(response)
    }

    fn cached(&self) -> Option<SecretString> {
        let cache = self.cache.read().ok()?;
        let token = cache
            .as_ref()
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| SecretString::from(entry.token.expose_secret().to_owned()));
        token
    }

    fn store(&self, response: &TokenResponse) {
        let ttl = response.lifetime().saturating_sub(self.refresh_margin);
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(CachedToken {
                token: SecretString::from(response.access_token.clone()),
                expires_at: Instant::now() + ttl,
            });
        }
    }

    async fn send_token_request(&self) -> Result<TokenResponse> {
        #[allow(unused_assignments)]
        let mut last_error: Option<Error> = None;
        let mut attempt = 0;

        loop {
            let request = self
                .http
                .post(self.token_url.clone())
                .query(&[
                    ("grant_type", "client_credentials"),
                    ("client_id", self.credentials.client_id()),
                    ("client_secret", self.credentials.client_secret()),
                ])
                .basic_auth(
                    self.credentials.client_id(),
                    Some(self.credentials.client_secret()),
                )
                .header("Accept", "application/json");

            info!(attempt, token_url = %self.token_url, "OAuth token request");

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<TokenResponse>().await.map_err(|err| {
                            Error::ParseError(format!("Failed to parse token response: {err}"))
                        });
                    }

                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error = map_status_to_error("auth", status, &text);
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(err) => {
                    let error = Error::from(err);
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
            }

            attempt += 1;
            if attempt > self.retry_policy.max_retries {
                break;
            }
            let delay = self.retry_policy.delay_for_attempt(attempt);
            if delay > Duration::from_millis(0) {
                debug!("Retrying OAuth token request after {:?}", delay);
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::ServiceUnavailable("OAuth token request failed after retries".to_string())
        }))
    }
}

#[async_trait]
impl TokenProvider for HotmartAuthClient {
    async fn access_token(&self) -> Result<SecretString> {
        if let Some(token) = self.cached() {
            debug!("Using cached OAuth token");
            return Ok(token);
        }

        let response = self.request_token().await?;
        Ok(SecretString::from(response.access_token))
    }

    fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials::new("client-id", "client-secret").unwrap()
    }

    fn test_client(server: &MockServer) -> HotmartAuthClient {
        HotmartAuthClientBuilder::new(
            format!("{}/security/oauth/token", server.uri()),
            credentials(),
        )
        .unwrap()
        .with_retry_policy(RetryPolicy::no_retry())
        .build()
        .unwrap()
    }

    fn token_body(token: &str, expires_in: u64) -> serde_json::Value {
        json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": expires_in,
            "scope": "read write"
        })
    }

    #[tokio::test]
    async fn request_token_sends_client_credentials() {
        let server = MockServer::start().await;
        // base64("client-id:client-secret")
        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .and(query_param("grant_type", "client_credentials"))
            .and(query_param("client_id", "client-id"))
            .and(query_param("client_secret", "client-secret"))
            .and(header(
                "Authorization",
                "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client.request_token().await.unwrap();
        assert_eq!(response.access_token, "tok-1");
        assert_eq!(response.expires_in, 3600);
    }

    #[tokio::test]
    async fn access_token_is_cached_until_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let first = client.access_token().await.unwrap();
        let second = client.access_token().await.unwrap();
        assert_eq!(first.expose_secret(), "tok-1");
        assert_eq!(second.expose_secret(), "tok-1");
    }

    #[tokio::test]
    async fn short_lived_token_is_not_reused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 30)))
            .expect(2)
            .mount(&server)
            .await;

        // 30s lifetime is inside the 60s refresh margin
        let client = test_client(&server);
        client.access_token().await.unwrap();
        client.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn invalidate_forces_new_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3600)))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.access_token().await.unwrap();
        client.invalidate();
        client.access_token().await.unwrap();
        assert!(client.can_refresh());
    }

    #[tokio::test]
    async fn rejected_credentials_map_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.access_token().await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(_)));
        assert!(err.to_string().contains("invalid_client"));
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2", 3600)))
            .mount(&server)
            .await;

        let client = HotmartAuthClientBuilder::new(
            format!("{}/security/oauth/token", server.uri()),
            credentials(),
        )
        .unwrap()
        .with_retry_policy(
            RetryPolicy::new()
                .with_max_retries(1)
                .with_initial_delay(Duration::from_millis(1)),
        )
        .build()
        .unwrap();

        let token = client.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "tok-2");
    }

    #[test]
    fn builder_rejects_invalid_url() {
        let err = HotmartAuthClientBuilder::new("not a url", credentials()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn builder_from_config_uses_token_url() {
        let config = HotmartClientConfig::default().with_token_url("http://localhost:9999/token");
        let client = HotmartAuthClientBuilder::from_config(&config, credentials())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.token_url().as_str(), "http://localhost:9999/token");
    }
}
