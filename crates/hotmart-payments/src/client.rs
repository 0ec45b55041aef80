//! Asynchronous payments API client.

use crate::models::{Subscription, SubscriptionFilter, SubscriptionPage, MAX_RESULTS_LIMIT};
use crate::Result;
use hotmart_core::auth::bearer_header;
use hotmart_core::client::{
    map_status_to_error, ClientConfig, RetryPolicy, DEFAULT_POOL_IDLE_TIMEOUT,
    DEFAULT_POOL_MAX_IDLE_PER_HOST, PAYMENTS_DEFAULT_TIMEOUT,
};
use hotmart_core::config::HotmartClientConfig;
use hotmart_core::{DateNormalizer, Error, QueryParams, TokenProvider};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("hotmart-payments/", env!("CARGO_PKG_VERSION"));

/// Path of the subscriptions listing, relative to the API base URL.
pub const SUBSCRIPTIONS_PATH: &str = "payments/api/v1/subscriptions";

/// Pause between consecutive page requests in [`PaymentsClient::list_all_subscriptions`].
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Builder for [`PaymentsClient`].
pub struct PaymentsClientBuilder {
    base_url: Url,
    http_config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
    dates: DateNormalizer,
    page_delay: Duration,
}

impl PaymentsClientBuilder {
    /// Create a new builder with the provided API base URL.
    ///
    /// The URL should include the protocol and hostname (e.g. `https://developers.hotmart.com`).
    pub fn new(base_url: impl AsRef<str>, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref()).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid payments base URL `{}`: {err}",
                base_url.as_ref()
            ))
        })?;

        let http_config = ClientConfig::new()
            .with_timeout(Duration::from_secs(PAYMENTS_DEFAULT_TIMEOUT))
            .with_pool_idle_timeout(Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT))
            .with_pool_max_idle(DEFAULT_POOL_MAX_IDLE_PER_HOST);

        Ok(Self {
            base_url: with_trailing_slash(url),
            http_config,
            tokens,
            dates: DateNormalizer::utc(),
            page_delay: DEFAULT_PAGE_DELAY,
        })
    }

    /// Create a builder from a [`HotmartClientConfig`].
    ///
    /// Uses the environment's base URL unless the configuration overrides it.
    pub fn from_config(config: &HotmartClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Ok(Self {
            base_url: with_trailing_slash(config.api_base_url()?),
            http_config: config.http_config(),
            tokens,
            dates: config.date_normalizer()?,
            page_delay: DEFAULT_PAGE_DELAY,
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

    /// Set how filter dates are anchored to an instant.
    #[must_use]
    pub fn with_date_normalizer(mut self, dates: DateNormalizer) -> Self {
        self.dates = dates;
        self
    }

    /// Set the pause between page requests.
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Build the payments client.
    pub fn build(self) -> Result<PaymentsClient> {
        let http = self.http_config.build_http_client(USER_AGENT)?;

        Ok(PaymentsClient {
            http,
            base_url: self.base_url,
            retry_policy: self.http_config.retry_policy,
            tokens: self.tokens,
            dates: self.dates,
            page_delay: self.page_delay,
        })
    }
}

impl fmt::Debug for PaymentsClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentsClientBuilder")
            .field("base_url", &self.base_url.as_str())
            .field("http_config", &self.http_config)
            .field("dates", &self.dates)
            .field("page_delay", &self.page_delay)
            .finish_non_exhaustive()
    }
}

/// Unprocessed HTTP response returned by [`PaymentsClient::raw_get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Headers as a JSON object. Repeated headers are joined with `, `.
    #[must_use]
    pub fn headers_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.headers {
            match map.get_mut(name) {
                Some(serde_json::Value::String(existing)) => {
                    existing.push_str(", ");
                    existing.push_str(value);
                }
                _ => {
                    map.insert(name.clone(), serde_json::Value::String(value.clone()));
                }
            }
        }
        serde_json::Value::Object(map)
    }

    /// Body parsed as JSON, if it is JSON.
    #[must_use]
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Asynchronous Hotmart payments client.
#[derive(Clone)]
pub struct PaymentsClient {
    http: Client,
    base_url: Url,
    retry_policy: RetryPolicy,
    tokens: Arc<dyn TokenProvider>,
    dates: DateNormalizer,
    page_delay: Duration,
}

impl PaymentsClient {
    /// Create a client for the given base URL with default settings.
    pub fn new(base_url: impl AsRef<str>, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        PaymentsClientBuilder::new(base_url, tokens)?.build()
    }

    /// Access the underlying base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Date normalizer applied to filter dates.
    #[must_use]
    pub fn date_normalizer(&self) -> &DateNormalizer {
        &self.dates
    }

    /// Fetch a single page of subscriptions.
    pub async fn list_subscriptions(&self, filter: &SubscriptionFilter) -> Result<SubscriptionPage> {
        let query = filter.to_query(&self.dates);
        self.get_json(SUBSCRIPTIONS_PATH, &query).await
    }

    /// Fetch every subscription matching the filter.
    ///
    /// Requests pages of [`MAX_RESULTS_LIMIT`] and follows `next_page_token`
    /// until the API stops returning one. Starts at `filter.page_token` when set.
    pub async fn list_all_subscriptions(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>> {
        let mut query = filter.to_query(&self.dates);
        query.set("max_results", MAX_RESULTS_LIMIT);

        let mut requested: HashSet<String> = filter.page_token.iter().cloned().collect();
        let mut items = Vec::new();
        let mut pages = 1_u32;

        loop {
            let page: SubscriptionPage = self.get_json(SUBSCRIPTIONS_PATH, &query).await?;
            let fetched = page.items.len();
            items.extend(page.items);
            debug!(page = pages, fetched, total = items.len(), "Fetched subscriptions page");

            let Some(next) = page.page_info.next_page_token.filter(|token| !token.is_empty())
            else {
                break;
            };
            if !requested.insert(next.clone()) {
                warn!(
                    page_token = %next,
                    "API returned an already requested page token, stopping pagination"
                );
                break;
            }
            query.set("page_token", next);
            pages += 1;

            if !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }
        }

        info!(pages, total = items.len(), "Fetched all subscriptions");
        Ok(items)
    }

    /// Send one authenticated GET and return the response untouched.
    ///
    /// No retries and no status mapping: a 4xx or 5xx is returned as a
    /// [`RawResponse`]. Only transport and token failures are errors.
    pub async fn raw_get(&self, path: &str, params: &QueryParams) -> Result<RawResponse> {
        let url = self.build_url(path)?;
        let token = self.tokens.access_token().await?;

        info!(path, "payments raw request");

        let response = self
            .http
            .get(url)
            .query(params.as_pairs())
            .header(AUTHORIZATION, bearer_header(&token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().map_or_else(
                    |_| String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    str::to_owned,
                );
                (name.as_str().to_owned(), value)
            })
            .collect();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.strip_prefix('/').unwrap_or(path);

        self.base_url.join(normalized).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid payments path `{path}`: {err}"))
        })
    }

    async fn get_json<T>(&self, path: &str, params: &QueryParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(path)?;
        #[allow(unused_assignments)]
        let mut last_error: Option<Error> = None;
        let mut attempt = 0;
        let mut reauthenticated = false;

        loop {
            let token = self.tokens.access_token().await?;
            let request = self
                .http
                .get(url.clone())
                .query(params.as_pairs())
                .header(AUTHORIZATION, bearer_header(&token))
                .header(ACCEPT, "application/json");

            info!(path, attempt, "payments request");

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().await.map_err(|err| {
                            Error::ParseError(format!(
                                "Failed to parse payments response for `{path}`: {err}"
                            ))
                        });
                    }

                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());

                    if status == StatusCode::UNAUTHORIZED
                        && !reauthenticated
                        && self.tokens.can_refresh()
                    {
                        debug!(path, "Access token rejected, requesting a new one");
                        self.tokens.invalidate();
                        reauthenticated = true;
                        continue;
                    }

                    let error = map_status_to_error("payments", status, &text);
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
                debug!("Retrying payments request after {:?}", delay);
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::ServiceUnavailable("payments request failed after retries".to_string())
        }))
    }
}

impl fmt::Debug for PaymentsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentsClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry_policy", &self.retry_policy)
            .field("dates", &self.dates)
            .finish_non_exhaustive()
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
