//! Bearer token abstraction.
//!
//! API clients never build tokens themselves: they ask a [`TokenProvider`]
//! for one before each request and tell it to forget the token when the API
//! rejects it.

use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};

/// Source of bearer tokens for authenticated requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a bearer token valid for the next request.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be obtained.
    async fn access_token(&self) -> Result<SecretString>;

    /// Drop any cached token so the next call obtains a fresh one.
    fn invalidate(&self);

    /// Whether [`TokenProvider::invalidate`] can lead to a different token.
    fn can_refresh(&self) -> bool {
        true
    }
}

/// Token supplied up front by the caller, e.g. from `HOTMART_ACCESS_TOKEN`.
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    /// Wrap an existing bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::ConfigError("access token must not be empty".to_string()));
        }
        Ok(Self {
            token: SecretString::from(token),
        })
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<SecretString> {
        Ok(SecretString::from(self.token.expose_secret().to_owned()))
    }

    fn invalidate(&self) {}

    fn can_refresh(&self) -> bool {
        false
    }
}

/// Format the `Authorization` header value for a token.
#[must_use]
pub fn bearer_header(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_returns_same_value() {
        let provider = StaticToken::new("abc123").unwrap();
        provider.invalidate();
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "abc123");
        assert!(!provider.can_refresh());
    }

    #[test]
    fn static_token_rejects_empty() {
        assert!(matches!(
            StaticToken::new("  "),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn static_token_debug_hides_secret() {
        let provider = StaticToken::new("super-secret").unwrap();
        assert!(!format!("{provider:?}").contains("super-secret"));
    }

    #[test]
    fn bearer_header_format() {
        let token = SecretString::from("tok".to_string());
        assert_eq!(bearer_header(&token), "Bearer tok");
    }

    #[tokio::test]
    async fn token_provider_mock() {
        let mut mock = MockTokenProvider::new();
        mock.expect_access_token()
            .times(1)
            .returning(|| Ok(SecretString::from("mocked".to_string())));
        mock.expect_invalidate().times(1).return_const(());

        let token = mock.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "mocked");
        mock.invalidate();
    }
}
