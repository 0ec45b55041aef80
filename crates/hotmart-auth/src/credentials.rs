//! Client credentials loaded from the environment.

use crate::Result;
use hotmart_core::Error;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Environment variable holding the OAuth2 client id.
pub const ENV_CLIENT_ID: &str = "HOTMART_CLIENT_ID";
/// Environment variable holding the OAuth2 client secret.
pub const ENV_CLIENT_SECRET: &str = "HOTMART_CLIENT_SECRET";

/// OAuth2 client id/secret pair.
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
}

impl Credentials {
    /// Create credentials from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if either value is empty.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() {
            return Err(Error::ConfigError("client id must not be empty".to_string()));
        }
        if client_secret.trim().is_empty() {
            return Err(Error::ConfigError(
                "client secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client_id,
            client_secret: SecretString::from(client_secret),
        })
    }

    /// Read `HOTMART_CLIENT_ID` and `HOTMART_CLIENT_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] naming the missing variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] naming the missing variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(ENV_CLIENT_ID)
            .ok_or_else(|| Error::ConfigError(format!("{ENV_CLIENT_ID} is not set")))?;
        let client_secret = lookup(ENV_CLIENT_SECRET)
            .ok_or_else(|| Error::ConfigError(format!("{ENV_CLIENT_SECRET} is not set")))?;
        Self::new(client_id, client_secret)
    }

    /// The client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_lookup_reads_both_values() {
        let creds = Credentials::from_lookup(|key| match key {
            ENV_CLIENT_ID => Some("id-1".to_string()),
            ENV_CLIENT_SECRET => Some("secret-1".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(creds.client_id(), "id-1");
        assert_eq!(creds.client_secret(), "secret-1");
    }

    #[test]
    fn from_lookup_names_missing_variable() {
        let err = Credentials::from_lookup(|key| {
            (key == ENV_CLIENT_ID).then(|| "id-1".to_string())
        })
        .unwrap_err();

        assert_eq!(
            err,
            Error::ConfigError("HOTMART_CLIENT_SECRET is not set".to_string())
        );
    }

    #[test]
    fn rejects_blank_values() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("id", " ").is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("id-1", "hunter2").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("id-1"));
        assert!(!debug.contains("hunter2"));
    }
}
