//! OAuth2 client-credentials authentication for the Hotmart API.
//!
//! Exchanges a client id/secret pair for a bearer token and caches it until
//! shortly before it expires. [`HotmartAuthClient`] implements
//! [`hotmart_core::TokenProvider`] so it can be handed straight to the API clients.

#![deny(missing_docs)]

pub mod client;
pub mod credentials;
pub mod models;

pub use client::{HotmartAuthClient, HotmartAuthClientBuilder};
pub use credentials::Credentials;
pub use models::TokenResponse;

/// Convenient result alias that reuses the shared Hotmart error type.
pub type Result<T> = hotmart_core::Result<T>;
