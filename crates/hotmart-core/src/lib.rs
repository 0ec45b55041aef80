//! # hotmart-core
//!
//! Core types and utilities for working with the Hotmart payments API.
//!
//! This crate provides the shared error type, HTTP client settings, configuration,
//! query parameter assembly and date handling used by the client crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and retry classification
//! - [`client`] - HTTP client settings, retry policy and status mapping
//! - [`config`] - Client configuration and environment selection
//! - [`query`] - Query parameter builder
//! - [`date`] - `YYYY-MM-DD` to epoch-millisecond conversion
//! - [`auth`] - Bearer token provider abstraction

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod query;

// Re-export commonly used types
pub use auth::{StaticToken, TokenProvider};
pub use config::{Environment, HotmartClientConfig};
pub use date::DateNormalizer;
pub use error::{Error, Result};
pub use query::QueryParams;
