//! Hotmart payments API client.
//!
//! Lists subscriptions with the full set of filters supported by
//! `payments/api/v1/subscriptions`, either one page at a time or by following
//! page tokens until the result set is exhausted.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{PaymentsClient, PaymentsClientBuilder, RawResponse, SUBSCRIPTIONS_PATH};
pub use models::{
    PageInfo, Price, Product, Subscriber, Subscription, SubscriptionFilter, SubscriptionPage,
    SubscriptionPlan, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT,
};
pub use reqwest::StatusCode;

/// Convenient result alias that reuses the shared Hotmart error type.
pub type Result<T> = hotmart_core::Result<T>;
