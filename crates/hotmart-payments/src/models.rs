//! Subscription models and the subscription query filter.

use hotmart_core::date::DateNormalizer;
use hotmart_core::query::QueryParams;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Page size used when the caller does not choose one.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Largest page size the API accepts.
pub const MAX_RESULTS_LIMIT: u32 = 500;

/// Filters for listing subscriptions.
///
/// Every field is optional; absent fields never reach the query string.
/// Dates are `YYYY-MM-DD` strings and are sent as epoch milliseconds.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    /// Subscription statuses, sent as repeated `status` keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,
    /// Product id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Plan name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Plan id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// Subscriber e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_email: Option<String>,
    /// Subscriber code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_code: Option<String>,
    /// Transaction code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    /// Trial flag. `Some(false)` is sent, `None` is not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial: Option<bool>,
    /// Accession window start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession_date: Option<String>,
    /// Accession window end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_accession_date: Option<String>,
    /// Cancellation window start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelation_date: Option<String>,
    /// Cancellation window end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_cancelation_date: Option<String>,
    /// Next-charge window start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_next_charge: Option<String>,
    /// Next-charge window end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_next_charge: Option<String>,
    /// Page size; [`DEFAULT_MAX_RESULTS`] when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Cursor returned by a previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl SubscriptionFilter {
    /// Convert the filter into URL query parameters.
    ///
    /// Dates that fail to parse are logged and left out; the remaining
    /// filters are still applied.
    #[must_use]
    pub fn to_query(&self, dates: &DateNormalizer) -> QueryParams {
        let mut params = QueryParams::new();

        params.push_many("status", &self.status);

        params.push_opt("product_id", self.product_id.as_deref());
        params.push_opt("plan", self.plan.as_deref());
        params.push_opt("plan_id", self.plan_id.as_deref());
        params.push_opt("subscriber_email", self.subscriber_email.as_deref());
        params.push_opt("subscriber_code", self.subscriber_code.as_deref());
        params.push_opt("transaction", self.transaction.as_deref());
        params.push_opt("trial", self.trial);

        let date_filters = [
            ("accession_date", self.accession_date.as_deref()),
            ("end_accession_date", self.end_accession_date.as_deref()),
            ("cancelation_date", self.cancelation_date.as_deref()),
            ("end_cancelation_date", self.end_cancelation_date.as_deref()),
            ("date_next_charge", self.date_next_charge.as_deref()),
            ("end_date_next_charge", self.end_date_next_charge.as_deref()),
        ];
        for (key, value) in date_filters {
            params.push_opt_with(key, value, |raw| match dates.to_millis(raw) {
                Ok(millis) => Some(millis),
                Err(err) => {
                    warn!(filter = key, %err, "Skipping date filter");
                    None
                }
            });
        }

        params.push("max_results", self.max_results.unwrap_or(DEFAULT_MAX_RESULTS));
        params.push_opt("page_token", self.page_token.as_deref());

        params
    }

    /// Convert the filter into query pairs with dates anchored at UTC midnight.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        self.to_query(&DateNormalizer::utc()).into_pairs()
    }
}

/// Subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionPlan {
    /// Plan name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Plan id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Recurrence period in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrency_period: Option<u32>,
    /// Maximum charge cycles (0 = unlimited).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_charge_cycles: Option<u32>,
}

/// Product a subscription belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Product id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Product ucode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucode: Option<String>,
}

/// Subscription price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Price {
    /// Amount.
    #[serde(default)]
    pub value: f64,
    /// ISO currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

/// Subscriber details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscriber {
    /// Full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// E-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Hotmart user code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucode: Option<String>,
}

/// Subscription record as returned by the subscriptions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    /// Subscriber code; empty when the API omits it.
    #[serde(default)]
    pub subscriber_code: String,
    /// Subscription id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<i64>,
    /// Current status (e.g. `ACTIVE`, `CANCELLED_BY_SELLER`); empty when omitted.
    #[serde(default)]
    pub status: String,
    /// Accession timestamp (epoch ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession_date: Option<i64>,
    /// End of accession timestamp (epoch ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_accession_date: Option<i64>,
    /// Request timestamp (epoch ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_date: Option<i64>,
    /// Next charge timestamp (epoch ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_next_charge: Option<i64>,
    /// Whether the subscription is in a trial period.
    #[serde(default)]
    pub trial: bool,
    /// Originating transaction code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    /// Plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<SubscriptionPlan>,
    /// Product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    /// Price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Subscriber.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Subscriber>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    /// Total results matching the filter.
    #[serde(default)]
    pub total_results: u64,
    /// Page size used for this response.
    #[serde(default)]
    pub results_per_page: u64,
    /// Cursor for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    /// Cursor for the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page_token: Option<String>,
}

/// One page of subscriptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionPage {
    /// Subscriptions on this page.
    #[serde(default)]
    pub items: Vec<Subscription>,
    /// Pagination metadata.
    #[serde(default)]
    pub page_info: PageInfo,
}
