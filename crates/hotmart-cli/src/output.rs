//! Human-readable and JSON rendering of command results.

use hotmart_auth::TokenResponse;
use hotmart_core::DateNormalizer;
use hotmart_payments::{PageInfo, RawResponse, Subscription, SubscriptionPage};
use std::fmt::Write as _;

const MISSING: &str = "N/A";

fn or_missing(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING)
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() {
        MISSING
    } else {
        value
    }
}

fn date(dates: &DateNormalizer, millis: Option<i64>) -> String {
    millis
        .and_then(|ms| dates.format_millis(ms))
        .unwrap_or_else(|| MISSING.to_string())
}

/// One numbered block per subscription.
pub fn subscription_block(
    index: usize,
    subscription: &Subscription,
    dates: &DateNormalizer,
) -> String {
    let subscriber = subscription.subscriber.as_ref();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{index}. {} ({})",
        non_empty(&subscription.subscriber_code),
        non_empty(&subscription.status)
    );
    let _ = writeln!(
        out,
        "   Subscriber:  {} <{}>",
        or_missing(subscriber.and_then(|s| s.name.as_deref())),
        or_missing(subscriber.and_then(|s| s.email.as_deref())),
    );
    let _ = writeln!(
        out,
        "   Product:     {}",
        or_missing(subscription.product.as_ref().and_then(|p| p.name.as_deref()))
    );
    let _ = writeln!(
        out,
        "   Plan:        {}",
        or_missing(subscription.plan.as_ref().and_then(|p| p.name.as_deref()))
    );
    let _ = writeln!(
        out,
        "   Accession:   {}",
        date(dates, subscription.accession_date)
    );
    let _ = writeln!(
        out,
        "   Next charge: {}",
        date(dates, subscription.date_next_charge)
    );
    if subscription.end_accession_date.is_some() {
        let _ = writeln!(
            out,
            "   Ended:       {}",
            date(dates, subscription.end_accession_date)
        );
    }
    let _ = writeln!(
        out,
        "   Trial:       {}",
        if subscription.trial { "yes" } else { "no" }
    );

    out
}

/// Footer with pagination details.
pub fn page_footer(info: &PageInfo) -> String {
    let mut out = format!(
        "Total results: {}\nResults per page: {}\n",
        info.total_results, info.results_per_page
    );
    if let Some(token) = &info.next_page_token {
        let _ = writeln!(out, "Next page token: {token}");
    }
    out
}

pub fn subscription_list(items: &[Subscription], dates: &DateNormalizer) -> String {
    if items.is_empty() {
        return "No subscriptions found.\n".to_string();
    }

    items
        .iter()
        .enumerate()
        .map(|(i, subscription)| subscription_block(i + 1, subscription, dates))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn page(page: &SubscriptionPage, dates: &DateNormalizer) -> String {
    format!(
        "{}\n{}",
        subscription_list(&page.items, dates),
        page_footer(&page.page_info)
    )
}

pub fn token(response: &TokenResponse) -> String {
    format!(
        "access_token: {}\ntoken_type: {}\nexpires_in: {}\n",
        response.access_token, response.token_type, response.expires_in
    )
}

/// Status line, headers as pretty JSON, then the body as pretty JSON when it parses.
pub fn raw_response(raw: &RawResponse) -> serde_json::Result<String> {
    let headers = serde_json::to_string_pretty(&raw.headers_json())?;
    let body = match raw.body_json() {
        Some(value) => serde_json::to_string_pretty(&value)?,
        None => raw.body.clone(),
    };

    Ok(format!(
        "Status: {}\n\nHeaders:\n{headers}\n\nBody:\n{body}\n",
        raw.status.as_u16()
    ))
}
