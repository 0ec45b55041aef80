//! Command handlers.

use crate::cli::{Cli, Command, ReplayArgs, SubscriptionsArgs};
use crate::output;
use anyhow::{Context, Result};
use hotmart_auth::{Credentials, HotmartAuthClient, HotmartAuthClientBuilder};
use hotmart_core::{HotmartClientConfig, QueryParams, StaticToken, TokenProvider};
use hotmart_payments::{PaymentsClient, PaymentsClientBuilder, SUBSCRIPTIONS_PATH};
use std::sync::Arc;
use tracing::debug;

/// Statuses requested by `replay`.
const REPLAY_STATUSES: [&str; 2] = ["CANCELLED_BY_SELLER", "ACTIVE"];

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    debug!(environment = %config.environment, "Loaded configuration");

    match cli.command {
        Command::Token => token(&config).await,
        Command::Subscriptions(args) => subscriptions(&config, &args).await,
        Command::Replay(args) => replay(&config, args).await,
    }
}

/// Single-line failure report, tagged with the API error code when there is one.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<hotmart_core::Error>() {
        Some(api_error) => format!("Error [{}]: {err:#}", api_error.error_code()),
        None => format!("Error: {err:#}"),
    }
}

fn load_config(cli: &Cli) -> Result<HotmartClientConfig> {
    let mut config = HotmartClientConfig::from_env().context("Invalid HOTMART_* configuration")?;
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    config.validated().context("Invalid configuration")
}

fn auth_client(config: &HotmartClientConfig) -> Result<HotmartAuthClient> {
    let credentials = Credentials::from_env()
        .context("Set HOTMART_CLIENT_ID and HOTMART_CLIENT_SECRET")?;
    Ok(HotmartAuthClientBuilder::from_config(config, credentials)?.build()?)
}

fn payments_client(
    config: &HotmartClientConfig,
    tokens: Arc<dyn TokenProvider>,
) -> Result<PaymentsClient> {
    Ok(PaymentsClientBuilder::from_config(config, tokens)?.build()?)
}

async fn token(config: &HotmartClientConfig) -> Result<()> {
    let auth = auth_client(config)?;
    let response = auth
        .request_token()
        .await
        .context("Failed to obtain access token")?;
    print!("{}", output::token(&response));
    Ok(())
}

async fn subscriptions(config: &HotmartClientConfig, args: &SubscriptionsArgs) -> Result<()> {
    let tokens: Arc<dyn TokenProvider> = Arc::new(auth_client(config)?);
    let client = payments_client(config, tokens)?;
    let filter = args.to_filter();
    let dates = client.date_normalizer();

    if args.all {
        let items = client
            .list_all_subscriptions(&filter)
            .await
            .context("Failed to list subscriptions")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else {
            print!("{}", output::subscription_list(&items, dates));
            println!("\nTotal fetched: {}", items.len());
        }
    } else {
        let page = client
            .list_subscriptions(&filter)
            .await
            .context("Failed to list subscriptions")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&page)?);
        } else {
            print!("{}", output::page(&page, dates));
        }
    }

    Ok(())
}

async fn replay(config: &HotmartClientConfig, args: ReplayArgs) -> Result<()> {
    let token = args
        .token
        .context("Pass --token or set HOTMART_ACCESS_TOKEN")?;
    let client = payments_client(config, Arc::new(StaticToken::new(token)?))?;

    let mut params = QueryParams::new();
    params.push_many("status", REPLAY_STATUSES);

    let raw = client
        .raw_get(SUBSCRIPTIONS_PATH, &params)
        .await
        .context("Replay request failed")?;
    print!("{}", output::raw_response(&raw)?);
    Ok(())
}
