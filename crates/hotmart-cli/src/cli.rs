//! Command line definitions.

use clap::{ArgAction, Args, Parser, Subcommand};
use hotmart_core::Environment;
use hotmart_payments::SubscriptionFilter;

/// Query the Hotmart subscriptions API.
#[derive(Debug, Parser)]
#[command(name = "hotmart", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Target environment; overrides HOTMART_ENVIRONMENT.
    #[arg(long, global = true)]
    pub environment: Option<Environment>,

    /// API base URL; overrides the environment default and HOTMART_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Obtain an access token with the client credentials.
    Token,
    /// List subscriptions.
    Subscriptions(SubscriptionsArgs),
    /// Send the cancelled-and-active subscriptions request with a ready token
    /// and dump the raw response.
    Replay(ReplayArgs),
}

#[derive(Debug, Args)]
pub struct SubscriptionsArgs {
    /// Subscription status; repeat or comma-separate for several.
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,

    #[arg(long)]
    pub product_id: Option<String>,

    /// Plan name.
    #[arg(long)]
    pub plan: Option<String>,

    #[arg(long)]
    pub plan_id: Option<String>,

    #[arg(long)]
    pub subscriber_email: Option<String>,

    #[arg(long)]
    pub subscriber_code: Option<String>,

    /// Transaction code.
    #[arg(long)]
    pub transaction: Option<String>,

    /// Only trial (true) or non-trial (false) subscriptions.
    #[arg(long, value_name = "true|false")]
    pub trial: Option<bool>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub accession_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub end_accession_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub cancelation_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub end_cancelation_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub date_next_charge: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub end_date_next_charge: Option<String>,

    /// Page size (ignored with --all, which uses the API maximum).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=500))]
    pub max_results: Option<u32>,

    /// Cursor from a previous page.
    #[arg(long)]
    pub page_token: Option<String>,

    /// Follow page tokens and fetch every matching subscription.
    #[arg(long)]
    pub all: bool,

    /// Print JSON instead of the human-readable listing.
    #[arg(long)]
    pub json: bool,
}

impl SubscriptionsArgs {
    pub fn to_filter(&self) -> SubscriptionFilter {
        SubscriptionFilter {
            status: self.status.clone(),
            product_id: self.product_id.clone(),
            plan: self.plan.clone(),
            plan_id: self.plan_id.clone(),
            subscriber_email: self.subscriber_email.clone(),
            subscriber_code: self.subscriber_code.clone(),
            transaction: self.transaction.clone(),
            trial: self.trial,
            accession_date: self.accession_date.clone(),
            end_accession_date: self.end_accession_date.clone(),
            cancelation_date: self.cancelation_date.clone(),
            end_cancelation_date: self.end_cancelation_date.clone(),
            date_next_charge: self.date_next_charge.clone(),
            end_date_next_charge: self.end_date_next_charge.clone(),
            max_results: self.max_results,
            page_token: self.page_token.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Bearer token to send.
    #[arg(long, env = "HOTMART_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}
