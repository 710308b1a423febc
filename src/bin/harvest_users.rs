use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use user_aggregator::rate_limit::RateLimitConfig;
use user_aggregator::resilient_client::{ResilientClient, RetryPolicy};
use user_aggregator::store;
use user_aggregator::user_harvester::{HarvestConfig, UserHarvester};

#[derive(Parser, Debug)]
#[command(
    name = "harvest-users",
    version = "0.1.0",
    about = "Harvest user profiles from the upstream API into the raw store"
)]
struct Args {
    /// Number of user records to collect
    #[arg(long, default_value = "30")]
    max_users: usize,

    /// Path to the raw store file
    #[arg(short, long, default_value = "data/users.json")]
    output: PathBuf,

    /// Base URL of the upstream API
    #[arg(long, default_value = "https://api.github.com")]
    api_base: String,

    /// Initial pagination cursor
    #[arg(long, default_value = "0")]
    since: u64,

    /// Upper bound on listing pages per run
    #[arg(long, default_value = "100")]
    max_pages: usize,
}

fn setup_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,harvest_users=debug"));

    fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();
    let args = Args::parse();

    let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    if token.is_none() {
        info!("GITHUB_TOKEN not set, harvesting unauthenticated (lower quota)");
    }

    let client = ResilientClient::new(
        token.as_deref(),
        RetryPolicy::default(),
        RateLimitConfig::default(),
    )?;
    let harvester = UserHarvester::new(
        client,
        HarvestConfig {
            api_base: args.api_base,
            start_cursor: args.since,
            max_pages: args.max_pages,
        },
    );

    info!("Harvesting {} users...", args.max_users);
    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    progress.set_message(format!("Collecting up to {} users", args.max_users));
    progress.enable_steady_tick(Duration::from_millis(120));

    let records = harvester.collect(args.max_users).await;
    progress.finish_with_message(format!("Collected {} users", records.len()));

    store::save_json(&records, &args.output)?;
    println!(
        "Saved {} user records to {}",
        records.len(),
        args.output.display()
    );

    Ok(())
}
