use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use user_aggregator::user_quality_filter::{self, QualityFilterConfig, DEFAULT_CUTOFF};

#[derive(Parser, Debug)]
#[command(
    name = "filter-users",
    version = "0.1.0",
    about = "Deduplicate and filter the raw user store into the served dataset"
)]
struct Args {
    /// Path to the raw store file
    #[arg(short, long, default_value = "data/users.json")]
    input: PathBuf,

    /// Path to the filtered store file
    #[arg(short, long, default_value = "data/filtered_users.json")]
    output: PathBuf,

    /// Accounts created on or before this date are dropped (RFC 3339)
    #[arg(long, default_value = DEFAULT_CUTOFF)]
    cutoff: String,
}

fn setup_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(env_filter).init();
}

fn main() -> Result<()> {
    setup_tracing();
    let args = Args::parse();

    let cutoff: DateTime<Utc> = DateTime::parse_from_rfc3339(&args.cutoff)
        .with_context(|| format!("--cutoff {:?} is not a valid RFC 3339 timestamp", args.cutoff))?
        .with_timezone(&Utc);

    let summary = user_quality_filter::run(
        &args.input,
        &args.output,
        &QualityFilterConfig { cutoff },
    )?;

    println!("Users loaded       : {}", summary.loaded);
    println!("Duplicates removed : {}", summary.duplicates_removed);
    println!("Users kept         : {}", summary.kept);
    println!("Wrote {}", args.output.display());

    Ok(())
}
