//! Souq CLI - Shipping quotes and coupon checks for the Souq storefront.
//!
//! Commands:
//! - `souq quote` - Quote shipping for a cart file and destination zone
//! - `souq coupon` - Check a coupon code against a cart file
//! - `souq zones` - List the shipping zone catalog
//! - `souq rates` - Show vendor shipping rates from the fixture

mod commands;
mod config;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{CouponArgs, QuoteArgs, RatesArgs, ZonesArgs};
use config::LogConfig;

/// Souq CLI - Quote shipping and check coupons
#[derive(Parser)]
#[command(name = "souq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote shipping for a cart
    Quote(QuoteArgs),

    /// Check a coupon code against a cart
    Coupon(CouponArgs),

    /// List shipping zones
    Zones(ZonesArgs),

    /// Show vendor shipping rates
    Rates(RatesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), output)?;
    init_tracing(&ctx.config.log, ctx.output.is_verbose());

    // Execute command
    let result = match cli.command {
        Commands::Quote(args) => commands::quote::run(args, &ctx).await,
        Commands::Coupon(args) => commands::coupon::run(args, &ctx).await,
        Commands::Zones(args) => commands::zones::run(args, &ctx).await,
        Commands::Rates(args) => commands::rates::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

/// Install the tracing subscriber. Logs go to stderr so `--json` output stays clean.
fn init_tracing(log: &LogConfig, verbose: bool) {
    let fallback = if verbose { "debug" } else { log.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    let json_layer = log.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!log.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
