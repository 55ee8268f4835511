//! CLI command implementations.

pub mod coupon;
pub mod quote;
pub mod rates;
pub mod zones;

use std::path::PathBuf;

use clap::Args;

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Cart file (JSON array of line items).
    pub cart: PathBuf,

    /// Destination zone (governorate code); repeat to compare zones.
    #[arg(short, long, required = true)]
    pub zone: Vec<String>,

    /// Fixture file overriding `[data] fixture`.
    #[arg(short, long)]
    pub fixture: Option<PathBuf>,

    /// Resolve vendor groups one after another.
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    /// Coupon code.
    pub code: String,

    /// Cart file (JSON array of line items).
    pub cart: PathBuf,

    /// Fixture file overriding `[data] fixture`.
    #[arg(short, long)]
    pub fixture: Option<PathBuf>,
}

/// Arguments for the zones command.
#[derive(Args)]
pub struct ZonesArgs {
    /// Only show zones whose code or name contains this text.
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the rates command.
#[derive(Args)]
pub struct RatesArgs {
    /// Vendor to show; all vendors when omitted.
    pub vendor: Option<String>,

    /// Fixture file overriding `[data] fixture`.
    #[arg(short, long)]
    pub fixture: Option<PathBuf>,

    /// Also list catalog zones the vendor has not priced.
    #[arg(long)]
    pub available: bool,
}

/// Read and validate a cart file.
pub(crate) fn read_cart(
    ctx: &crate::context::Context,
    path: &std::path::Path,
) -> anyhow::Result<Vec<souq_commerce::cart::CartLineItem>> {
    use anyhow::Context as _;

    let path = ctx.resolve_path(path);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read cart file: {}", path.display()))?;
    souq_data::parse_cart_json(&content, ctx.config.shipping.currency)
        .with_context(|| format!("Invalid cart file: {}", path.display()))
}
