//! Shipping quote command.

use anyhow::{Context as _, Result};
use serde::Serialize;
use souq_commerce::shipping::ShippingResult;
use souq_commerce::Zone;

use super::{read_cart, QuoteArgs};
use crate::context::Context;
use crate::output::reason_badge;

#[derive(Serialize)]
struct ZoneQuote<'a> {
    zone: &'a Zone,
    #[serde(flatten)]
    quote: &'a ShippingResult,
}

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let zones = args
        .zone
        .iter()
        .map(|raw| Zone::new(raw).with_context(|| format!("Invalid --zone '{}'", raw)))
        .collect::<Result<Vec<_>>>()?;
    for zone in zones.iter().filter(|zone| zone.governorate().is_none()) {
        ctx.output
            .warn(&format!("'{}' is not a known governorate; quoting anyway.", zone));
    }

    let items = read_cart(ctx, &args.cart)?;
    let store = ctx.store(args.fixture.as_deref())?;
    let calculator = ctx
        .calculator(store)
        .with_fan_out(ctx.config.shipping.fan_out && !args.sequential);
    let cache = ctx.quote_cache();

    let mut quotes = Vec::with_capacity(zones.len());
    for zone in &zones {
        let result = cache
            .quote(&calculator, &items, zone)
            .await
            .with_context(|| format!("Shipping quote for {} failed", zone))?;
        quotes.push(result);
    }

    let stats = cache.stats();
    ctx.output.debug(&format!(
        "Quote cache: {} hit(s), {} miss(es), capacity {}",
        stats.hits, stats.misses, ctx.config.cache.capacity
    ));

    if ctx.output.is_json() {
        match quotes.as_slice() {
            [single] => ctx.output.json(single),
            _ => {
                let rows: Vec<ZoneQuote<'_>> = zones
                    .iter()
                    .zip(&quotes)
                    .map(|(zone, quote)| ZoneQuote { zone, quote })
                    .collect();
                ctx.output.json(&rows);
            }
        }
        return Ok(());
    }

    for (zone, result) in zones.iter().zip(&quotes) {
        print_quote(ctx, zone, result);
    }
    Ok(())
}

fn print_quote(ctx: &Context, zone: &Zone, result: &ShippingResult) {
    ctx.output
        .header(&format!("Shipping to {} ({})", zone.label_en(), zone.label()));
    let widths = [20, 12, 14];
    ctx.output.table_row(&["SELLER", "COST", "REASON"], &widths);
    for entry in result.breakdown() {
        let seller = entry
            .vendor_id
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "platform".to_string());
        let cost = entry.cost.display();
        ctx.output.table_row(&[&seller, &cost, entry.reason.as_str()], &widths);
        ctx.output
            .debug(&format!("{} resolved by {}", seller, reason_badge(entry.reason)));
    }

    println!();
    if result.is_free() {
        ctx.output.success("Free shipping");
    } else {
        ctx.output.success(&format!(
            "Total shipping: {}",
            result.total_shipping().display()
        ));
    }
}
