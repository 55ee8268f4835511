//! Vendor rate listing command.

use anyhow::Result;
use serde::Serialize;
use souq_commerce::store::{MemoryStore, VendorShippingRate};
use souq_commerce::{Money, VendorId, Zone};

use super::RatesArgs;
use crate::context::Context;

#[derive(Serialize)]
struct VendorRates<'a> {
    vendor_id: &'a VendorId,
    default_shipping_cost: Option<Money>,
    rates: Vec<&'a VendorShippingRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_zones: Option<Vec<Zone>>,
}

/// Run the rates command.
pub async fn run(args: RatesArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store(args.fixture.as_deref())?;

    let requested = args.vendor.as_deref().map(VendorId::new);
    let vendors: Vec<&VendorId> = match &requested {
        Some(vendor) => vec![vendor],
        None => store.vendors(),
    };

    let listing: Vec<VendorRates<'_>> = vendors
        .into_iter()
        .map(|vendor| vendor_rates(&store, vendor, args.available))
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&listing);
        return Ok(());
    }

    if listing.is_empty() {
        ctx.output.info("No vendor shipping settings found.");
        return Ok(());
    }

    for entry in &listing {
        ctx.output.header(&format!("Vendor {}", entry.vendor_id));
        let fallback = entry
            .default_shipping_cost
            .map(|cost| cost.display())
            .unwrap_or_else(|| "none (flat rate applies)".to_string());
        ctx.output.kv("Default cost", &fallback);

        if entry.rates.is_empty() {
            ctx.output.info("No zone rates.");
        }
        let widths = [18, 12];
        for rate in &entry.rates {
            let cost = rate.cost.display();
            ctx.output.table_row(&[rate.zone.label_en(), &cost], &widths);
        }

        if let Some(zones) = &entry.available_zones {
            let codes: Vec<&str> = zones.iter().map(|z| z.as_str()).collect();
            ctx.output.kv("Unpriced zones", &codes.join(", "));
        }
    }
    Ok(())
}

fn vendor_rates<'a>(
    store: &'a MemoryStore,
    vendor: &'a VendorId,
    available: bool,
) -> VendorRates<'a> {
    VendorRates {
        vendor_id: vendor,
        default_shipping_cost: store
            .profile_for(vendor)
            .and_then(|profile| profile.default_shipping_cost),
        rates: store.rates_for(vendor),
        available_zones: available.then(|| store.available_zones(vendor)),
    }
}
