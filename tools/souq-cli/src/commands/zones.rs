//! Zone catalog command.

use anyhow::Result;
use souq_commerce::zone::{Governorate, GOVERNORATES};

use super::ZonesArgs;
use crate::context::Context;

/// Run the zones command.
pub async fn run(args: ZonesArgs, ctx: &Context) -> Result<()> {
    let filter = args.filter.as_deref().map(str::to_lowercase);
    let zones: Vec<&Governorate> = GOVERNORATES
        .iter()
        .filter(|g| match &filter {
            Some(text) => {
                g.code.contains(text.as_str())
                    || g.label_en.to_lowercase().contains(text.as_str())
            }
            None => true,
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&zones);
        return Ok(());
    }

    if zones.is_empty() {
        ctx.output.info("No matching zones.");
        return Ok(());
    }

    ctx.output.header("Shipping zones");
    let widths = [16, 18, 16];
    ctx.output.table_row(&["CODE", "NAME", "الاسم"], &widths);
    for zone in zones {
        ctx.output
            .table_row(&[zone.code, zone.label_en, zone.label], &widths);
    }
    Ok(())
}
