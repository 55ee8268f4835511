//! Coupon check command.

use anyhow::{Context as _, Result};
use souq_commerce::cart::cart_subtotal;
use souq_commerce::coupon::{CouponApplier, CouponSession};

use super::{read_cart, CouponArgs};
use crate::context::Context;

/// Run the coupon command.
pub async fn run(args: CouponArgs, ctx: &Context) -> Result<()> {
    let items = read_cart(ctx, &args.cart)?;
    let subtotal = cart_subtotal(&items, ctx.config.shipping.currency)
        .context("Failed to total the cart")?;

    let store = ctx.store(args.fixture.as_deref())?;
    let applier = CouponApplier::new(ctx.timed(store));
    let mut session = CouponSession::new();

    let result = session.apply(&applier, &args.code, &items, subtotal).await?;
    let total = session.apply_to(subtotal)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "result": result,
            "subtotal": subtotal,
            "total": total,
        }));
        return Ok(());
    }

    ctx.output.kv("Subtotal", &subtotal.display());
    match (result.coupon(), result.discount()) {
        (Some(coupon), Some(discount)) => {
            ctx.output.kv("Discount", &format!("-{}", discount.display()));
            ctx.output.kv("Total", &total.display());
            ctx.output.success(&format!("Coupon {} applied", coupon.code));
        }
        _ => {
            ctx.output.warn(
                result
                    .message()
                    .as_deref()
                    .unwrap_or("Coupon was not applied"),
            );
        }
    }
    Ok(())
}
