//! Coupon module.
//!
//! Contains coupon definitions, the code applier and the per-cart session.

mod applier;
#[allow(clippy::module_inception)]
mod coupon;
mod session;

pub use applier::{
    normalize_code, CouponApplicationResult, CouponApplier, CouponFailure, MISSING_CODE_MESSAGE,
    UNAVAILABLE_MESSAGE,
};
pub use coupon::{Coupon, CouponRejection, CouponScope, CouponValue, CouponVerdict};
pub use session::{ApplyTicket, CouponSession, CouponState};
