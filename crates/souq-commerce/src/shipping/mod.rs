//! Shipping module.
//!
//! Contains the policy chain, the calculator, and quote memoization.

mod cache;
mod calculator;
mod policy;
mod result;

pub use cache::{CacheStats, QuoteCache, QuoteKey, QuoteSlot, DEFAULT_QUOTE_CAPACITY};
pub use calculator::{ShippingCalculator, ShippingConfig, DEFAULT_SHIPPING_RATE};
pub use policy::{
    default_policies, FlatRatePolicy, FreeProductPolicy, PlatformRatePolicy, ShippingCharge,
    ShippingPolicy, ShippingReason, ShippingRequest, VendorProfilePolicy, ZoneRatePolicy,
};
pub use result::{ShippingBreakdown, ShippingResult};
