//! Shipping and coupon rules for the Souq multi-vendor storefront.
//!
//! This crate provides the pricing logic that sits between the cart and the
//! checkout:
//!
//! - **Cart**: line items and their vendor grouping
//! - **Shipping**: zone-based rates resolved per vendor through a policy chain
//! - **Coupon**: code validation and the per-cart coupon session
//! - **Store**: the async ports used to read rates, profiles and coupons
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use souq_commerce::prelude::*;
//!
//! # async fn run() -> Result<(), CommerceError> {
//! let store = Arc::new(
//!     MemoryStore::new()
//!         .with_rate("V1", "cairo", Money::from_major(15, Currency::EGP))?,
//! );
//! let calculator = ShippingCalculator::new(store);
//!
//! let items = vec![
//!     CartLineItem::new("p-1", 1, Money::from_major(100, Currency::EGP))?.with_vendor("V1"),
//!     CartLineItem::new("p-2", 1, Money::from_major(40, Currency::EGP))?,
//! ];
//! let quote = calculator.calculate(&items, &Zone::new("cairo")?).await?;
//! assert_eq!(quote.total_shipping(), Money::from_major(40, Currency::EGP));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod zone;

pub mod cart;
pub mod coupon;
pub mod shipping;
pub mod store;

pub use error::{CommerceError, StoreError};
pub use ids::*;
pub use money::{Currency, Money};
pub use zone::Zone;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{cart_subtotal, group_by_vendor, CartLineItem, VendorGroup};
    pub use crate::coupon::{
        Coupon, CouponApplicationResult, CouponApplier, CouponFailure, CouponRejection,
        CouponSession, CouponState, CouponVerdict,
    };
    pub use crate::error::{CommerceError, StoreError};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::shipping::{
        QuoteCache, QuoteKey, QuoteSlot, ShippingBreakdown, ShippingCalculator, ShippingConfig,
        ShippingReason, ShippingResult,
    };
    pub use crate::store::{
        CouponGateway, MemoryStore, ShippingRateStore, VendorShippingProfile, VendorShippingRate,
    };
    pub use crate::zone::Zone;
}
