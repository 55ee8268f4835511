//! Persistence collaborator ports.
//!
//! The shipping calculator and coupon applier never talk to a backend
//! directly. They read through these traits, so production code can plug in
//! the hosted backend while tests use [`MemoryStore`].

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::coupon::CouponVerdict;
use crate::error::StoreError;
use crate::ids::VendorId;
use crate::money::Money;
use crate::zone::Zone;

pub use memory::{MemoryStore, StoreCall};

/// A vendor's shipping cost for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorShippingRate {
    pub vendor_id: VendorId,
    pub zone: Zone,
    pub cost: Money,
}

/// A vendor's shipping settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorShippingProfile {
    pub vendor_id: VendorId,
    /// Fallback cost when the vendor has no rate for the destination zone.
    #[serde(default)]
    pub default_shipping_cost: Option<Money>,
}

/// Read access to vendor shipping data.
#[async_trait]
pub trait ShippingRateStore: Send + Sync {
    /// The rate for `(vendor, zone)`, or `None` if the vendor has none.
    async fn shipping_rate(
        &self,
        vendor: &VendorId,
        zone: &Zone,
    ) -> Result<Option<VendorShippingRate>, StoreError>;

    /// The vendor's shipping profile, or `None` if it has none.
    async fn shipping_profile(
        &self,
        vendor: &VendorId,
    ) -> Result<Option<VendorShippingProfile>, StoreError>;
}

/// Remote coupon validation.
///
/// Matching, expiry, usage caps, scoping and percentage conversion all happen
/// behind this port; callers receive a flat discount amount.
#[async_trait]
pub trait CouponGateway: Send + Sync {
    /// Validate `code` against the cart and compute its discount.
    async fn redeem(
        &self,
        code: &str,
        items: &[CartLineItem],
        subtotal: Money,
    ) -> Result<CouponVerdict, StoreError>;
}

#[async_trait]
impl<S: ShippingRateStore + ?Sized> ShippingRateStore for Arc<S> {
    async fn shipping_rate(
        &self,
        vendor: &VendorId,
        zone: &Zone,
    ) -> Result<Option<VendorShippingRate>, StoreError> {
        (**self).shipping_rate(vendor, zone).await
    }

    async fn shipping_profile(
        &self,
        vendor: &VendorId,
    ) -> Result<Option<VendorShippingProfile>, StoreError> {
        (**self).shipping_profile(vendor).await
    }
}

#[async_trait]
impl<G: CouponGateway + ?Sized> CouponGateway for Arc<G> {
    async fn redeem(
        &self,
        code: &str,
        items: &[CartLineItem],
        subtotal: Money,
    ) -> Result<CouponVerdict, StoreError> {
        (**self).redeem(code, items, subtotal).await
    }
}
