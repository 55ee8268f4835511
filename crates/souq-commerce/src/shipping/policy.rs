//! Shipping policies.
//!
//! Each vendor group is priced by an ordered chain of policies. The first
//! policy that returns a charge wins; `Ok(None)` falls through to the next.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cart::VendorGroup;
use crate::error::CommerceError;
use crate::ids::VendorId;
use crate::money::{Currency, Money};
use crate::store::ShippingRateStore;
use crate::zone::Zone;

/// Why a group was charged what it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingReason {
    /// The group contains a free-shipping product.
    FreeProduct,
    /// The vendor has a rate for the destination zone.
    ZoneRate,
    /// A profile default or the platform flat rate.
    DefaultRate,
}

impl ShippingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingReason::FreeProduct => "free_product",
            ShippingReason::ZoneRate => "zone_rate",
            ShippingReason::DefaultRate => "default_rate",
        }
    }
}

impl std::fmt::Display for ShippingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The charge a policy settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingCharge {
    pub cost: Money,
    pub reason: ShippingReason,
}

impl ShippingCharge {
    pub fn new(cost: Money, reason: ShippingReason) -> Self {
        Self { cost, reason }
    }
}

/// What a policy needs to know about one group.
#[derive(Debug, Clone, Copy)]
pub struct ShippingRequest<'a> {
    /// Owning vendor; `None` for the platform group.
    pub vendor: Option<&'a VendorId>,
    /// Whether any line ships for free.
    pub has_free_shipping_item: bool,
    /// Destination zone.
    pub zone: &'a Zone,
}

impl<'a> ShippingRequest<'a> {
    pub fn for_group(group: &'a VendorGroup, zone: &'a Zone) -> Self {
        Self {
            vendor: group.vendor_id(),
            has_free_shipping_item: group.has_free_shipping_item(),
            zone,
        }
    }
}

/// One link of the pricing chain.
#[async_trait]
pub trait ShippingPolicy: Send + Sync {
    /// Policy name, used in logs.
    fn name(&self) -> &'static str;

    /// Price the request, or return `Ok(None)` to defer to the next policy.
    async fn evaluate(
        &self,
        request: &ShippingRequest<'_>,
    ) -> Result<Option<ShippingCharge>, CommerceError>;
}

/// Groups containing a free-shipping product ship for free.
#[derive(Debug, Clone, Copy)]
pub struct FreeProductPolicy {
    zero: Money,
}

impl FreeProductPolicy {
    pub fn new(currency: Currency) -> Self {
        Self {
            zero: Money::zero(currency),
        }
    }
}

#[async_trait]
impl ShippingPolicy for FreeProductPolicy {
    fn name(&self) -> &'static str {
        "free_product"
    }

    async fn evaluate(
        &self,
        request: &ShippingRequest<'_>,
    ) -> Result<Option<ShippingCharge>, CommerceError> {
        Ok(request
            .has_free_shipping_item
            .then(|| ShippingCharge::new(self.zero, ShippingReason::FreeProduct)))
    }
}

/// Platform-owned products pay the fixed platform rate.
#[derive(Debug, Clone, Copy)]
pub struct PlatformRatePolicy {
    rate: Money,
}

impl PlatformRatePolicy {
    pub fn new(rate: Money) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl ShippingPolicy for PlatformRatePolicy {
    fn name(&self) -> &'static str {
        "platform_rate"
    }

    async fn evaluate(
        &self,
        request: &ShippingRequest<'_>,
    ) -> Result<Option<ShippingCharge>, CommerceError> {
        Ok(request
            .vendor
            .is_none()
            .then(|| ShippingCharge::new(self.rate, ShippingReason::DefaultRate)))
    }
}

/// The vendor's rate for the destination zone.
pub struct ZoneRatePolicy {
    store: Arc<dyn ShippingRateStore>,
    currency: Currency,
}

impl ZoneRatePolicy {
    pub fn new(store: Arc<dyn ShippingRateStore>, currency: Currency) -> Self {
        Self { store, currency }
    }
}

#[async_trait]
impl ShippingPolicy for ZoneRatePolicy {
    fn name(&self) -> &'static str {
        "zone_rate"
    }

    async fn evaluate(
        &self,
        request: &ShippingRequest<'_>,
    ) -> Result<Option<ShippingCharge>, CommerceError> {
        let Some(vendor) = request.vendor else {
            return Ok(None);
        };
        let Some(rate) = self.store.shipping_rate(vendor, request.zone).await? else {
            debug!(vendor = %vendor, zone = %request.zone, "no zone rate");
            return Ok(None);
        };
        ensure_cost(self.currency, &rate.cost, vendor)?;
        Ok(Some(ShippingCharge::new(rate.cost, ShippingReason::ZoneRate)))
    }
}

/// The vendor's default shipping cost, when it has one.
pub struct VendorProfilePolicy {
    store: Arc<dyn ShippingRateStore>,
    currency: Currency,
}

impl VendorProfilePolicy {
    pub fn new(store: Arc<dyn ShippingRateStore>, currency: Currency) -> Self {
        Self { store, currency }
    }
}

#[async_trait]
impl ShippingPolicy for VendorProfilePolicy {
    fn name(&self) -> &'static str {
        "vendor_profile"
    }

    async fn evaluate(
        &self,
        request: &ShippingRequest<'_>,
    ) -> Result<Option<ShippingCharge>, CommerceError> {
        let Some(vendor) = request.vendor else {
            return Ok(None);
        };
        let default_cost = self
            .store
            .shipping_profile(vendor)
            .await?
            .and_then(|profile| profile.default_shipping_cost);
        match default_cost {
            Some(cost) => {
                ensure_cost(self.currency, &cost, vendor)?;
                Ok(Some(ShippingCharge::new(cost, ShippingReason::DefaultRate)))
            }
            None => Ok(None),
        }
    }
}

/// Catch-all flat rate.
#[derive(Debug, Clone, Copy)]
pub struct FlatRatePolicy {
    rate: Money,
}

impl FlatRatePolicy {
    pub fn new(rate: Money) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl ShippingPolicy for FlatRatePolicy {
    fn name(&self) -> &'static str {
        "flat_rate"
    }

    async fn evaluate(
        &self,
        _request: &ShippingRequest<'_>,
    ) -> Result<Option<ShippingCharge>, CommerceError> {
        Ok(Some(ShippingCharge::new(self.rate, ShippingReason::DefaultRate)))
    }
}

/// The standard chain: free product, platform rate, zone rate, vendor
/// profile, flat rate.
pub fn default_policies(
    store: Arc<dyn ShippingRateStore>,
    default_rate: Money,
) -> Vec<Arc<dyn ShippingPolicy>> {
    let currency = default_rate.currency;
    vec![
        Arc::new(FreeProductPolicy::new(currency)),
        Arc::new(PlatformRatePolicy::new(default_rate)),
        Arc::new(ZoneRatePolicy::new(store.clone(), currency)),
        Arc::new(VendorProfilePolicy::new(store, currency)),
        Arc::new(FlatRatePolicy::new(default_rate)),
    ]
}

/// Store-provided costs must be in the quote currency and non-negative.
fn ensure_cost(expected: Currency, cost: &Money, vendor: &VendorId) -> Result<(), CommerceError> {
    if cost.currency != expected {
        return Err(CommerceError::CurrencyMismatch {
            expected: expected.code().to_string(),
            got: cost.currency.code().to_string(),
        });
    }
    if cost.is_negative() {
        return Err(CommerceError::InvalidPrice(format!(
            "shipping cost {} for vendor {}",
            cost, vendor
        )));
    }
    Ok(())
}
