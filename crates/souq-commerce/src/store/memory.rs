//! In-memory implementation of the collaborator ports.
//!
//! Backs the tests and the CLI fixtures. Lookups can be slowed down or made to
//! fail per vendor, and every call is counted so callers can assert which
//! lookups actually reached the store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CouponGateway, ShippingRateStore, VendorShippingProfile, VendorShippingRate};
use crate::cart::CartLineItem;
use crate::coupon::{Coupon, CouponRejection, CouponVerdict};
use crate::error::{CommerceError, StoreError};
use crate::ids::VendorId;
use crate::money::Money;
use crate::zone::{Zone, GOVERNORATES};

/// Kind of call that reached a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    ShippingRate,
    ShippingProfile,
    Redeem,
}

/// Rates, profiles and coupons held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rates: HashMap<(VendorId, Zone), VendorShippingRate>,
    profiles: HashMap<VendorId, VendorShippingProfile>,
    coupons: Vec<Coupon>,
    failing_vendors: HashSet<VendorId>,
    coupons_unavailable: bool,
    latency: Option<Duration>,
    now: Option<DateTime<Utc>>,
    rate_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    redeem_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone rate, builder style.
    pub fn with_rate(
        mut self,
        vendor: impl Into<VendorId>,
        zone: &str,
        cost: Money,
    ) -> Result<Self, CommerceError> {
        self.add_rate(VendorShippingRate {
            vendor_id: vendor.into(),
            zone: Zone::new(zone)?,
            cost,
        })?;
        Ok(self)
    }

    /// Add or replace a vendor profile, builder style.
    pub fn with_profile(
        mut self,
        vendor: impl Into<VendorId>,
        default_cost: Option<Money>,
    ) -> Result<Self, CommerceError> {
        self.set_profile(VendorShippingProfile {
            vendor_id: vendor.into(),
            default_shipping_cost: default_cost,
        })?;
        Ok(self)
    }

    /// Add a coupon, builder style.
    pub fn with_coupon(mut self, coupon: Coupon) -> Self {
        self.coupons.push(coupon);
        self
    }

    /// Insert a zone rate.
    ///
    /// A vendor has at most one rate per zone; a second insert for the same
    /// pair is rejected.
    pub fn add_rate(&mut self, rate: VendorShippingRate) -> Result<(), CommerceError> {
        check_cost(&rate.cost, &rate.vendor_id)?;
        let key = (rate.vendor_id.clone(), rate.zone.clone());
        if self.rates.contains_key(&key) {
            return Err(CommerceError::DuplicateShippingRate {
                vendor: rate.vendor_id.to_string(),
                zone: rate.zone.to_string(),
            });
        }
        self.rates.insert(key, rate);
        Ok(())
    }

    /// Insert or replace a vendor profile.
    pub fn set_profile(&mut self, profile: VendorShippingProfile) -> Result<(), CommerceError> {
        if let Some(cost) = &profile.default_shipping_cost {
            check_cost(cost, &profile.vendor_id)?;
        }
        self.profiles.insert(profile.vendor_id.clone(), profile);
        Ok(())
    }

    /// Insert a coupon.
    pub fn add_coupon(&mut self, coupon: Coupon) {
        self.coupons.push(coupon);
    }

    /// Make every lookup for `vendor` fail with [`StoreError::Unavailable`].
    pub fn failing_vendor(mut self, vendor: impl Into<VendorId>) -> Self {
        self.failing_vendors.insert(vendor.into());
        self
    }

    /// Make every coupon redemption fail with [`StoreError::Unavailable`].
    pub fn coupons_unavailable(mut self) -> Self {
        self.coupons_unavailable = true;
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Evaluate coupon windows at a fixed instant instead of the wall clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// All rates of one vendor, ordered by zone.
    pub fn rates_for(&self, vendor: &VendorId) -> Vec<&VendorShippingRate> {
        let mut rates: Vec<&VendorShippingRate> = self
            .rates
            .values()
            .filter(|rate| &rate.vendor_id == vendor)
            .collect();
        rates.sort_by(|a, b| a.zone.cmp(&b.zone));
        rates
    }

    /// The profile of one vendor.
    pub fn profile_for(&self, vendor: &VendorId) -> Option<&VendorShippingProfile> {
        self.profiles.get(vendor)
    }

    /// Catalog governorates the vendor has not priced yet.
    pub fn available_zones(&self, vendor: &VendorId) -> Vec<Zone> {
        GOVERNORATES
            .iter()
            .filter_map(|g| Zone::new(g.code).ok())
            .filter(|zone| !self.rates.contains_key(&(vendor.clone(), zone.clone())))
            .collect()
    }

    /// Vendors that have a rate or a profile, sorted.
    pub fn vendors(&self) -> Vec<&VendorId> {
        let mut vendors: Vec<&VendorId> = self
            .rates
            .keys()
            .map(|(vendor, _)| vendor)
            .chain(self.profiles.keys())
            .collect();
        vendors.sort();
        vendors.dedup();
        vendors
    }

    /// The stored coupons.
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Number of calls of `kind` that reached the store.
    pub fn calls(&self, kind: StoreCall) -> usize {
        self.counter(kind).load(Ordering::SeqCst)
    }

    /// Total number of calls that reached the store.
    pub fn total_calls(&self) -> usize {
        self.calls(StoreCall::ShippingRate)
            + self.calls(StoreCall::ShippingProfile)
            + self.calls(StoreCall::Redeem)
    }

    fn counter(&self, kind: StoreCall) -> &AtomicUsize {
        match kind {
            StoreCall::ShippingRate => &self.rate_calls,
            StoreCall::ShippingProfile => &self.profile_calls,
            StoreCall::Redeem => &self.redeem_calls,
        }
    }

    async fn enter(&self, kind: StoreCall) {
        self.counter(kind).fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_vendor(&self, vendor: &VendorId) -> Result<(), StoreError> {
        if self.failing_vendors.contains(vendor) {
            return Err(StoreError::Unavailable(format!(
                "shipping data for vendor {} is unreachable",
                vendor
            )));
        }
        Ok(())
    }
}

fn check_cost(cost: &Money, vendor: &VendorId) -> Result<(), CommerceError> {
    if cost.is_negative() {
        return Err(CommerceError::InvalidPrice(format!(
            "shipping cost {} for vendor {}",
            cost, vendor
        )));
    }
    Ok(())
}

#[async_trait]
impl ShippingRateStore for MemoryStore {
    async fn shipping_rate(
        &self,
        vendor: &VendorId,
        zone: &Zone,
    ) -> Result<Option<VendorShippingRate>, StoreError> {
        self.enter(StoreCall::ShippingRate).await;
        self.check_vendor(vendor)?;
        Ok(self.rates.get(&(vendor.clone(), zone.clone())).cloned())
    }

    async fn shipping_profile(
        &self,
        vendor: &VendorId,
    ) -> Result<Option<VendorShippingProfile>, StoreError> {
        self.enter(StoreCall::ShippingProfile).await;
        self.check_vendor(vendor)?;
        Ok(self.profiles.get(vendor).cloned())
    }
}

#[async_trait]
impl CouponGateway for MemoryStore {
    async fn redeem(
        &self,
        code: &str,
        items: &[CartLineItem],
        subtotal: Money,
    ) -> Result<CouponVerdict, StoreError> {
        self.enter(StoreCall::Redeem).await;
        if self.coupons_unavailable {
            return Err(StoreError::Unavailable("coupon service is unreachable".into()));
        }

        let Some(coupon) = self.coupons.iter().find(|c| c.matches_code(code)) else {
            return Ok(CouponVerdict::Rejected(CouponRejection::NotFound));
        };

        let now = self.now.unwrap_or_else(Utc::now);
        coupon
            .evaluate(items, subtotal, now)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
