//! Store wrapper that bounds every lookup with a timeout.

use std::future::Future;

use async_trait::async_trait;
use souq_commerce::cart::CartLineItem;
use souq_commerce::coupon::CouponVerdict;
use souq_commerce::store::{
    CouponGateway, ShippingRateStore, VendorShippingProfile, VendorShippingRate,
};
use souq_commerce::{Money, StoreError, VendorId, Zone};
use tracing::{info, warn};

use crate::lookup::LookupKind;
use crate::timeout::TimeoutConfig;

/// Wraps a store and turns slow lookups into [`StoreError::Timeout`].
#[derive(Debug, Clone)]
pub struct TimedStore<S> {
    inner: S,
    timeouts: TimeoutConfig,
}

impl<S> TimedStore<S> {
    /// Wrap `inner` with the default timeouts.
    pub fn new(inner: S) -> Self {
        Self::with_timeouts(inner, TimeoutConfig::default())
    }

    pub fn with_timeouts(inner: S, timeouts: TimeoutConfig) -> Self {
        Self { inner, timeouts }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    async fn bounded<T, F>(&self, kind: LookupKind, lookup: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let after = self.timeouts.timeout_for(kind);
        match tokio::time::timeout(after, lookup).await {
            Ok(result) => result,
            Err(_) => {
                if kind.is_critical() {
                    warn!(lookup = %kind, ?after, "store lookup timed out");
                } else {
                    info!(lookup = %kind, ?after, "store lookup timed out");
                }
                Err(StoreError::Timeout {
                    lookup: kind.name().to_string(),
                    after,
                })
            }
        }
    }
}

#[async_trait]
impl<S: ShippingRateStore> ShippingRateStore for TimedStore<S> {
    async fn shipping_rate(
        &self,
        vendor: &VendorId,
        zone: &Zone,
    ) -> Result<Option<VendorShippingRate>, StoreError> {
        self.bounded(LookupKind::ShippingRate, self.inner.shipping_rate(vendor, zone))
            .await
    }

    async fn shipping_profile(
        &self,
        vendor: &VendorId,
    ) -> Result<Option<VendorShippingProfile>, StoreError> {
        self.bounded(LookupKind::VendorProfile, self.inner.shipping_profile(vendor))
            .await
    }
}

#[async_trait]
impl<S: CouponGateway> CouponGateway for TimedStore<S> {
    async fn redeem(
        &self,
        code: &str,
        items: &[CartLineItem],
        subtotal: Money,
    ) -> Result<CouponVerdict, StoreError> {
        self.bounded(LookupKind::Coupon, self.inner.redeem(code, items, subtotal))
            .await
    }
}
