//! Zone-based shipping calculation.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{group_by_vendor, CartLineItem, VendorGroup};
use crate::error::CommerceError;
use crate::ids::VendorId;
use crate::money::{Currency, Money};
use crate::shipping::policy::{default_policies, ShippingCharge, ShippingPolicy, ShippingRequest};
use crate::shipping::{ShippingBreakdown, ShippingResult};
use crate::store::ShippingRateStore;
use crate::zone::Zone;

/// Flat rate, in major units, for platform products and unpriced vendors.
pub const DEFAULT_SHIPPING_RATE: i64 = 25;

/// Calculator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    /// Currency of every quote.
    pub currency: Currency,
    /// Flat rate in major units.
    pub default_rate: f64,
    /// Resolve vendor groups concurrently.
    pub fan_out: bool,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::EGP,
            default_rate: DEFAULT_SHIPPING_RATE as f64,
            fan_out: true,
        }
    }
}

impl ShippingConfig {
    /// The flat rate as money.
    pub fn default_rate_money(&self) -> Money {
        Money::from_decimal(self.default_rate, self.currency)
    }
}

/// Prices a cart by running each vendor group through a policy chain.
#[derive(Clone)]
pub struct ShippingCalculator {
    policies: Vec<Arc<dyn ShippingPolicy>>,
    currency: Currency,
    fan_out: bool,
}

impl ShippingCalculator {
    /// Calculator with the standard chain and a 25 EGP flat rate.
    pub fn new(store: Arc<dyn ShippingRateStore>) -> Self {
        Self::with_config(store, &ShippingConfig::default())
    }

    /// Calculator with the standard chain and the given settings.
    pub fn with_config(store: Arc<dyn ShippingRateStore>, config: &ShippingConfig) -> Self {
        Self {
            policies: default_policies(store, config.default_rate_money()),
            currency: config.currency,
            fan_out: config.fan_out,
        }
    }

    /// Calculator with a custom chain.
    pub fn from_policies(policies: Vec<Arc<dyn ShippingPolicy>>, currency: Currency) -> Self {
        Self {
            policies,
            currency,
            fan_out: true,
        }
    }

    /// Toggle concurrent group resolution.
    pub fn with_fan_out(mut self, fan_out: bool) -> Self {
        self.fan_out = fan_out;
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Names of the policies, in evaluation order.
    pub fn policy_names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.name()).collect()
    }

    /// Quote shipping for `items` delivered to `zone`.
    ///
    /// One breakdown entry per vendor group, in cart order. Any lookup
    /// failure fails the whole quote.
    #[tracing::instrument(skip(self, items), fields(zone = %zone, lines = items.len()))]
    pub async fn calculate(
        &self,
        items: &[CartLineItem],
        zone: &Zone,
    ) -> Result<ShippingResult, CommerceError> {
        for item in items {
            item.validate()?;
        }

        let groups = group_by_vendor(items);
        let breakdown = if self.fan_out {
            try_join_all(groups.iter().map(|group| self.resolve_group(group, zone))).await?
        } else {
            let mut breakdown = Vec::with_capacity(groups.len());
            for group in &groups {
                breakdown.push(self.resolve_group(group, zone).await?);
            }
            breakdown
        };

        let result = ShippingResult::from_breakdown(breakdown, self.currency)?;
        info!(
            groups = result.breakdown().len(),
            total = %result.total_shipping(),
            "shipping quoted"
        );
        Ok(result)
    }

    /// Just the total of [`calculate`](Self::calculate).
    pub async fn total(&self, items: &[CartLineItem], zone: &Zone) -> Result<Money, CommerceError> {
        Ok(self.calculate(items, zone).await?.total_shipping())
    }

    /// One vendor's charge (`None` = platform) without building a cart.
    pub async fn vendor_cost(
        &self,
        vendor: Option<&VendorId>,
        zone: &Zone,
        has_free_shipping_product: bool,
    ) -> Result<Money, CommerceError> {
        let request = ShippingRequest {
            vendor,
            has_free_shipping_item: has_free_shipping_product,
            zone,
        };
        Ok(self.resolve(&request).await?.cost)
    }

    async fn resolve_group(
        &self,
        group: &VendorGroup,
        zone: &Zone,
    ) -> Result<ShippingBreakdown, CommerceError> {
        let charge = self
            .resolve(&ShippingRequest::for_group(group, zone))
            .await?;
        debug!(
            group = %group,
            cost = %charge.cost,
            reason = %charge.reason,
            "group resolved"
        );
        Ok(ShippingBreakdown {
            vendor_id: group.vendor_id().cloned(),
            cost: charge.cost,
            reason: charge.reason,
        })
    }

    async fn resolve(
        &self,
        request: &ShippingRequest<'_>,
    ) -> Result<ShippingCharge, CommerceError> {
        for policy in &self.policies {
            if let Some(charge) = policy.evaluate(request).await? {
                debug!(policy = policy.name(), "policy matched");
                return Ok(charge);
            }
        }
        let owner = match request.vendor {
            Some(vendor) => format!("vendor:{}", vendor),
            None => "platform".to_string(),
        };
        Err(CommerceError::ShippingUnresolved(owner))
    }
}

impl std::fmt::Debug for ShippingCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingCalculator")
            .field("policies", &self.policy_names())
            .field("currency", &self.currency)
            .field("fan_out", &self.fan_out)
            .finish()
    }
}
