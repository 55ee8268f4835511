//! Shipping quote results.

use serde::Serialize;

use crate::error::CommerceError;
use crate::ids::VendorId;
use crate::money::{Currency, Money};
use crate::shipping::ShippingReason;

/// The charge for one vendor group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingBreakdown {
    /// The vendor; `None` for platform-owned products.
    pub vendor_id: Option<VendorId>,
    pub cost: Money,
    pub reason: ShippingReason,
}

/// A complete shipping quote.
///
/// The total is always the sum of the breakdown costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingResult {
    total_shipping: Money,
    breakdown: Vec<ShippingBreakdown>,
}

impl ShippingResult {
    /// Build a result, summing the breakdown into the total.
    pub fn from_breakdown(
        breakdown: Vec<ShippingBreakdown>,
        currency: Currency,
    ) -> Result<Self, CommerceError> {
        let total_shipping = Money::sum(breakdown.iter().map(|entry| &entry.cost), currency)?;
        Ok(Self {
            total_shipping,
            breakdown,
        })
    }

    /// A quote with no groups.
    pub fn empty(currency: Currency) -> Self {
        Self {
            total_shipping: Money::zero(currency),
            breakdown: Vec::new(),
        }
    }

    pub fn total_shipping(&self) -> Money {
        self.total_shipping
    }

    /// Per-group charges in cart order.
    pub fn breakdown(&self) -> &[ShippingBreakdown] {
        &self.breakdown
    }

    /// Whether nothing is charged.
    pub fn is_free(&self) -> bool {
        self.total_shipping.is_zero()
    }
}
