//! Lookup kinds for store calls.

use std::time::Duration;

/// The kinds of calls made against the persistence collaborator.
///
/// Each kind carries a default timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// Vendor rate for a zone.
    ShippingRate,
    /// Vendor shipping profile.
    VendorProfile,
    /// Coupon redemption.
    Coupon,
}

impl LookupKind {
    /// Get the default timeout for this lookup kind.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::ShippingRate => Duration::from_millis(300),
            Self::VendorProfile => Duration::from_millis(300),
            Self::Coupon => Duration::from_millis(800),
        }
    }

    /// Whether a failure blocks the shipping quote.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::ShippingRate | Self::VendorProfile)
    }

    /// Get the name of this lookup kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShippingRate => "shipping_rate",
            Self::VendorProfile => "vendor_profile",
            Self::Coupon => "coupon",
        }
    }
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
