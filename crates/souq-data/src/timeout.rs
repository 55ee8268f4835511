//! Timeout configuration for store lookups.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lookup::LookupKind;

/// Per-kind lookup timeouts, in milliseconds.
///
/// Deserializes from the `[lookups]` table of `souq.toml`; missing keys keep
/// the [`LookupKind`] defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Vendor zone rate lookups.
    pub rate_timeout_ms: u64,
    /// Vendor profile lookups.
    pub profile_timeout_ms: u64,
    /// Coupon redemptions.
    pub coupon_timeout_ms: u64,
}

impl TimeoutConfig {
    /// Use the same timeout for every lookup.
    pub fn uniform(timeout: Duration) -> Self {
        let ms = timeout.as_millis() as u64;
        Self {
            rate_timeout_ms: ms,
            profile_timeout_ms: ms,
            coupon_timeout_ms: ms,
        }
    }

    /// Override one kind.
    pub fn with_timeout(mut self, kind: LookupKind, timeout: Duration) -> Self {
        let ms = timeout.as_millis() as u64;
        match kind {
            LookupKind::ShippingRate => self.rate_timeout_ms = ms,
            LookupKind::VendorProfile => self.profile_timeout_ms = ms,
            LookupKind::Coupon => self.coupon_timeout_ms = ms,
        }
        self
    }

    /// The timeout for `kind`.
    pub fn timeout_for(&self, kind: LookupKind) -> Duration {
        let ms = match kind {
            LookupKind::ShippingRate => self.rate_timeout_ms,
            LookupKind::VendorProfile => self.profile_timeout_ms,
            LookupKind::Coupon => self.coupon_timeout_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            rate_timeout_ms: LookupKind::ShippingRate.default_timeout().as_millis() as u64,
            profile_timeout_ms: LookupKind::VendorProfile.default_timeout().as_millis() as u64,
            coupon_timeout_ms: LookupKind::Coupon.default_timeout().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_lookup_kinds() {
        let config = TimeoutConfig::default();
        assert_eq!(config.timeout_for(LookupKind::ShippingRate), Duration::from_millis(300));
        assert_eq!(config.timeout_for(LookupKind::Coupon), Duration::from_millis(800));
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let config: TimeoutConfig = toml::from_str("coupon_timeout_ms = 1500").unwrap();
        assert_eq!(config.coupon_timeout_ms, 1500);
        assert_eq!(config.rate_timeout_ms, 300);
    }

    #[test]
    fn test_override_one_kind() {
        let config = TimeoutConfig::uniform(Duration::from_millis(100))
            .with_timeout(LookupKind::VendorProfile, Duration::from_millis(50));
        assert_eq!(config.timeout_for(LookupKind::VendorProfile), Duration::from_millis(50));
        assert_eq!(config.timeout_for(LookupKind::ShippingRate), Duration::from_millis(100));
    }
}
