//! File fixtures for the in-memory store.
//!
//! A fixture lists vendor rates, vendor profiles and coupons in TOML or JSON,
//! with amounts in major currency units:
//!
//! ```toml
//! currency = "EGP"
//!
//! [[rates]]
//! vendor = "V1"
//! zone = "cairo"
//! cost = 15.0
//!
//! [[coupons]]
//! code = "SAVE10"
//! percent = 10.0
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_commerce::coupon::Coupon;
use souq_commerce::store::{MemoryStore, VendorShippingProfile, VendorShippingRate};
use souq_commerce::{CommerceError, Currency, Money, ProductId, VendorId, Zone};
use thiserror::Error;

/// Errors raised while loading a fixture.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid fixture: {0}")]
    Invalid(String),

    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

/// A zone rate entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRecord {
    pub vendor: String,
    pub zone: String,
    pub cost: f64,
}

/// A vendor profile entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub vendor: String,
    #[serde(default)]
    pub default_shipping_cost: Option<f64>,
}

/// A coupon entry. Exactly one of `percent` and `amount` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponRecord {
    pub code: String,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub vendors: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub minimum_purchase: Option<f64>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub usage_count: i64,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Parsed fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub rates: Vec<RateRecord>,
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
    #[serde(default)]
    pub coupons: Vec<CouponRecord>,
}

impl Fixture {
    /// Load a fixture, choosing the format by file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, FixtureError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build a [`MemoryStore`] holding the fixture's records.
    pub fn into_store(self) -> Result<MemoryStore, FixtureError> {
        let currency = self.currency;
        let mut store = MemoryStore::new();

        for rate in self.rates {
            store.add_rate(VendorShippingRate {
                vendor_id: vendor_id(&rate.vendor)?,
                zone: Zone::new(&rate.zone)?,
                cost: Money::from_decimal(rate.cost, currency),
            })?;
        }

        for profile in self.profiles {
            store.set_profile(VendorShippingProfile {
                vendor_id: vendor_id(&profile.vendor)?,
                default_shipping_cost: profile
                    .default_shipping_cost
                    .map(|cost| Money::from_decimal(cost, currency)),
            })?;
        }

        for record in self.coupons {
            store.add_coupon(record.into_coupon(currency)?);
        }

        Ok(store)
    }
}

impl CouponRecord {
    fn into_coupon(self, currency: Currency) -> Result<Coupon, FixtureError> {
        let mut coupon = match (self.percent, self.amount) {
            (Some(percent), None) => {
                if !(0.0..=100.0).contains(&percent) {
                    return Err(FixtureError::Invalid(format!(
                        "coupon {}: percent {} is outside 0-100",
                        self.code, percent
                    )));
                }
                Coupon::percentage(self.code.trim(), percent)
            }
            (None, Some(amount)) => {
                Coupon::fixed_amount(self.code.trim(), Money::from_decimal(amount, currency))
            }
            _ => {
                return Err(FixtureError::Invalid(format!(
                    "coupon {}: set exactly one of percent or amount",
                    self.code
                )))
            }
        };

        if coupon.code.is_empty() {
            return Err(FixtureError::Invalid("coupon with empty code".into()));
        }

        coupon = coupon
            .for_vendors(self.vendors.iter().map(|v| v.trim()).map(VendorId::from))
            .for_products(self.products.iter().map(|p| p.trim()).map(ProductId::from));
        coupon.minimum_purchase = self
            .minimum_purchase
            .map(|amount| Money::from_decimal(amount, currency));
        coupon.usage_limit = self.usage_limit;
        coupon.usage_count = self.usage_count;
        coupon.starts_at = self.starts_at;
        coupon.ends_at = self.ends_at;
        coupon.active = self.active;
        Ok(coupon)
    }
}

fn vendor_id(raw: &str) -> Result<VendorId, FixtureError> {
    VendorId::parse_optional(Some(raw))
        .ok_or_else(|| FixtureError::Invalid("record with empty vendor".into()))
}

#[cfg(test)]
mod tests {
    use souq_commerce::store::{CouponGateway, ShippingRateStore};
    use souq_commerce::coupon::CouponVerdict;

    use super::*;

    const SAMPLE: &str = r#"
currency = "EGP"

[[rates]]
vendor = "V1"
zone = "Cairo"
cost = 15.0

[[profiles]]
vendor = "V1"
default_shipping_cost = 30.0

[[profiles]]
vendor = "V2"

[[coupons]]
code = "SAVE10"
percent = 10.0
vendors = ["V1"]
minimum_purchase = 50.0
usage_limit = 100
ends_at = "2030-01-01T00:00:00Z"

[[coupons]]
code = "FLAT20"
amount = 20.0
"#;

    fn egp(amount: i64) -> Money {
        Money::from_major(amount, Currency::EGP)
    }

    #[tokio::test]
    async fn test_toml_fixture_loads_into_store() {
        let store = Fixture::from_toml_str(SAMPLE).unwrap().into_store().unwrap();
        let v1 = VendorId::new("V1");

        let rate = store
            .shipping_rate(&v1, &Zone::new("cairo").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rate.cost, egp(15));

        let profile = store.shipping_profile(&VendorId::new("V2")).await.unwrap().unwrap();
        assert_eq!(profile.default_shipping_cost, None);

        assert_eq!(store.coupons().len(), 2);
        let save10 = &store.coupons()[0];
        assert_eq!(save10.scope.vendors, vec![v1]);
        assert_eq!(save10.minimum_purchase, Some(egp(50)));
        assert!(save10.ends_at.is_some());
    }

    #[tokio::test]
    async fn test_fixed_coupon_from_fixture() {
        let store = Fixture::from_toml_str(SAMPLE).unwrap().into_store().unwrap();
        let verdict = store.redeem("flat20", &[], egp(100)).await.unwrap();
        assert!(matches!(verdict, CouponVerdict::Accepted { discount, .. } if discount == egp(20)));
    }

    #[test]
    fn test_json_fixture() {
        let fixture = Fixture::from_json_str(
            r#"{"rates": [{"vendor": "V1", "zone": "giza", "cost": 12.5}]}"#,
        )
        .unwrap();
        assert_eq!(fixture.currency, Currency::EGP);

        let store = fixture.into_store().unwrap();
        let rates = store.rates_for(&VendorId::new("V1"));
        assert_eq!(rates[0].cost.amount_minor, 1250);
    }

    #[test]
    fn test_duplicate_rate_rejected() {
        let content = r#"
[[rates]]
vendor = "V1"
zone = "cairo"
cost = 15.0

[[rates]]
vendor = "V1"
zone = "CAIRO"
cost = 20.0
"#;
        let err = Fixture::from_toml_str(content).unwrap().into_store().unwrap_err();
        assert!(matches!(
            err,
            FixtureError::Commerce(CommerceError::DuplicateShippingRate { .. })
        ));
    }

    #[test]
    fn test_negative_profile_default_rejected() {
        let content = r#"
[[profiles]]
vendor = "V1"
default_shipping_cost = -10.0
"#;
        let err = Fixture::from_toml_str(content).unwrap().into_store().unwrap_err();
        assert!(matches!(
            err,
            FixtureError::Commerce(CommerceError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_coupon_needs_exactly_one_value() {
        let content = r#"
[[coupons]]
code = "BOTH"
percent = 10.0
amount = 5.0
"#;
        let err = Fixture::from_toml_str(content).unwrap().into_store().unwrap_err();
        assert!(matches!(err, FixtureError::Invalid(_)));
    }

    #[test]
    fn test_bundled_fixture_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/vendors.toml");
        let store = Fixture::load(path).unwrap().into_store().unwrap();

        let vendors: Vec<&str> = store.vendors().iter().map(|v| v.as_str()).collect();
        assert_eq!(vendors, vec!["V1", "V2"]);
        assert_eq!(store.coupons().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = Fixture::load("/nonexistent/souq-fixture.toml").unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }
}
