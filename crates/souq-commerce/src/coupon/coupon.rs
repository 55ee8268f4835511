//! Coupon records and eligibility rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::error::CommerceError;
use crate::ids::{CouponId, ProductId, VendorId};
use crate::money::Money;

/// Value of the coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CouponValue {
    /// Percentage off (0.0 - 100.0).
    Percentage(f64),
    /// Fixed amount off.
    Fixed(Money),
}

impl CouponValue {
    /// Discount for an eligible amount.
    ///
    /// Percentages are clamped to 0-100 and fixed amounts never exceed the
    /// eligible amount.
    pub fn calculate(&self, eligible: &Money) -> Money {
        match self {
            CouponValue::Percentage(percent) => eligible.percentage(percent.clamp(0.0, 100.0)),
            CouponValue::Fixed(amount) => amount.min(*eligible),
        }
    }
}

/// Which cart lines a coupon applies to.
///
/// Empty lists on both sides mean the coupon applies to the whole cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CouponScope {
    #[serde(default)]
    pub products: Vec<ProductId>,
    #[serde(default)]
    pub vendors: Vec<VendorId>,
}

impl CouponScope {
    /// Whether the coupon is restricted to some products or vendors.
    pub fn is_restricted(&self) -> bool {
        !self.products.is_empty() || !self.vendors.is_empty()
    }

    /// Whether a cart line falls inside the scope.
    pub fn covers(&self, item: &CartLineItem) -> bool {
        if !self.is_restricted() {
            return true;
        }
        self.products.contains(&item.product_id)
            || item.vendor().is_some_and(|v| self.vendors.contains(v))
    }
}

/// A coupon definition as stored by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Coupon identifier, the upper-cased code.
    pub id: CouponId,
    /// Code entered by the shopper (matched case-insensitively).
    pub code: String,
    /// Value of the discount.
    pub value: CouponValue,
    /// Products or vendors the coupon is limited to.
    #[serde(default)]
    pub scope: CouponScope,
    /// Minimum cart subtotal.
    #[serde(default)]
    pub minimum_purchase: Option<Money>,
    /// Maximum number of uses (None = unlimited).
    #[serde(default)]
    pub usage_limit: Option<i64>,
    /// Current usage count.
    #[serde(default)]
    pub usage_count: i64,
    /// Start of the validity window.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the validity window.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Whether the coupon is enabled.
    pub active: bool,
}

impl Coupon {
    /// Create a new percentage coupon.
    pub fn percentage(code: impl Into<String>, percent: f64) -> Self {
        Self::with_value(code, CouponValue::Percentage(percent))
    }

    /// Create a new fixed amount coupon.
    pub fn fixed_amount(code: impl Into<String>, amount: Money) -> Self {
        Self::with_value(code, CouponValue::Fixed(amount))
    }

    fn with_value(code: impl Into<String>, value: CouponValue) -> Self {
        let code = code.into();
        Self {
            id: CouponId::new(code.trim().to_uppercase()),
            code,
            value,
            scope: CouponScope::default(),
            minimum_purchase: None,
            usage_limit: None,
            usage_count: 0,
            starts_at: None,
            ends_at: None,
            active: true,
        }
    }

    /// Add a minimum purchase condition.
    pub fn with_minimum_purchase(mut self, amount: Money) -> Self {
        self.minimum_purchase = Some(amount);
        self
    }

    /// Add a usage limit.
    pub fn with_usage_limit(mut self, limit: i64) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Set the start of the validity window.
    pub fn starts_at(mut self, at: DateTime<Utc>) -> Self {
        self.starts_at = Some(at);
        self
    }

    /// Set expiration date.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.ends_at = Some(at);
        self
    }

    /// Limit the coupon to the given vendors.
    pub fn for_vendors(mut self, vendors: impl IntoIterator<Item = VendorId>) -> Self {
        self.scope.vendors.extend(vendors);
        self
    }

    /// Limit the coupon to the given products.
    pub fn for_products(mut self, products: impl IntoIterator<Item = ProductId>) -> Self {
        self.scope.products.extend(products);
        self
    }

    /// Case-insensitive code comparison.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.trim().eq_ignore_ascii_case(code.trim())
    }

    /// Check if the usage cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.usage_count >= limit)
            .unwrap_or(false)
    }

    /// Decide whether the coupon applies to this cart at `now`, and for how much.
    pub fn evaluate(
        &self,
        items: &[CartLineItem],
        subtotal: Money,
        now: DateTime<Utc>,
    ) -> Result<CouponVerdict, CommerceError> {
        if !self.active {
            return Ok(CouponVerdict::Rejected(CouponRejection::Inactive));
        }
        if self.starts_at.is_some_and(|starts| now < starts) {
            return Ok(CouponVerdict::Rejected(CouponRejection::NotStarted));
        }
        if self.ends_at.is_some_and(|ends| now > ends) {
            return Ok(CouponVerdict::Rejected(CouponRejection::Expired));
        }
        if self.is_exhausted() {
            return Ok(CouponVerdict::Rejected(CouponRejection::UsageLimitReached));
        }
        if let Some(minimum) = self.minimum_purchase {
            if subtotal.checked_sub(&minimum)?.is_negative() {
                return Ok(CouponVerdict::Rejected(
                    CouponRejection::MinimumPurchaseNotMet { minimum },
                ));
            }
        }

        let eligible = if self.scope.is_restricted() {
            let covered: Vec<&CartLineItem> =
                items.iter().filter(|item| self.scope.covers(item)).collect();
            if covered.is_empty() {
                return Ok(CouponVerdict::Rejected(CouponRejection::NotApplicable));
            }
            covered.iter().try_fold(Money::zero(subtotal.currency), |acc, item| {
                acc.checked_add(&item.line_total()?)
            })?
        } else {
            subtotal
        };

        if let CouponValue::Fixed(amount) = &self.value {
            if amount.currency != eligible.currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: eligible.currency.code().to_string(),
                    got: amount.currency.code().to_string(),
                });
            }
        }

        Ok(CouponVerdict::Accepted {
            discount: self.value.calculate(&eligible),
            coupon: self.clone(),
        })
    }
}

/// Why the collaborator refused a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CouponRejection {
    /// No coupon with that code.
    NotFound,
    /// Coupon disabled.
    Inactive,
    /// Validity window has not opened yet.
    NotStarted,
    /// Validity window has closed.
    Expired,
    /// Usage cap reached.
    UsageLimitReached,
    /// Cart subtotal below the coupon minimum.
    MinimumPurchaseNotMet { minimum: Money },
    /// No line in the cart is covered by the coupon scope.
    NotApplicable,
    /// Any other reason the collaborator reports.
    Other { message: String },
}

impl CouponRejection {
    /// User-facing explanation.
    pub fn message(&self) -> String {
        match self {
            CouponRejection::NotFound => "Invalid coupon code".to_string(),
            CouponRejection::Inactive => "This coupon is no longer active".to_string(),
            CouponRejection::NotStarted => "This coupon is not valid yet".to_string(),
            CouponRejection::Expired => "This coupon has expired".to_string(),
            CouponRejection::UsageLimitReached => {
                "This coupon has reached its usage limit".to_string()
            }
            CouponRejection::MinimumPurchaseNotMet { minimum } => {
                format!("A minimum purchase of {} is required", minimum)
            }
            CouponRejection::NotApplicable => {
                "This coupon does not apply to the items in your cart".to_string()
            }
            CouponRejection::Other { message } => message.clone(),
        }
    }
}

/// Collaborator answer for a coupon redemption attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponVerdict {
    /// The coupon applies; `discount` is a flat amount in the subtotal's currency.
    Accepted { coupon: Coupon, discount: Money },
    /// The coupon does not apply.
    Rejected(CouponRejection),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use chrono::{Duration, TimeZone};

    fn egp(amount: i64) -> Money {
        Money::from_major(amount, Currency::EGP)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn cart() -> Vec<CartLineItem> {
        vec![
            CartLineItem::new("p-1", 2, egp(30)).unwrap().with_vendor("V1"),
            CartLineItem::new("p-2", 1, egp(40)).unwrap().with_vendor("V2"),
        ]
    }

    fn discount_of(verdict: CouponVerdict) -> Money {
        match verdict {
            CouponVerdict::Accepted { discount, .. } => discount,
            CouponVerdict::Rejected(reason) => panic!("unexpected rejection: {:?}", reason),
        }
    }

    fn rejection_of(verdict: CouponVerdict) -> CouponRejection {
        match verdict {
            CouponVerdict::Rejected(reason) => reason,
            CouponVerdict::Accepted { .. } => panic!("coupon unexpectedly accepted"),
        }
    }

    #[test]
    fn test_id_is_normalized_code() {
        let coupon = Coupon::percentage(" save10 ", 10.0);
        assert_eq!(coupon.id, CouponId::new("SAVE10"));
    }

    #[test]
    fn test_percentage_coupon() {
        let coupon = Coupon::percentage("SAVE10", 10.0);
        let verdict = coupon.evaluate(&cart(), egp(100), now()).unwrap();
        assert_eq!(discount_of(verdict), egp(10));
    }

    #[test]
    fn test_fixed_coupon_capped_at_eligible_amount() {
        let coupon = Coupon::fixed_amount("BIG", egp(500));
        let verdict = coupon.evaluate(&cart(), egp(100), now()).unwrap();
        assert_eq!(discount_of(verdict), egp(100));
    }

    #[test]
    fn test_vendor_scope_limits_eligible_amount() {
        let coupon = Coupon::percentage("V1ONLY", 50.0).for_vendors([VendorId::new("V1")]);
        let verdict = coupon.evaluate(&cart(), egp(100), now()).unwrap();
        // Only V1's 2 x 30 is eligible.
        assert_eq!(discount_of(verdict), egp(30));
    }

    #[test]
    fn test_scope_without_matching_lines() {
        let coupon = Coupon::percentage("P9", 10.0).for_products([ProductId::new("p-9")]);
        let verdict = coupon.evaluate(&cart(), egp(100), now()).unwrap();
        assert_eq!(rejection_of(verdict), CouponRejection::NotApplicable);
    }

    #[test]
    fn test_validity_window() {
        let expired = Coupon::percentage("OLD", 10.0).expires_at(now() - Duration::days(1));
        assert_eq!(
            rejection_of(expired.evaluate(&cart(), egp(100), now()).unwrap()),
            CouponRejection::Expired
        );

        let future = Coupon::percentage("SOON", 10.0).starts_at(now() + Duration::days(1));
        assert_eq!(
            rejection_of(future.evaluate(&cart(), egp(100), now()).unwrap()),
            CouponRejection::NotStarted
        );
    }

    #[test]
    fn test_usage_limit() {
        let mut coupon = Coupon::percentage("TEST", 10.0).with_usage_limit(5);
        coupon.usage_count = 4;
        assert!(matches!(
            coupon.evaluate(&cart(), egp(100), now()).unwrap(),
            CouponVerdict::Accepted { .. }
        ));

        coupon.usage_count = 5;
        assert_eq!(
            rejection_of(coupon.evaluate(&cart(), egp(100), now()).unwrap()),
            CouponRejection::UsageLimitReached
        );
    }

    #[test]
    fn test_minimum_purchase() {
        let coupon = Coupon::percentage("MIN", 10.0).with_minimum_purchase(egp(150));
        assert_eq!(
            rejection_of(coupon.evaluate(&cart(), egp(100), now()).unwrap()),
            CouponRejection::MinimumPurchaseNotMet { minimum: egp(150) }
        );
    }

    #[test]
    fn test_inactive() {
        let mut coupon = Coupon::percentage("OFF", 10.0);
        coupon.active = false;
        assert_eq!(
            rejection_of(coupon.evaluate(&cart(), egp(100), now()).unwrap()),
            CouponRejection::Inactive
        );
    }

    #[test]
    fn test_code_match_is_case_insensitive() {
        let coupon = Coupon::percentage("Save10", 10.0);
        assert!(coupon.matches_code("SAVE10"));
        assert!(coupon.matches_code(" save10 "));
        assert!(!coupon.matches_code("SAVE1"));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(CouponRejection::NotFound.message(), "Invalid coupon code");
        assert_eq!(
            CouponRejection::Other { message: "Members only".into() }.message(),
            "Members only"
        );
    }
}
