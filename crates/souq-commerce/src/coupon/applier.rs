//! Applying a shopper-entered coupon code to the cart.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::cart::CartLineItem;
use crate::coupon::{Coupon, CouponRejection, CouponVerdict};
use crate::error::StoreError;
use crate::money::Money;
use crate::store::CouponGateway;

/// Message shown when the shopper submits an empty code.
pub const MISSING_CODE_MESSAGE: &str = "Please enter a coupon code";

/// Message shown when the coupon service cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str = "Error verifying coupon code";

/// Why a coupon was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponFailure {
    /// Nothing left after trimming the code. The gateway was not called.
    MissingCode,
    /// The gateway refused the coupon.
    Rejected(CouponRejection),
    /// The gateway could not be reached.
    Unavailable(StoreError),
}

impl CouponFailure {
    /// User-facing explanation.
    pub fn message(&self) -> String {
        match self {
            CouponFailure::MissingCode => MISSING_CODE_MESSAGE.to_string(),
            CouponFailure::Rejected(reason) => reason.message(),
            CouponFailure::Unavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

/// Outcome of [`CouponApplier::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum CouponApplicationResult {
    Applied { coupon: Coupon, discount: Money },
    Rejected { failure: CouponFailure },
}

impl CouponApplicationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CouponApplicationResult::Applied { .. })
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        match self {
            CouponApplicationResult::Applied { coupon, .. } => Some(coupon),
            CouponApplicationResult::Rejected { .. } => None,
        }
    }

    pub fn discount(&self) -> Option<Money> {
        match self {
            CouponApplicationResult::Applied { discount, .. } => Some(*discount),
            CouponApplicationResult::Rejected { .. } => None,
        }
    }

    /// The failure message; `None` when the coupon was applied.
    pub fn message(&self) -> Option<String> {
        match self {
            CouponApplicationResult::Applied { .. } => None,
            CouponApplicationResult::Rejected { failure } => Some(failure.message()),
        }
    }
}

impl Serialize for CouponApplicationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CouponApplicationResult::Applied { coupon, discount } => {
                let mut state = serializer.serialize_struct("CouponApplicationResult", 3)?;
                state.serialize_field("ok", &true)?;
                state.serialize_field("coupon", coupon)?;
                state.serialize_field("discount", discount)?;
                state.end()
            }
            CouponApplicationResult::Rejected { failure } => {
                let mut state = serializer.serialize_struct("CouponApplicationResult", 2)?;
                state.serialize_field("ok", &false)?;
                state.serialize_field("message", &failure.message())?;
                state.end()
            }
        }
    }
}

/// Trim and upper-case a shopper-entered code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Validates coupon codes through a [`CouponGateway`].
#[derive(Clone)]
pub struct CouponApplier {
    gateway: Arc<dyn CouponGateway>,
}

impl CouponApplier {
    pub fn new(gateway: Arc<dyn CouponGateway>) -> Self {
        Self { gateway }
    }

    /// Apply `code` to the cart.
    ///
    /// Never fails: gateway errors become a [`CouponFailure::Unavailable`]
    /// result so the cart stays usable.
    #[tracing::instrument(skip(self, items, subtotal), fields(subtotal = %subtotal))]
    pub async fn apply(
        &self,
        code: &str,
        items: &[CartLineItem],
        subtotal: Money,
    ) -> CouponApplicationResult {
        let code = normalize_code(code);
        if code.is_empty() {
            return CouponApplicationResult::Rejected {
                failure: CouponFailure::MissingCode,
            };
        }

        match self.gateway.redeem(&code, items, subtotal).await {
            Ok(CouponVerdict::Accepted { coupon, discount }) => {
                debug!(code = %code, discount = %discount, "coupon applied");
                CouponApplicationResult::Applied { coupon, discount }
            }
            Ok(CouponVerdict::Rejected(reason)) => {
                debug!(code = %code, ?reason, "coupon rejected");
                CouponApplicationResult::Rejected {
                    failure: CouponFailure::Rejected(reason),
                }
            }
            Err(e) => {
                warn!(code = %code, error = %e, "coupon verification failed");
                CouponApplicationResult::Rejected {
                    failure: CouponFailure::Unavailable(e),
                }
            }
        }
    }
}

impl std::fmt::Debug for CouponApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponApplier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use crate::store::{MemoryStore, StoreCall};

    fn egp(amount: i64) -> Money {
        Money::from_major(amount, Currency::EGP)
    }

    fn applier(store: &Arc<MemoryStore>) -> CouponApplier {
        CouponApplier::new(store.clone())
    }

    #[tokio::test]
    async fn test_blank_code_skips_gateway() {
        let store = Arc::new(MemoryStore::new());
        let result = applier(&store).apply("   ", &[], egp(100)).await;

        assert!(!result.is_ok());
        assert_eq!(result.message().as_deref(), Some(MISSING_CODE_MESSAGE));
        assert_eq!(store.calls(StoreCall::Redeem), 0);
    }

    #[tokio::test]
    async fn test_code_is_normalized() {
        let store = Arc::new(MemoryStore::new().with_coupon(Coupon::percentage("SAVE10", 10.0)));
        let result = applier(&store).apply(" save10 ", &[], egp(100)).await;

        assert!(result.is_ok());
        assert_eq!(result.discount(), Some(egp(10)));
        assert_eq!(result.coupon().map(|c| c.code.as_str()), Some("SAVE10"));
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let store = Arc::new(MemoryStore::new());
        let result = applier(&store).apply("NOPE", &[], egp(100)).await;
        assert_eq!(result.message().as_deref(), Some("Invalid coupon code"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_fatal() {
        let store = Arc::new(MemoryStore::new().coupons_unavailable());
        let result = applier(&store).apply("SAVE10", &[], egp(100)).await;

        assert!(matches!(
            result,
            CouponApplicationResult::Rejected {
                failure: CouponFailure::Unavailable(_)
            }
        ));
        assert_eq!(result.message().as_deref(), Some(UNAVAILABLE_MESSAGE));
    }

    #[test]
    fn test_result_serialization() {
        let rejected = CouponApplicationResult::Rejected {
            failure: CouponFailure::MissingCode,
        };
        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["message"], MISSING_CODE_MESSAGE);

        let applied = CouponApplicationResult::Applied {
            coupon: Coupon::percentage("SAVE10", 10.0),
            discount: egp(10),
        };
        let json = serde_json::to_value(&applied).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["discount"]["amount_minor"], 1000);
        assert_eq!(json["coupon"]["code"], "SAVE10");
    }
}
