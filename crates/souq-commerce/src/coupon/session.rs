//! Per-cart coupon state.

use serde::Serialize;

use crate::cart::CartLineItem;
use crate::coupon::{Coupon, CouponApplicationResult, CouponApplier};
use crate::error::CommerceError;
use crate::money::Money;

/// Where the cart's coupon currently stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CouponState {
    /// No coupon; `error` holds the message of the last failed attempt.
    NoCoupon { error: Option<String> },
    /// A code is being verified.
    Applying { code: String },
    /// A coupon is applied.
    Applied { coupon: Coupon, discount: Money },
}

impl CouponState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponState::NoCoupon { .. } => "no_coupon",
            CouponState::Applying { .. } => "applying",
            CouponState::Applied { .. } => "applied",
        }
    }
}

impl Default for CouponState {
    fn default() -> Self {
        CouponState::NoCoupon { error: None }
    }
}

/// Handle for one in-flight verification.
///
/// Only the ticket issued by the latest [`CouponSession::begin`] can complete
/// the session. A later `begin()` or `remove()` invalidates outstanding tickets.
#[derive(Debug, PartialEq, Eq)]
pub struct ApplyTicket {
    generation: u64,
    code: String,
}

impl ApplyTicket {
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Coupon state machine for one cart.
#[derive(Debug, Clone, Default)]
pub struct CouponSession {
    state: CouponState,
    generation: u64,
}

impl CouponSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CouponState {
        &self.state
    }

    /// The applied coupon, if any.
    pub fn coupon(&self) -> Option<&Coupon> {
        match &self.state {
            CouponState::Applied { coupon, .. } => Some(coupon),
            _ => None,
        }
    }

    /// The applied discount, if any.
    pub fn discount(&self) -> Option<Money> {
        match &self.state {
            CouponState::Applied { discount, .. } => Some(*discount),
            _ => None,
        }
    }

    /// Message of the last failed attempt.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            CouponState::NoCoupon { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Start verifying `code`.
    ///
    /// Refused while a coupon is applied. Starting over while another attempt
    /// is in flight supersedes it; the older ticket can no longer complete.
    pub fn begin(&mut self, code: &str) -> Result<ApplyTicket, CommerceError> {
        if matches!(self.state, CouponState::Applied { .. }) {
            return Err(CommerceError::InvalidCouponTransition {
                from: self.state.as_str().to_string(),
                to: "applying".to_string(),
            });
        }

        self.generation += 1;
        self.state = CouponState::Applying {
            code: code.to_string(),
        };
        Ok(ApplyTicket {
            generation: self.generation,
            code: code.to_string(),
        })
    }

    /// Finish the attempt identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched if the ticket is stale.
    pub fn complete(&mut self, ticket: ApplyTicket, result: &CouponApplicationResult) -> bool {
        let current = ticket.generation == self.generation
            && matches!(self.state, CouponState::Applying { .. });
        if !current {
            return false;
        }

        self.state = match result {
            CouponApplicationResult::Applied { coupon, discount } => CouponState::Applied {
                coupon: coupon.clone(),
                discount: *discount,
            },
            CouponApplicationResult::Rejected { failure } => CouponState::NoCoupon {
                error: Some(failure.message()),
            },
        };
        true
    }

    /// Drop the coupon and any in-flight attempt. Local only.
    pub fn remove(&mut self) {
        self.generation += 1;
        self.state = CouponState::default();
    }

    /// Verify `code` through `applier` and record the outcome.
    pub async fn apply(
        &mut self,
        applier: &CouponApplier,
        code: &str,
        items: &[CartLineItem],
        subtotal: Money,
    ) -> Result<CouponApplicationResult, CommerceError> {
        let ticket = self.begin(code)?;
        let result = applier.apply(ticket.code(), items, subtotal).await;
        self.complete(ticket, &result);
        Ok(result)
    }

    /// Subtotal after the applied discount, never below zero.
    pub fn apply_to(&self, subtotal: Money) -> Result<Money, CommerceError> {
        match self.discount() {
            Some(discount) => {
                let total = subtotal.checked_sub(&discount)?;
                Ok(if total.is_negative() {
                    Money::zero(subtotal.currency)
                } else {
                    total
                })
            }
            None => Ok(subtotal),
        }
    }
}
