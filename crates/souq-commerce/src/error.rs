//! Commerce error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the persistence collaborator.
///
/// A missing record is never a `StoreError`; lookups return `Ok(None)` for
/// that. These variants are transport or backend failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The lookup did not finish in time.
    #[error("Store lookup '{lookup}' timed out after {after:?}")]
    Timeout { lookup: String, after: Duration },

    /// The backend answered with an error.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors that can occur in shipping and coupon operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Invalid (negative) price or cost.
    #[error("Invalid amount: {0}")]
    InvalidPrice(String),

    /// Empty or malformed shipping zone.
    #[error("Invalid shipping zone: {0:?}")]
    InvalidZone(String),

    /// A second rate for the same vendor and zone.
    #[error("Shipping rate already exists for vendor {vendor} in zone {zone}")]
    DuplicateShippingRate { vendor: String, zone: String },

    /// No policy in the chain produced a charge for a vendor group.
    #[error("No shipping policy matched group {0}")]
    ShippingUnresolved(String),

    /// Invalid coupon session state transition.
    #[error("Invalid coupon transition from {from} to {to}")]
    InvalidCouponTransition { from: String, to: String },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Persistence collaborator failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Whether the error came from the persistence collaborator.
    pub fn is_transport(&self) -> bool {
        matches!(self, CommerceError::Store(_))
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
