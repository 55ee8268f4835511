//! Newtype IDs for type-safe identifiers.
//!
//! Keeps product, vendor and coupon identifiers from being mixed up, e.g.
//! passing a `ProductId` where a `VendorId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(ProductId);
define_id!(VendorId);
define_id!(CouponId);

impl VendorId {
    /// Parse an optional raw vendor reference.
    ///
    /// Blank strings mean "no vendor" (a platform-owned product).
    pub fn parse_optional(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(VendorId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = VendorId::new("vendor-123");
        assert_eq!(id.as_str(), "vendor-123");
    }

    #[test]
    fn test_id_conversions() {
        assert_eq!(CouponId::from("SAVE10"), CouponId::new(String::from("SAVE10")));
        assert_eq!(ProductId::from("p-1").to_string(), "p-1");
    }

    #[test]
    fn test_vendor_parse_optional() {
        assert_eq!(VendorId::parse_optional(Some("V1")), Some(VendorId::new("V1")));
        assert_eq!(VendorId::parse_optional(Some("  V1 ")), Some(VendorId::new("V1")));
        assert_eq!(VendorId::parse_optional(Some("")), None);
        assert_eq!(VendorId::parse_optional(Some("   ")), None);
        assert_eq!(VendorId::parse_optional(None), None);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ProductId::new("p-1")).unwrap();
        assert_eq!(json, "\"p-1\"");
    }
}
