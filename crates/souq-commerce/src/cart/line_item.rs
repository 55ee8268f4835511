//! Cart line items as seen by shipping and coupon logic.

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{ProductId, VendorId};
use crate::money::{Currency, Money};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product identifier.
    pub product_id: ProductId,
    /// Owning vendor; `None` for platform-owned products.
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    /// Whether the product ships for free.
    #[serde(default)]
    pub is_free_shipping: bool,
    /// Quantity (positive).
    pub quantity: i64,
    /// Unit price (non-negative).
    pub unit_price: Money,
}

impl CartLineItem {
    /// Create a platform-owned line item.
    ///
    /// Returns an error if the quantity is not positive, exceeds
    /// [`MAX_QUANTITY_PER_ITEM`], or the price is negative.
    pub fn new(
        product_id: impl Into<ProductId>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, CommerceError> {
        let item = Self {
            product_id: product_id.into(),
            vendor_id: None,
            is_free_shipping: false,
            quantity,
            unit_price,
        };
        item.validate()?;
        Ok(item)
    }

    /// Set the owning vendor. Blank ids leave the item platform-owned.
    pub fn with_vendor(mut self, vendor_id: impl AsRef<str>) -> Self {
        self.vendor_id = VendorId::parse_optional(Some(vendor_id.as_ref()));
        self
    }

    /// Mark the product as free-shipping.
    pub fn with_free_shipping(mut self, free: bool) -> Self {
        self.is_free_shipping = free;
        self
    }

    /// Check quantity and price bounds.
    ///
    /// Items built through [`CartLineItem::new`] are already valid; call this
    /// on items deserialized from outside.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(self.quantity));
        }
        if self.quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::InvalidQuantity(self.quantity));
        }
        if self.unit_price.is_negative() {
            return Err(CommerceError::InvalidPrice(format!(
                "unit price {} for product {}",
                self.unit_price, self.product_id
            )));
        }
        Ok(())
    }

    /// The owning vendor, treating a blank id as no vendor.
    pub fn vendor(&self) -> Option<&VendorId> {
        self.vendor_id
            .as_ref()
            .filter(|id| !id.as_str().trim().is_empty())
    }

    /// unit_price * quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Sum of all line totals.
pub fn cart_subtotal(items: &[CartLineItem], currency: Currency) -> Result<Money, CommerceError> {
    items.iter().try_fold(Money::zero(currency), |acc, item| {
        acc.checked_add(&item.line_total()?)
    })
}
