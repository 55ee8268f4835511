//! Cart module.
//!
//! Contains cart line items and vendor grouping.

mod group;
mod line_item;

pub use group::{group_by_vendor, VendorGroup};
pub use line_item::{cart_subtotal, CartLineItem, MAX_QUANTITY_PER_ITEM};
