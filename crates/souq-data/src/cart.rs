//! Cart files.
//!
//! A JSON array of lines with unit prices in major currency units:
//!
//! ```json
//! [{ "product_id": "p-1", "vendor_id": "V1", "quantity": 2, "unit_price": 49.5 }]
//! ```

use serde::Deserialize;
use souq_commerce::cart::CartLineItem;
use souq_commerce::{Currency, Money, ProductId, VendorId};

use crate::fixture::FixtureError;

#[derive(Debug, Deserialize)]
struct CartRecord {
    product_id: String,
    #[serde(default)]
    vendor_id: Option<String>,
    #[serde(default)]
    is_free_shipping: bool,
    quantity: i64,
    unit_price: f64,
}

/// Parse a JSON cart into validated line items.
pub fn parse_cart_json(
    content: &str,
    currency: Currency,
) -> Result<Vec<CartLineItem>, FixtureError> {
    let records: Vec<CartRecord> = serde_json::from_str(content)?;
    records
        .into_iter()
        .map(|record| {
            let item = CartLineItem {
                product_id: ProductId::new(record.product_id),
                vendor_id: VendorId::parse_optional(record.vendor_id.as_deref()),
                is_free_shipping: record.is_free_shipping,
                quantity: record.quantity,
                unit_price: Money::from_decimal(record.unit_price, currency),
            };
            item.validate()?;
            Ok(item)
        })
        .collect()
}
