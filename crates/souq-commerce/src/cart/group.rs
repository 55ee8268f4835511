//! Partitioning cart lines by owning vendor.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::cart::CartLineItem;
use crate::ids::VendorId;

/// The cart lines attributable to one vendor, or to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "owner", rename_all = "snake_case")]
pub enum VendorGroup {
    /// Platform-owned products (no vendor).
    Platform { items: Vec<CartLineItem> },
    /// Products sold by one vendor.
    Vendor {
        vendor_id: VendorId,
        items: Vec<CartLineItem>,
    },
}

impl VendorGroup {
    /// The vendor, or `None` for the platform group.
    pub fn vendor_id(&self) -> Option<&VendorId> {
        match self {
            VendorGroup::Platform { .. } => None,
            VendorGroup::Vendor { vendor_id, .. } => Some(vendor_id),
        }
    }

    /// Lines in this group, in cart order.
    pub fn items(&self) -> &[CartLineItem] {
        match self {
            VendorGroup::Platform { items } | VendorGroup::Vendor { items, .. } => items,
        }
    }

    /// Whether any line in the group ships for free.
    pub fn has_free_shipping_item(&self) -> bool {
        self.items().iter().any(|item| item.is_free_shipping)
    }

    fn push(&mut self, item: CartLineItem) {
        match self {
            VendorGroup::Platform { items } | VendorGroup::Vendor { items, .. } => items.push(item),
        }
    }
}

impl fmt::Display for VendorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorGroup::Platform { .. } => write!(f, "platform"),
            VendorGroup::Vendor { vendor_id, .. } => write!(f, "vendor:{}", vendor_id),
        }
    }
}

/// Group cart lines by vendor, keeping groups in first-seen order.
pub fn group_by_vendor(items: &[CartLineItem]) -> Vec<VendorGroup> {
    let mut groups: Vec<VendorGroup> = Vec::new();
    let mut index: HashMap<Option<&VendorId>, usize> = HashMap::new();

    for item in items {
        let key = item.vendor();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(match key {
                None => VendorGroup::Platform { items: Vec::new() },
                Some(vendor_id) => VendorGroup::Vendor {
                    vendor_id: vendor_id.clone(),
                    items: Vec::new(),
                },
            });
            groups.len() - 1
        });
        groups[slot].push(item.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};

    fn line(product: &str, vendor: Option<&str>) -> CartLineItem {
        let item = CartLineItem::new(product, 1, Money::from_major(10, Currency::EGP)).unwrap();
        match vendor {
            Some(v) => item.with_vendor(v),
            None => item,
        }
    }

    #[test]
    fn test_empty_cart_has_no_groups() {
        assert!(group_by_vendor(&[]).is_empty());
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let items = vec![
            line("p-1", Some("V2")),
            line("p-2", None),
            line("p-3", Some("V1")),
            line("p-4", Some("V2")),
        ];
        let groups = group_by_vendor(&items);

        let owners: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
        assert_eq!(owners, vec!["vendor:V2", "platform", "vendor:V1"]);
        assert_eq!(groups[0].items().len(), 2);
        assert_eq!(groups[0].items()[1].product_id.as_str(), "p-4");
    }

    #[test]
    fn test_blank_vendor_joins_platform_group() {
        let items = vec![line("p-1", None), line("p-2", Some(" "))];
        let groups = group_by_vendor(&items);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].vendor_id(), None);
        assert_eq!(groups[0].items().len(), 2);
    }

    #[test]
    fn test_free_shipping_detection() {
        let items = vec![
            line("p-1", Some("V1")),
            line("p-2", Some("V1")).with_free_shipping(true),
        ];
        let groups = group_by_vendor(&items);
        assert!(groups[0].has_free_shipping_item());
    }
}
