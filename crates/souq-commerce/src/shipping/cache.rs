//! Quote memoization.
//!
//! A quote only depends on the cart contents, the zone, and the store. The
//! [`QuoteCache`] reuses quotes for identical carts; [`QuoteSlot`] keeps a
//! screen from showing a quote computed for a cart it no longer holds.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use crate::cart::CartLineItem;
use crate::error::CommerceError;
use crate::ids::{ProductId, VendorId};
use crate::money::Money;
use crate::shipping::{ShippingCalculator, ShippingResult};
use crate::zone::Zone;

/// Default number of cached quotes.
pub const DEFAULT_QUOTE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct SnapshotLine {
    product_id: ProductId,
    vendor_id: Option<VendorId>,
    is_free_shipping: bool,
    quantity: i64,
    amount_minor: i64,
    currency: &'static str,
}

/// Identity of a quote: the cart contents (line order ignored) plus zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    zone: Zone,
    lines: Vec<SnapshotLine>,
}

impl QuoteKey {
    pub fn new(items: &[CartLineItem], zone: &Zone) -> Self {
        let mut lines: Vec<SnapshotLine> = items
            .iter()
            .map(|item| SnapshotLine {
                product_id: item.product_id.clone(),
                vendor_id: item.vendor().cloned(),
                is_free_shipping: item.is_free_shipping,
                quantity: item.quantity,
                amount_minor: item.unit_price.amount_minor,
                currency: item.unit_price.currency.code(),
            })
            .collect();
        lines.sort();
        Self {
            zone: zone.clone(),
            lines,
        }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Short hash of the key, for logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<QuoteKey, ShippingResult>,
    order: VecDeque<QuoteKey>,
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded memo of shipping quotes. Oldest entries are evicted first.
#[derive(Debug)]
pub struct QuoteCache {
    inner: RwLock<CacheInner>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_CAPACITY)
    }
}

impl QuoteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, key: &QuoteKey) -> Option<ShippingResult> {
        self.inner.read().await.entries.get(key).cloned()
    }

    pub async fn insert(&self, key: QuoteKey, result: ShippingResult) {
        let mut inner = self.inner.write().await;
        if inner.entries.insert(key.clone(), result).is_some() {
            return;
        }
        inner.order.push_back(key);
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }

    /// Cached quote for `items`, or a fresh one from `calculator`.
    ///
    /// Failed calculations are not cached.
    pub async fn quote(
        &self,
        calculator: &ShippingCalculator,
        items: &[CartLineItem],
        zone: &Zone,
    ) -> Result<ShippingResult, CommerceError> {
        let key = QuoteKey::new(items, zone);
        if let Some(result) = self.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key.fingerprint(), "quote cache hit");
            return Ok(result);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key.fingerprint(), "quote cache miss");
        let result = calculator.calculate(items, zone).await?;
        self.insert(key, result.clone()).await;
        Ok(result)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Holds the quote for the most recently requested cart.
///
/// Results for any other key are refused, so a slow quote for an old cart
/// cannot overwrite the current one.
#[derive(Debug, Default)]
pub struct QuoteSlot {
    requested: Option<QuoteKey>,
    current: Option<ShippingResult>,
}

impl QuoteSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a quote for `items`/`zone` is wanted. Clears the shown quote.
    pub fn request(&mut self, items: &[CartLineItem], zone: &Zone) -> QuoteKey {
        let key = QuoteKey::new(items, zone);
        self.requested = Some(key.clone());
        self.current = None;
        key
    }

    /// Offer a finished quote. Returns `false` if `key` is no longer wanted.
    pub fn offer(&mut self, key: &QuoteKey, result: ShippingResult) -> bool {
        if self.requested.as_ref() != Some(key) {
            debug!(key = %key.fingerprint(), "stale quote dropped");
            return false;
        }
        self.current = Some(result);
        true
    }

    pub fn current(&self) -> Option<&ShippingResult> {
        self.current.as_ref()
    }

    /// Total of the current quote, if any.
    pub fn total(&self) -> Option<Money> {
        self.current.as_ref().map(|r| r.total_shipping())
    }
}
