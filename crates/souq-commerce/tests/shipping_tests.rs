//! End-to-end shipping quotes against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use souq_commerce::prelude::*;
use souq_commerce::store::StoreCall;

fn egp(amount: i64) -> Money {
    Money::from_major(amount, Currency::EGP)
}

fn cairo() -> Zone {
    Zone::new("cairo").unwrap()
}

fn vendor_line(product: &str, vendor: &str) -> CartLineItem {
    CartLineItem::new(product, 1, egp(100)).unwrap().with_vendor(vendor)
}

fn platform_line(product: &str) -> CartLineItem {
    CartLineItem::new(product, 1, egp(100)).unwrap()
}

fn breakdown_of(result: &ShippingResult) -> Vec<(Option<&str>, Money, ShippingReason)> {
    result
        .breakdown()
        .iter()
        .map(|b| (b.vendor_id.as_ref().map(|v| v.as_str()), b.cost, b.reason))
        .collect()
}

#[tokio::test]
async fn test_vendor_without_rate_or_profile_pays_flat_rate() {
    let calculator = ShippingCalculator::new(Arc::new(MemoryStore::new()));

    let result = calculator
        .calculate(&[vendor_line("p-1", "V1")], &cairo())
        .await
        .unwrap();

    assert_eq!(result.total_shipping(), egp(25));
    assert_eq!(
        breakdown_of(&result),
        vec![(Some("V1"), egp(25), ShippingReason::DefaultRate)]
    );
}

#[tokio::test]
async fn test_zone_rate_applies() {
    let store = MemoryStore::new().with_rate("V1", "cairo", egp(15)).unwrap();
    let calculator = ShippingCalculator::new(Arc::new(store));

    let result = calculator
        .calculate(&[vendor_line("p-1", "V1")], &cairo())
        .await
        .unwrap();

    assert_eq!(result.total_shipping(), egp(15));
    assert_eq!(result.breakdown()[0].reason, ShippingReason::ZoneRate);
}

#[tokio::test]
async fn test_free_product_beats_zone_rate() {
    let store = Arc::new(MemoryStore::new().with_rate("V1", "cairo", egp(15)).unwrap());
    let calculator = ShippingCalculator::new(store.clone());

    let result = calculator
        .calculate(
            &[vendor_line("p-1", "V1").with_free_shipping(true)],
            &cairo(),
        )
        .await
        .unwrap();

    assert_eq!(result.total_shipping(), egp(0));
    assert_eq!(result.breakdown()[0].reason, ShippingReason::FreeProduct);
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_platform_item_pays_flat_rate() {
    let store = Arc::new(MemoryStore::new().with_rate("V1", "cairo", egp(5)).unwrap());
    let calculator = ShippingCalculator::new(store.clone());

    let result = calculator
        .calculate(&[platform_line("p-1")], &cairo())
        .await
        .unwrap();

    assert_eq!(
        breakdown_of(&result),
        vec![(None, egp(25), ShippingReason::DefaultRate)]
    );
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_zero_zone_rate_keeps_its_reason() {
    let store = MemoryStore::new().with_rate("V1", "cairo", egp(0)).unwrap();
    let calculator = ShippingCalculator::new(Arc::new(store));

    let result = calculator
        .calculate(&[vendor_line("p-1", "V1")], &cairo())
        .await
        .unwrap();

    assert_eq!(result.total_shipping(), egp(0));
    assert_eq!(result.breakdown()[0].reason, ShippingReason::ZoneRate);
}

#[tokio::test]
async fn test_one_free_item_frees_whole_vendor_group() {
    let store = MemoryStore::new().with_rate("V1", "cairo", egp(15)).unwrap();
    let calculator = ShippingCalculator::new(Arc::new(store));

    let items = vec![
        vendor_line("p-1", "V1"),
        vendor_line("p-2", "V1").with_free_shipping(true),
        vendor_line("p-3", "V2"),
    ];
    let result = calculator.calculate(&items, &cairo()).await.unwrap();

    assert_eq!(
        breakdown_of(&result),
        vec![
            (Some("V1"), egp(0), ShippingReason::FreeProduct),
            (Some("V2"), egp(25), ShippingReason::DefaultRate),
        ]
    );
}

#[tokio::test]
async fn test_fallback_chain() {
    let store = MemoryStore::new()
        .with_profile("ONLY_PROFILE", Some(egp(30)))
        .unwrap()
        .with_profile("EMPTY_PROFILE", None)
        .unwrap()
        .with_rate("BOTH", "cairo", egp(12))
        .unwrap()
        .with_profile("BOTH", Some(egp(40)))
        .unwrap();
    let calculator = ShippingCalculator::new(Arc::new(store));

    let items = vec![
        vendor_line("p-1", "NOTHING"),
        vendor_line("p-2", "ONLY_PROFILE"),
        vendor_line("p-3", "EMPTY_PROFILE"),
        vendor_line("p-4", "BOTH"),
    ];
    let result = calculator.calculate(&items, &cairo()).await.unwrap();

    assert_eq!(
        breakdown_of(&result),
        vec![
            (Some("NOTHING"), egp(25), ShippingReason::DefaultRate),
            (Some("ONLY_PROFILE"), egp(30), ShippingReason::DefaultRate),
            (Some("EMPTY_PROFILE"), egp(25), ShippingReason::DefaultRate),
            (Some("BOTH"), egp(12), ShippingReason::ZoneRate),
        ]
    );
    assert_eq!(result.total_shipping(), egp(92));
}

#[tokio::test]
async fn test_rate_for_other_zone_is_ignored() {
    let store = MemoryStore::new()
        .with_rate("V1", "giza", egp(10))
        .unwrap()
        .with_profile("V1", Some(egp(35)))
        .unwrap();
    let calculator = ShippingCalculator::new(Arc::new(store));

    let result = calculator
        .calculate(&[vendor_line("p-1", "V1")], &cairo())
        .await
        .unwrap();
    assert_eq!(result.total_shipping(), egp(35));
}

#[tokio::test]
async fn test_mixed_cart_sum_and_order() {
    let store = MemoryStore::new()
        .with_rate("V2", "cairo", egp(18))
        .unwrap();
    let calculator = ShippingCalculator::new(Arc::new(store));

    let items = vec![
        vendor_line("p-1", "V2"),
        platform_line("p-2"),
        vendor_line("p-3", "V1"),
        vendor_line("p-4", "V2"),
        platform_line("p-5"),
    ];
    let result = calculator.calculate(&items, &cairo()).await.unwrap();

    let owners: Vec<Option<&str>> = breakdown_of(&result).iter().map(|b| b.0).collect();
    assert_eq!(owners, vec![Some("V2"), None, Some("V1")]);

    let sum = Money::sum(result.breakdown().iter().map(|b| &b.cost), Currency::EGP).unwrap();
    assert_eq!(result.total_shipping(), sum);
    assert_eq!(sum, egp(68));
}

#[tokio::test]
async fn test_calculate_is_idempotent() {
    let store = MemoryStore::new()
        .with_rate("V1", "cairo", egp(15))
        .unwrap()
        .with_profile("V2", Some(egp(30)))
        .unwrap();
    let calculator = ShippingCalculator::new(Arc::new(store));
    let items = vec![vendor_line("p-1", "V1"), vendor_line("p-2", "V2"), platform_line("p-3")];

    let first = calculator.calculate(&items, &cairo()).await.unwrap();
    let second = calculator.calculate(&items, &cairo()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fan_out_matches_sequential() {
    let store: Arc<MemoryStore> = Arc::new(
        MemoryStore::new()
            .with_rate("V1", "cairo", egp(15))
            .unwrap()
            .with_profile("V3", Some(egp(33)))
            .unwrap()
            .with_latency(Duration::from_millis(5)),
    );
    let items = vec![
        vendor_line("p-1", "V3"),
        vendor_line("p-2", "V1"),
        platform_line("p-3"),
        vendor_line("p-4", "V2").with_free_shipping(true),
    ];

    let concurrent = ShippingCalculator::new(store.clone()).with_fan_out(true);
    let sequential = ShippingCalculator::new(store).with_fan_out(false);

    assert_eq!(
        concurrent.calculate(&items, &cairo()).await.unwrap(),
        sequential.calculate(&items, &cairo()).await.unwrap()
    );
}

#[tokio::test]
async fn test_transport_failure_fails_whole_quote() {
    let store = MemoryStore::new()
        .with_rate("V1", "cairo", egp(15))
        .unwrap()
        .failing_vendor("V2");
    let calculator = ShippingCalculator::new(Arc::new(store));

    let items = vec![vendor_line("p-1", "V1"), vendor_line("p-2", "V2"), platform_line("p-3")];
    let err = calculator.calculate(&items, &cairo()).await.unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(err, CommerceError::Store(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn test_quote_cache_misses_on_changed_cart() {
    let store = Arc::new(MemoryStore::new().with_rate("V1", "cairo", egp(15)).unwrap());
    let calculator = ShippingCalculator::new(store.clone());
    let cache = QuoteCache::new(16);

    let mut items = vec![vendor_line("p-1", "V1")];
    cache.quote(&calculator, &items, &cairo()).await.unwrap();
    cache.quote(&calculator, &items, &cairo()).await.unwrap();
    assert_eq!(store.calls(StoreCall::ShippingRate), 1);

    items.push(vendor_line("p-2", "V1"));
    cache.quote(&calculator, &items, &cairo()).await.unwrap();
    assert_eq!(store.calls(StoreCall::ShippingRate), 2);
}
