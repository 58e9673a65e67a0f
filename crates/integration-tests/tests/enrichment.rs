//! Product enrichment and trending reads against a mocked upstream.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use catalog_integration_tests::{
    MemoryFavorites, MemorySearches, MemoryTrending, TEST_TOKEN, upstream_client,
};
use catalog_service::cache::TtlCache;
use catalog_service::config::TrendingConfig;
use catalog_service::db::FavoriteStore;
use catalog_service::models::TrendingEntry;
use catalog_service::services::{
    ProductListRequest, ProductService, ServiceError, TrendingRefresher,
};
use mockito::Matcher;

struct Harness {
    server: mockito::ServerGuard,
    favorites: Arc<MemoryFavorites>,
    cache: TtlCache,
    service: ProductService,
}

async fn harness() -> Harness {
    let server = mockito::Server::new_async().await;
    let client = upstream_client(&server.url());
    let favorites = Arc::new(MemoryFavorites::default());
    let cache = TtlCache::new(1024 * 1024);
    let service = ProductService::new(
        Arc::new(client.clone()),
        Arc::new(client),
        favorites.clone(),
        Arc::new(MemorySearches::default()),
        cache.clone(),
    );
    Harness {
        server,
        favorites,
        cache,
        service,
    }
}

#[tokio::test]
async fn test_listing_is_flagged_and_priced_in_one_batch() {
    let mut h = harness().await;
    h.favorites.insert("u-1", "p-2").await.unwrap();

    let products = h
        .server
        .mock("GET", "/v1/products")
        .match_header("authorization", format!("Bearer {TEST_TOKEN}").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("catalogID".into(), "zp-my".into()),
            Matcher::UrlEncoded("Active".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"Meta":{"Page":1},"Items":[{"ID":"p-1"},{"ID":"p-2"},{"ID":"p-3"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let pricing = h
        .server
        .mock("GET", "/v1/priceschedules")
        .match_query(Matcher::UrlEncoded("ID".into(), "p-1|p-2|p-3".into()))
        .with_status(200)
        .with_body(r#"{"Items":[{"ID":"p-3","Currency":"MYR"},{"ID":"p-1"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let page = h
        .service
        .products("u-1", ProductListRequest::default())
        .await
        .unwrap();

    products.assert_async().await;
    pricing.assert_async().await;

    let flags: Vec<bool> = page.items.iter().map(|p| p.is_favorite).collect();
    assert_eq!(flags, vec![false, true, false]);

    let priced: Vec<Option<&str>> = page
        .items
        .iter()
        .map(|p| p.price_schedule.as_ref().map(|s| s.id.as_str()))
        .collect();
    assert_eq!(priced, vec![Some("p-1"), None, Some("p-3")]);
}

#[tokio::test]
async fn test_pricing_failure_fails_the_listing() {
    let mut h = harness().await;
    h.server
        .mock("GET", "/v1/products")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"Items":[{"ID":"p-1"}]}"#)
        .create_async()
        .await;
    h.server
        .mock("GET", "/v1/priceschedules")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let err = h
        .service
        .products("u-1", ProductListRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "failed to fetch price schedules");
}

#[tokio::test]
async fn test_trending_read_follows_refresh() {
    let mut h = harness().await;
    let upstream = h
        .server
        .mock("GET", "/v1/products")
        .match_query(Matcher::UrlEncoded("ID".into(), "p-9|p-4".into()))
        .with_status(200)
        .with_body(r#"{"Items":[{"ID":"p-9"},{"ID":"p-4"}]}"#)
        .expect(1)
        .create_async()
        .await;

    // Nothing cached yet: empty and no upstream call.
    let before = h.service.trending_products().await.unwrap();
    assert!(before.items.is_empty());

    let store = Arc::new(MemoryTrending::default());
    store.set(vec![
        TrendingEntry {
            product_id: "p-9".to_string(),
            order_count: 12,
            quantity: 30,
        },
        TrendingEntry {
            product_id: "p-4".to_string(),
            order_count: 5,
            quantity: 5,
        },
    ]);
    let refresher = TrendingRefresher::new(store, h.cache.clone(), TrendingConfig::default());
    assert_eq!(refresher.refresh_once().await.unwrap(), 2);

    let after = h.service.trending_products().await.unwrap();

    upstream.assert_async().await;
    let ids: Vec<&str> = after.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p-9", "p-4"]);
}

#[tokio::test]
async fn test_similar_products_without_assignment_is_not_found() {
    let mut h = harness().await;
    h.server
        .mock("GET", "/v1/catalogs/zp-my/categories/productassignments")
        .match_query(Matcher::UrlEncoded("productID".into(), "p-1".into()))
        .with_status(200)
        .with_body(r#"{"Items":[]}"#)
        .create_async()
        .await;

    let err = h
        .service
        .similar_products("u-1", "p-1", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Upstream(_)));
}
