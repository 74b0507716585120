//! Catalog reads and Store API error mapping against the mock catalog.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use shopware_storefront::services::Catalog;
use shopware_storefront::shopware::criteria::default_category_criteria;
use shopware_storefront::shopware::{ShopwareClient, ShopwareError};
use shopware_storefront_core::SortOption;
use shopware_storefront_integration_tests::{
    CLOTHING_TOTAL, GARBLED_CATEGORY_ID, IMPRINT_CATEGORY_ID, MockStoreApi,
    RATE_LIMITED_CATEGORY_ID, REJECTED_CATEGORY_ID, SHIRT_PRODUCT_ID, TestContext,
    storefront_config,
};

async fn setup() -> (MockStoreApi, ShopwareClient, Catalog) {
    let api = MockStoreApi::start().await;
    let config = storefront_config(&api.url(), "http://localhost:3000");
    let client = ShopwareClient::new(&config.shopware).unwrap();
    let catalog = Catalog::new(client.clone(), &config.shopware);
    (api, client, catalog)
}

// =============================================================================
// Pages & Collections
// =============================================================================

#[tokio::test]
async fn test_page_resolves_seo_path_to_category() {
    let (_api, _, catalog) = setup().await;

    let page = catalog.get_page("Imprint").await.unwrap();
    assert_eq!(page.id, "seo-imprint");
    assert_eq!(page.handle, "Imprint/");
    assert_eq!(page.title, "Imprint");
    // The h1 fragment is left out
    assert_eq!(page.body, "<p>Body</p>");
    assert_eq!(page.foreign_key.as_deref(), Some(IMPRINT_CATEGORY_ID));
    assert_eq!(page.created_at, "2024-01-02T10:00:00.000+00:00");
}

#[tokio::test]
async fn test_unknown_page_is_none() {
    let (_api, _, catalog) = setup().await;
    assert!(catalog.get_page("Nowhere").await.is_none());
}

#[tokio::test]
async fn test_collection_path_uses_seo_path() {
    let (_api, _, catalog) = setup().await;

    let collection = catalog.get_collection("Clothing").await.unwrap();
    assert_eq!(collection.handle, "Clothing/");
    assert_eq!(collection.path, "/search/Clothing/");
    assert_eq!(collection.title, "Clothing & More");
    assert_eq!(collection.description, "Everything to wear");
    assert_eq!(
        collection.updated_at.as_deref(),
        Some("2024-01-02T10:00:00.000+00:00")
    );
}

#[tokio::test]
async fn test_collection_handle_keeps_literal_percent() {
    let (_api, _, catalog) = setup().await;

    let collection = catalog.get_collection("Sale%25").await.unwrap();
    assert_eq!(collection.title, "Sale");
    assert_eq!(collection.path, "/search/Sale%25/");
}

#[tokio::test]
async fn test_sub_collections_pick_canonical_handle() {
    let (_api, _, catalog) = setup().await;

    let children = catalog.get_sub_collections("Clothing").await;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].title, "Men");
    assert_eq!(children[0].handle, "Clothing/Men/");
    assert_eq!(children[0].child_count, 2);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_collection_products_report_total_and_limit() {
    let (_api, _, catalog) = setup().await;

    let listing = catalog
        .get_collection_products("Clothing", 1, SortOption::default(), None)
        .await;
    assert_eq!(listing.total, CLOTHING_TOTAL);
    assert_eq!(listing.limit, 15);
    assert_eq!(listing.products.len(), 2);
    assert_eq!(listing.products[0].id, SHIRT_PRODUCT_ID);
    assert_eq!(listing.products[0].path, "Main-Shirt/SW1");
    // Variants link to their parent's page
    assert_eq!(listing.products[1].id, "prod-shirt-red");
    assert_eq!(listing.products[1].path, "Main-Shirt/SW1");
}

#[tokio::test]
async fn test_unknown_collection_has_no_products() {
    let (_api, _, catalog) = setup().await;

    let listing = catalog
        .get_collection_products("Nowhere", 1, SortOption::default(), None)
        .await;
    assert!(listing.products.is_empty());
    assert_eq!(listing.total, 0);
}

#[tokio::test]
async fn test_product_resolves_seo_path() {
    let (_api, _, catalog) = setup().await;

    let product = catalog.get_product("Main-Shirt/SW1").await.unwrap();
    assert_eq!(product.id, SHIRT_PRODUCT_ID);
    assert_eq!(product.title, "Main Shirt");
    assert!(product.available_for_sale);
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_too_many_requests_maps_to_rate_limited() {
    let (_api, client, _) = setup().await;

    let err = client
        .request_category(RATE_LIMITED_CATEGORY_ID, &default_category_criteria(1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopwareError::RateLimited(7)));
}

#[tokio::test]
async fn test_error_envelope_maps_to_api_error() {
    let (_api, client, _) = setup().await;

    let err = client
        .request_category(REJECTED_CATEGORY_ID, &default_category_criteria(1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopwareError::Api { status: 400, .. }));
    assert_eq!(err.to_string(), "Store API error (HTTP 400): [X] Bad nope");
}

#[tokio::test]
async fn test_invalid_json_maps_to_parse_error() {
    let (_api, client, _) = setup().await;

    let err = client
        .request_category(GARBLED_CATEGORY_ID, &default_category_criteria(1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopwareError::Parse(_)));
}

// =============================================================================
// Rendered Pages
// =============================================================================

#[tokio::test]
async fn test_cms_page_renders_body() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/cms/Imprint")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("<p>Body</p>"));
}

#[tokio::test]
async fn test_collection_page_lists_products_and_children() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/search/Clothing")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Main Shirt"));
    assert!(body.contains("/search/Clothing/Men/"));
}

#[tokio::test]
async fn test_encoded_percent_in_collection_path() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/search/Sale%2525")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("<title>Sale | Integration Store</title>"));
}
