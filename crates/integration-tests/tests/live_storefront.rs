//! Read-only smoke tests against a running storefront.
//!
//! Skipped unless `STOREFRONT_BASE_URL` is set, e.g. to a storefront in front
//! of the Shopware demo store.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;

fn base_url() -> Option<String> {
    std::env::var("STOREFRONT_BASE_URL")
        .ok()
        .map(|url| url.trim_end_matches('/').to_string())
}

async fn get(path: &str) -> Option<reqwest::Response> {
    let base = base_url()?;
    Some(
        reqwest::Client::new()
            .get(format!("{base}{path}"))
            .send()
            .await
            .unwrap(),
    )
}

#[tokio::test]
async fn test_health() {
    let Some(response) = get("/health").await else {
        return;
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_home_page() {
    let Some(response) = get("/").await else {
        return;
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_collection_second_page() {
    let Some(response) = get("/search/Products?page=2").await else {
        return;
    };
    assert!(matches!(
        response.status(),
        StatusCode::OK | StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn test_search_sorted_by_price() {
    let Some(response) = get("/search?q=shirt&sort=price-desc").await else {
        return;
    };
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Sort by"));
}

#[tokio::test]
async fn test_sitemap() {
    let Some(response) = get("/sitemap.xml").await else {
        return;
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    assert!(response.text().await.unwrap().contains("<urlset"));
}
