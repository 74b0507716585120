//! Integration tests for the Shopware storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against a mock Store API
//! cargo test -p shopware-storefront-integration-tests
//!
//! # Smoke tests against a running storefront (skipped when unset)
//! STOREFRONT_BASE_URL=http://localhost:3000 cargo test -p shopware-storefront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart cookie and line item round trips through
//!   [`MockStoreApi`]
//! - `catalog_reads` - Catalog and client decoding against the mock catalog
//! - `live_storefront` - Read-only checks against a deployed storefront

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use shopware_storefront::config::{HomeConfig, ShopwareConfig, StorefrontConfig};
use shopware_storefront::routes;
use shopware_storefront::state::AppState;
use shopware_storefront_core::CurrencyCode;
use tokio::net::TcpListener;

/// Context token handed out by [`MockStoreApi`].
pub const MOCK_CONTEXT_TOKEN: &str = "mock-context-token";

/// Unit price of every product in the mock catalog.
pub const MOCK_UNIT_PRICE: f64 = 12.5;

#[derive(Debug, Clone)]
struct MockLine {
    id: String,
    quantity: u32,
}

#[derive(Clone, Default)]
struct MockState {
    lines: Arc<Mutex<Vec<MockLine>>>,
}

impl MockState {
    fn with_lines<T>(&self, f: impl FnOnce(&mut Vec<MockLine>) -> T) -> T {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut lines)
    }

    fn cart_json(&self) -> Value {
        self.with_lines(|lines| {
            let line_items: Vec<Value> = lines
                .iter()
                .map(|line| {
                    json!({
                        "id": line.id,
                        "referencedId": line.id,
                        "label": format!("Product {}", line.id),
                        "quantity": line.quantity,
                        "type": "product",
                        "price": {
                            "unitPrice": MOCK_UNIT_PRICE,
                            "totalPrice": MOCK_UNIT_PRICE * f64::from(line.quantity),
                            "quantity": line.quantity,
                        },
                        "payload": { "options": [] },
                    })
                })
                .collect();
            let total: f64 = lines
                .iter()
                .map(|line| MOCK_UNIT_PRICE * f64::from(line.quantity))
                .sum();

            json!({
                "token": MOCK_CONTEXT_TOKEN,
                "price": {
                    "netPrice": total,
                    "totalPrice": total,
                    "positionPrice": total,
                    "calculatedTaxes": [],
                },
                "lineItems": line_items,
                "errors": [],
            })
        })
    }
}

#[derive(Deserialize)]
struct ItemsBody {
    items: Vec<ItemBody>,
}

#[derive(Deserialize)]
struct ItemBody {
    id: String,
    quantity: u32,
}

#[derive(Deserialize)]
struct IdsBody {
    ids: Vec<String>,
}

fn cart_response(state: &MockState) -> Response {
    (
        [("sw-context-token", MOCK_CONTEXT_TOKEN)],
        Json(state.cart_json()),
    )
        .into_response()
}

fn has_access_key(headers: &HeaderMap) -> bool {
    headers.contains_key("sw-access-key")
}

async fn context(headers: HeaderMap) -> Response {
    if !has_access_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    (
        [("sw-context-token", MOCK_CONTEXT_TOKEN)],
        Json(json!({ "token": MOCK_CONTEXT_TOKEN, "currency": { "isoCode": "EUR" } })),
    )
        .into_response()
}

async fn read_cart(State(state): State<MockState>) -> Response {
    cart_response(&state)
}

async fn add_line_items(State(state): State<MockState>, Json(body): Json<ItemsBody>) -> Response {
    state.with_lines(|lines| {
        for item in body.items {
            match lines.iter_mut().find(|line| line.id == item.id) {
                Some(line) => line.quantity = item.quantity,
                None => lines.push(MockLine {
                    id: item.id,
                    quantity: item.quantity,
                }),
            }
        }
    });
    cart_response(&state)
}

async fn update_line_items(
    State(state): State<MockState>,
    Json(body): Json<ItemsBody>,
) -> Response {
    state.with_lines(|lines| {
        for item in body.items {
            if let Some(line) = lines.iter_mut().find(|line| line.id == item.id) {
                line.quantity = item.quantity;
            }
        }
    });
    cart_response(&state)
}

async fn remove_line_items(State(state): State<MockState>, Json(body): Json<IdsBody>) -> Response {
    state.with_lines(|lines| lines.retain(|line| !body.ids.contains(&line.id)));
    cart_response(&state)
}

/// Unknown routes and entities answer with the Store API error envelope.
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "errors": [{ "status": "404", "code": "FRAMEWORK__ROUTE_NOT_FOUND" }] })),
    )
        .into_response()
}

// =============================================================================
// Catalog Fixtures
// =============================================================================

/// Category id behind the `Imprint/` SEO path.
pub const IMPRINT_CATEGORY_ID: &str = "cat-imprint";
/// Category id behind the `Clothing/` SEO path.
pub const CLOTHING_CATEGORY_ID: &str = "cat-clothing";
/// Category id behind the `Sale%25/` SEO path.
pub const SALE_CATEGORY_ID: &str = "cat-sale";
/// Parent product listed in the clothing category.
pub const SHIRT_PRODUCT_ID: &str = "prod-shirt";
/// Category id answered with HTTP 429 and `Retry-After: 7`.
pub const RATE_LIMITED_CATEGORY_ID: &str = "rate-limited";
/// Category id answered with a 400 error envelope.
pub const REJECTED_CATEGORY_ID: &str = "rejected";
/// Category id answered with a body that is not JSON.
pub const GARBLED_CATEGORY_ID: &str = "garbled";

/// Total reported by the clothing product listing.
pub const CLOTHING_TOTAL: u64 = 42;

const SEO_URLS: &[(&str, &str, &str, &str)] = &[
    ("seo-imprint", "Imprint/", IMPRINT_CATEGORY_ID, "frontend.navigation.page"),
    ("seo-clothing", "Clothing/", CLOTHING_CATEGORY_ID, "frontend.navigation.page"),
    ("seo-sale", "Sale%25/", SALE_CATEGORY_ID, "frontend.navigation.page"),
    ("seo-shirt", "Main-Shirt/SW1", SHIRT_PRODUCT_ID, "frontend.detail.page"),
];

/// Values of every `equals` filter on `field`, including nested `multi` queries.
fn equals_values(filters: &Value, field: &str) -> Vec<String> {
    let mut values = Vec::new();
    for filter in filters.as_array().into_iter().flatten() {
        if filter["type"] == "equals"
            && filter["field"] == field
            && let Some(value) = filter["value"].as_str()
        {
            values.push(value.to_string());
        }
        values.extend(equals_values(&filter["queries"], field));
    }
    values
}

fn seo_url_json(id: &str, path: &str, foreign_key: &str, route: &str) -> Value {
    json!({
        "id": id,
        "foreignKey": foreign_key,
        "routeName": route,
        "seoPathInfo": path,
        "isCanonical": true,
        "isDeleted": false,
        "createdAt": "2024-01-02T10:00:00.000+00:00",
        "updatedAt": null,
    })
}

fn search_result(elements: Vec<Value>) -> Value {
    let total = elements.len();
    json!({ "elements": elements, "total": total, "limit": total, "page": 1 })
}

async fn seo_urls(Json(body): Json<Value>) -> Json<Value> {
    let paths = equals_values(&body["filter"], "seoPathInfo");
    let routes = equals_values(&body["filter"], "routeName");
    let elements = SEO_URLS
        .iter()
        .filter(|(_, path, _, route)| {
            paths.iter().any(|p| p == path) || routes.iter().any(|r| r == route)
        })
        .map(|(id, path, key, route)| seo_url_json(id, path, key, route))
        .collect();
    Json(search_result(elements))
}

fn category_json(id: &str) -> Option<Value> {
    let category = match id {
        IMPRINT_CATEGORY_ID => json!({
            "id": id,
            "name": "Imprint",
            "type": "page",
            "cmsPage": {
                "type": "page",
                "sections": [{
                    "blocks": [
                        { "slots": [{ "slot": "content", "type": "text",
                            "fieldConfig": { "content": { "value": "<h1>Imprint</h1>" } } }] },
                        { "slots": [{ "slot": "content", "type": "text",
                            "fieldConfig": { "content": { "value": "<p>Body</p>" } } }] },
                    ],
                }],
            },
        }),
        CLOTHING_CATEGORY_ID => json!({
            "id": id,
            "name": "Clothing",
            "description": "Everything to wear",
            "translated": { "metaTitle": "Clothing & More" },
            "childCount": 3,
            "children": [
                {
                    "id": "cat-men",
                    "name": "Men",
                    "visible": true,
                    "type": "page",
                    "childCount": 2,
                    "seoUrls": [
                        { "seoPathInfo": "Clothing/Men/", "isCanonical": true, "isDeleted": false },
                        { "seoPathInfo": "Clothing/Men/Archived/", "isCanonical": true, "isDeleted": true },
                        { "seoPathInfo": "Clothing/Men/Legacy/", "isCanonical": false, "isDeleted": false },
                        { "seoPathInfo": "Elsewhere/Very-Long-Men-Path/", "isCanonical": true, "isDeleted": false },
                    ],
                },
                { "id": "cat-hidden", "name": "Hidden", "visible": false, "type": "page" },
                { "id": "cat-link", "name": "External", "visible": true, "type": "link" },
            ],
        }),
        SALE_CATEGORY_ID => json!({ "id": id, "name": "Sale" }),
        _ => return None,
    };
    Some(category)
}

async fn category(Path(id): Path<String>) -> Response {
    match id.as_str() {
        RATE_LIMITED_CATEGORY_ID => {
            (StatusCode::TOO_MANY_REQUESTS, [("Retry-After", "7")]).into_response()
        }
        REJECTED_CATEGORY_ID => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": [{ "status": "400", "code": "X", "title": "Bad", "detail": "nope" }] })),
        )
            .into_response(),
        GARBLED_CATEGORY_ID => "this is not json".into_response(),
        _ => match category_json(&id) {
            Some(category) => Json(category).into_response(),
            None => not_found().await,
        },
    }
}

async fn category_list(Json(body): Json<Value>) -> Json<Value> {
    let elements = equals_values(&body["filter"], "id")
        .iter()
        .filter_map(|id| category_json(id))
        .collect();
    Json(search_result(elements))
}

fn shirt_json() -> Value {
    json!({
        "id": SHIRT_PRODUCT_ID,
        "name": "Main Shirt",
        "available": true,
        "calculatedPrice": { "unitPrice": MOCK_UNIT_PRICE, "totalPrice": MOCK_UNIT_PRICE },
        "seoUrls": [seo_url_json("seo-shirt", "Main-Shirt/SW1", SHIRT_PRODUCT_ID, "frontend.detail.page")],
    })
}

async fn products(Json(body): Json<Value>) -> Json<Value> {
    let elements = equals_values(&body["filter"], "id")
        .iter()
        .filter(|id| id.as_str() == SHIRT_PRODUCT_ID)
        .map(|_| shirt_json())
        .collect();
    Json(search_result(elements))
}

async fn product_listing(Path(id): Path<String>) -> Response {
    if id != CLOTHING_CATEGORY_ID {
        return not_found().await;
    }
    let variant = json!({
        "id": "prod-shirt-red",
        "parentId": SHIRT_PRODUCT_ID,
        "name": "Main Shirt Red",
        "available": true,
        "calculatedPrice": { "unitPrice": MOCK_UNIT_PRICE, "totalPrice": MOCK_UNIT_PRICE },
        "seoUrls": [seo_url_json("seo-red", "Main-Shirt-Red/SW1.1", "prod-shirt-red", "frontend.detail.page")],
    });
    Json(json!({
        "elements": [shirt_json(), variant],
        "total": CLOTHING_TOTAL,
        "limit": 15,
        "page": 1,
    }))
    .into_response()
}

/// Minimal in-memory Store API covering context, cart and a fixed catalog.
pub struct MockStoreApi {
    pub addr: SocketAddr,
}

impl MockStoreApi {
    /// Bind to an ephemeral port and serve in the background.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let api = Router::new()
            .route("/context", get(context))
            .route("/checkout/cart", get(read_cart))
            .route(
                "/checkout/cart/line-item",
                post(add_line_items).patch(update_line_items),
            )
            .route("/checkout/cart/line-item/delete", post(remove_line_items))
            .route("/seo-url", post(seo_urls))
            .route("/category", post(category_list))
            .route("/category/{id}", post(category))
            .route("/product", post(products))
            .route("/product-listing/{id}", post(product_listing))
            .fallback(not_found)
            .with_state(MockState::default());
        let app = Router::new().nest("/store-api", api).fallback(not_found);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock Store API");
        let addr = listener.local_addr().expect("Mock Store API has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr }
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Storefront configuration pointing at `store_domain`.
#[must_use]
pub fn storefront_config(store_domain: &str, base_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: base_url.to_string(),
        site_name: "Integration Store".to_string(),
        checkout_url: format!("{base_url}/checkout-complete"),
        shopware: ShopwareConfig {
            store_domain: store_domain.to_string(),
            api_type: "store-api".to_string(),
            access_token: SecretString::from("SWSCQMLZRHJ1VGTKEJBXDFV2NW"),
            use_seo_urls: true,
            currency: CurrencyCode::EUR,
            request_timeout: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(60),
        },
        home: HomeConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A storefront served in-process against a [`MockStoreApi`].
pub struct TestContext {
    /// Cookie-aware client that does not follow redirects.
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub store_api: MockStoreApi,
}

impl TestContext {
    /// Start the mock Store API and a storefront in front of it.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot be started.
    pub async fn new() -> Self {
        let store_api = MockStoreApi::start().await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        let storefront_url = format!("http://{addr}");

        let config = storefront_config(&store_api.url(), &storefront_url);
        let state = AppState::new(config).expect("Failed to build application state");
        let app = routes::app(state);
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            storefront_url,
            store_api,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }
}
