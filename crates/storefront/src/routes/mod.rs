//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (Store API reachable)
//!
//! # Catalog
//! GET  /search                 - Search results (?q, ?sort)
//! GET  /search/{*collection}   - Category listing (?page, ?sort)
//! GET  /product/{*handle}      - Product detail (?<option>=<value>)
//! GET  /cms/{*handle}          - CMS page
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Update quantity
//! POST /cart/remove            - Remove line
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /checkout               - Redirect to checkout
//!
//! # Misc
//! GET  /sitemap.xml            - Sitemap
//! POST /api/revalidate         - Clear the catalog cache
//! GET  /password               - Permanent redirect to /
//! ```

pub mod api;
pub mod cart;
pub mod collections;
pub mod health;
pub mod home;
pub mod pages;
pub mod products;
pub mod search;
pub mod sitemap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use shopware_storefront_core::NavigationType;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::filters;
use crate::middleware::{
    ContentSecurityPolicy, CspNonce, cart_rate_limiter, csp_nonce_middleware,
    request_id_middleware, security_headers_middleware,
};
use crate::services::CartService;
use crate::shopware::Menu;
use crate::state::AppState;

/// Depth of the footer navigation tree.
pub const FOOTER_MENU_DEPTH: u32 = 2;

/// Static assets are fingerprinted, so they never change under the same url.
const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

// =============================================================================
// Page Layout
// =============================================================================

/// Data every full page renders: header navigation, footer and cart badge.
#[derive(Clone)]
pub struct Layout {
    pub site_name: String,
    pub base_url: String,
    pub menu: Vec<Menu>,
    pub footer_menu: Vec<Menu>,
    pub cart_count: u32,
    pub nonce: String,
}

impl Layout {
    /// Load navigation and the cart badge concurrently.
    pub async fn load(state: &AppState, cookies: &Cookies, nonce: CspNonce) -> Self {
        let catalog = state.catalog();
        let cart_count = async {
            // No cookie means no cart yet; skip creating one just for the badge
            if CartService::context_token(cookies).is_none() {
                return 0;
            }
            state
                .cart()
                .get_cart(cookies)
                .await
                .map_or(0, |cart| cart.total_quantity)
        };

        let (menu, footer_menu, cart_count) = tokio::join!(
            catalog.get_menu(NavigationType::MainNavigation, 1),
            catalog.get_menu(NavigationType::FooterNavigation, FOOTER_MENU_DEPTH),
            cart_count,
        );

        Self {
            site_name: state.config().site_name.clone(),
            base_url: state.config().base_url.clone(),
            menu,
            footer_menu,
            cart_count,
            nonce: nonce.0,
        }
    }
}

/// Not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Render the 404 page.
#[must_use]
pub fn not_found(layout: Layout) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { layout }).into_response()
}

/// Fallback for unknown routes.
async fn fallback(
    State(state): State<AppState>,
    cookies: Cookies,
    nonce: CspNonce,
) -> Response {
    not_found(Layout::load(&state, &cookies, nonce).await)
}

// =============================================================================
// Routers
// =============================================================================

/// Create the cart routes router. Mutations are rate limited per client IP.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route_layer(cart_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/search", get(search::search))
        .route("/search/{*collection}", get(collections::show))
        .route("/product/{*handle}", get(products::show))
        .route("/cms/{*handle}", get(pages::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .route("/sitemap.xml", get(sitemap::sitemap))
        .route("/api/revalidate", post(api::revalidate))
        .route("/password", get(|| async { Redirect::permanent("/") }))
        .nest("/health", health_routes())
        .fallback(fallback)
}

/// Build the application with its middleware stack.
pub fn app(state: AppState) -> Router {
    let policy = ContentSecurityPolicy::from_config(state.config());

    Router::new()
        .merge(routes())
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static(STATIC_CACHE_CONTROL),
                ))
                .service(ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))),
        )
        .layer(from_fn_with_state(policy, security_headers_middleware))
        .layer(CookieManagerLayer::new())
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::tests::test_config;

    pub(crate) fn test_layout() -> Layout {
        Layout {
            site_name: "Test Store".to_string(),
            base_url: "http://localhost:3000".to_string(),
            menu: Vec::new(),
            footer_menu: Vec::new(),
            cart_count: 0,
            nonce: "test-nonce".to_string(),
        }
    }

    pub(crate) fn test_app() -> Router {
        app(AppState::new(test_config()).unwrap())
    }

    /// Send a request through the full stack and return status, headers and body.
    pub(crate) async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub(crate) async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn test_password_redirects_home() {
        let (status, headers, _) = get("/password").await;
        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn test_unknown_route_renders_not_found() {
        let (status, headers, body) = get("/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Page not found"));
        assert!(headers.contains_key("x-request-id"));
        let csp = headers
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.contains("'nonce-"));
    }
}
