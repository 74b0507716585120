//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use shopware_storefront_core::SortOption;
use tower_cookies::Cookies;
use tracing::instrument;

use super::Layout;
use crate::filters;
use crate::middleware::CspNonce;
use crate::shopware::Product;
use crate::state::AppState;

/// Number of products in the featured grid.
const FEATURED_PRODUCTS: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    /// Large first tile plus two smaller ones.
    pub featured_products: Vec<Product>,
    /// Horizontally scrolling product strip.
    pub carousel_products: Vec<Product>,
}

/// Display the home page.
#[instrument(skip(state, cookies, nonce))]
pub async fn home(
    State(state): State<AppState>,
    cookies: Cookies,
    nonce: CspNonce,
) -> HomeTemplate {
    let catalog = state.catalog();
    let home = &state.config().home;

    let (layout, featured, carousel) = tokio::join!(
        Layout::load(&state, &cookies, nonce),
        catalog.get_collection_products(&home.featured_collection, 1, SortOption::default(), None),
        catalog.get_collection_products(&home.carousel_collection, 1, SortOption::default(), None),
    );

    HomeTemplate {
        layout,
        featured_products: featured
            .products
            .into_iter()
            .take(FEATURED_PRODUCTS)
            .collect(),
        carousel_products: carousel.products,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header};

    use crate::routes::tests::get;

    #[tokio::test]
    async fn test_home_renders_with_store_api_down() {
        let (status, headers, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Test Store"));
        assert!(
            headers
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
    }
}
