//! Search route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tower_cookies::Cookies;
use tracing::instrument;

use super::Layout;
use super::collections::{ListingQuery, SortLink, sort_links};
use crate::filters;
use crate::middleware::CspNonce;
use crate::shopware::{CollectionDetail, Product};
use crate::state::AppState;

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search/index.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    /// Search term, empty when none was given.
    pub query: String,
    pub products: Vec<Product>,
    pub collections: Vec<CollectionDetail>,
    pub sort_links: Vec<SortLink>,
}

impl SearchTemplate {
    fn results_label(&self) -> &'static str {
        if self.products.len() == 1 {
            "result"
        } else {
            "results"
        }
    }
}

/// Display search results. Without a term only the collection list and sort
/// options are shown.
#[instrument(skip(state, cookies, nonce, query), fields(q = ?query.q))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
    cookies: Cookies,
    nonce: CspNonce,
) -> SearchTemplate {
    let term = query.q.clone().unwrap_or_default();
    let term = term.trim().to_string();
    let catalog = state.catalog();

    let products = async {
        if term.is_empty() {
            Vec::new()
        } else {
            catalog
                .get_search_collection_products(&term, query.sort_option())
                .await
        }
    };

    let (layout, products, collections) = tokio::join!(
        Layout::load(&state, &cookies, nonce),
        products,
        catalog.get_static_collections(),
    );

    SearchTemplate {
        layout,
        sort_links: sort_links("/search", &query),
        query: term,
        products,
        collections,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::tests::get;

    #[tokio::test]
    async fn test_search_without_results() {
        let (status, _, body) = get("/search?q=shirt&sort=price-desc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("There are no products that match"));
        assert!(body.contains("/search?q=shirt&#38;sort=price-asc"));
    }

    #[tokio::test]
    async fn test_search_without_term() {
        let (status, _, body) = get("/search").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sort by"));
        assert!(!body.contains("There are no products that match"));
    }
}
