//! Category listing route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shopware_storefront_core::{SORT_OPTIONS, SortOption};
use tower_cookies::Cookies;
use tracing::instrument;

use super::{Layout, not_found};
use crate::filters;
use crate::middleware::CspNonce;
use crate::shopware::conversions::{transform_collection_to_list, transform_handle};
use crate::shopware::{CollectionDetail, ListItem, Product};
use crate::state::AppState;

/// Listing query parameters. Values are kept as strings so malformed input
/// falls back to defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl ListingQuery {
    /// Requested page, 1-based.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }

    #[must_use]
    pub fn sort_option(&self) -> SortOption {
        SortOption::from_slug(self.sort.as_deref())
    }

    fn q(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }

    fn sort(&self) -> Option<&str> {
        self.sort.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Link Building
// =============================================================================

/// `path` with the given query pairs, skipping absent values.
pub fn listing_url(path: &str, params: &[(&str, Option<&str>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            value.map(|v| format!("{key}={}", urlencoding::encode(v)))
        })
        .collect();

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", query.join("&"))
    }
}

/// An entry of the "Sort by" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortLink {
    pub title: &'static str,
    pub url: String,
    pub active: bool,
}

/// Sort links for `path`, keeping the search term.
#[must_use]
pub fn sort_links(path: &str, query: &ListingQuery) -> Vec<SortLink> {
    let current = query.sort_option();
    SORT_OPTIONS
        .iter()
        .map(|option| SortLink {
            title: option.title,
            url: listing_url(path, &[("q", query.q()), ("sort", option.slug)]),
            active: *option == current,
        })
        .collect()
}

/// A numbered page link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u64,
    pub url: String,
    pub current: bool,
}

/// Previous/next and numbered page links of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub previous: Option<String>,
    pub next: Option<String>,
    pub pages: Vec<PageLink>,
}

impl Pagination {
    /// Links for `total` items shown `limit` per page. `None` when everything
    /// fits on one page. Page 1 links carry no `page` parameter.
    #[must_use]
    pub fn new(path: &str, query: &ListingQuery, total: u64, limit: u64) -> Option<Self> {
        if limit == 0 || total <= limit {
            return None;
        }

        let page_count = total.div_ceil(limit);
        let current = u64::from(query.page()).min(page_count);
        let url = |page: u64| {
            let page = (page > 1).then(|| page.to_string());
            listing_url(
                path,
                &[("q", query.q()), ("sort", query.sort()), ("page", page.as_deref())],
            )
        };

        Some(Self {
            previous: (current > 1).then(|| url(current - 1)),
            next: (current < page_count).then(|| url(current + 1)),
            pages: (1..=page_count)
                .map(|number| PageLink {
                    number,
                    url: url(number),
                    current: number == current,
                })
                .collect(),
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "search/collection.html")]
pub struct CollectionTemplate {
    pub layout: Layout,
    pub collection: CollectionDetail,
    pub products: Vec<Product>,
    pub sub_collections: Vec<ListItem>,
    pub sort_links: Vec<SortLink>,
    pub pagination: Option<Pagination>,
}

impl CollectionTemplate {
    fn meta_description(&self) -> String {
        [&self.collection.seo.description, &self.collection.description]
            .into_iter()
            .find(|d| !d.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("{} products", self.collection.title))
    }

    fn meta_title(&self) -> &str {
        if self.collection.seo.title.is_empty() {
            &self.collection.title
        } else {
            &self.collection.seo.title
        }
    }
}

/// Display a category listing.
#[instrument(skip(state, cookies, nonce, query))]
pub async fn show(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<ListingQuery>,
    cookies: Cookies,
    nonce: CspNonce,
) -> Response {
    // `Path` has already percent-decoded the segments
    let segments: Vec<&str> = collection.split('/').filter(|s| !s.is_empty()).collect();
    let decoded = transform_handle(&segments);

    // Source map probes from browsers
    if decoded.contains(".js.map") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let catalog = state.catalog();
    let (layout, collection_detail, listing, sub_collections) = tokio::join!(
        Layout::load(&state, &cookies, nonce),
        catalog.get_collection(&decoded),
        catalog.get_collection_products(&decoded, query.page(), query.sort_option(), None),
        catalog.get_sub_collections(&decoded),
    );

    let Some(collection_detail) = collection_detail else {
        return not_found(layout);
    };

    let path = format!(
        "/search/{}",
        transform_handle(segments.iter().map(|s| urlencoding::encode(s)))
    );
    CollectionTemplate {
        layout,
        pagination: Pagination::new(&path, &query, listing.total, listing.limit),
        sort_links: sort_links(&path, &query),
        sub_collections: transform_collection_to_list(&sub_collections),
        collection: collection_detail,
        products: listing.products,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::tests::{get, test_layout};
    use crate::shopware::Seo;

    fn query(page: Option<&str>, sort: Option<&str>, q: Option<&str>) -> ListingQuery {
        ListingQuery {
            q: q.map(String::from),
            sort: sort.map(String::from),
            page: page.map(String::from),
        }
    }

    #[test]
    fn test_page_parsing_is_lenient() {
        assert_eq!(query(None, None, None).page(), 1);
        assert_eq!(query(Some("3"), None, None).page(), 3);
        assert_eq!(query(Some("0"), None, None).page(), 1);
        assert_eq!(query(Some("abc"), None, None).page(), 1);
    }

    #[test]
    fn test_no_pagination_when_single_page() {
        let q = query(None, None, None);
        assert!(Pagination::new("/search/Products", &q, 15, 15).is_none());
        assert!(Pagination::new("/search/Products", &q, 10, 0).is_none());
    }

    #[test]
    fn test_pagination_first_page() {
        let q = query(None, None, None);
        let pagination = Pagination::new("/search/Products", &q, 40, 15).unwrap();

        assert_eq!(pagination.previous, None);
        assert_eq!(
            pagination.next.as_deref(),
            Some("/search/Products?page=2")
        );
        assert_eq!(pagination.pages.len(), 3);
        assert!(pagination.pages[0].current);
        // page 1 omits the parameter
        assert_eq!(pagination.pages[0].url, "/search/Products");
        assert_eq!(pagination.pages[2].url, "/search/Products?page=3");
    }

    #[test]
    fn test_pagination_keeps_sort_and_query() {
        let q = query(Some("2"), Some("price-desc"), Some("red shirt"));
        let pagination = Pagination::new("/search/Products", &q, 40, 15).unwrap();

        assert_eq!(
            pagination.previous.as_deref(),
            Some("/search/Products?q=red%20shirt&sort=price-desc")
        );
        assert_eq!(
            pagination.next.as_deref(),
            Some("/search/Products?q=red%20shirt&sort=price-desc&page=3")
        );
        assert!(pagination.pages[1].current);
    }

    #[test]
    fn test_pagination_clamps_past_last_page() {
        let q = query(Some("9"), None, None);
        let pagination = Pagination::new("/search/Products", &q, 31, 15).unwrap();
        assert!(pagination.next.is_none());
        assert!(pagination.pages[2].current);
    }

    #[test]
    fn test_sort_links() {
        let links = sort_links("/search/Products", &query(None, Some("price-desc"), None));
        assert_eq!(links.len(), SORT_OPTIONS.len());
        assert_eq!(links[0].url, "/search/Products");
        assert!(!links[0].active);
        let active: Vec<_> = links.iter().filter(|l| l.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].url, "/search/Products?sort=price-desc");
        assert_eq!(active[0].title, "Price: High to low");
    }

    #[test]
    fn test_empty_collection_page_renders_pagination() {
        let q = query(Some("2"), None, None);
        let html = CollectionTemplate {
            layout: test_layout(),
            collection: CollectionDetail {
                handle: "c1".to_string(),
                title: "Shirts".to_string(),
                description: String::new(),
                featured_image: String::new(),
                seo: Seo::default(),
                updated_at: None,
                path: "/search/Shirts".to_string(),
            },
            products: Vec::new(),
            sub_collections: vec![ListItem {
                title: "Polos".to_string(),
                path: "/search/Shirts/Polos".to_string(),
            }],
            sort_links: sort_links("/search/Shirts", &q),
            pagination: Pagination::new("/search/Shirts", &q, 40, 15),
        }
        .render()
        .unwrap();

        assert!(html.contains("No products found in this collection"));
        assert!(html.contains("Sub-Collections"));
        assert!(html.contains(r#"href="/search/Shirts" aria-label="Previous page""#));
        assert!(html.contains(r#"href="/search/Shirts?page=3" aria-label="Next page""#));
        assert!(html.contains("Goto Page 2"));
        assert!(html.contains("<title>Shirts | Test Store</title>"));
    }

    #[tokio::test]
    async fn test_source_map_handle_is_empty_not_found() {
        let (status, _, body) = get("/search/main.js.map").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_collection_renders_not_found() {
        let (status, _, body) = get("/search/Products?page=2&sort=price-desc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Page not found"));
    }
}
