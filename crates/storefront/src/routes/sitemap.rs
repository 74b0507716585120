//! XML sitemap.

use askama::Template;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use shopware_storefront_core::NavigationType;
use tracing::instrument;

use super::FOOTER_MENU_DEPTH;
use crate::error::{AppError, Result};
use crate::shopware::{Menu, ProductSeoUrl};
use crate::state::AppState;

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: Option<String>,
}

/// Sitemap document template.
#[derive(Template)]
#[template(path = "sitemap.xml")]
pub struct SitemapTemplate {
    pub entries: Vec<SitemapEntry>,
}

/// Entries for the top level of a navigation tree.
fn menu_entries(base_url: &str, menu: &[Menu], now: &str) -> impl Iterator<Item = SitemapEntry> {
    menu.iter()
        .filter(|item| !item.path.is_empty())
        .map(move |item| SitemapEntry {
            loc: format!("{base_url}{}", item.path),
            last_modified: Some(now.to_string()),
        })
}

/// Collect sitemap entries: the home page, both navigations, then products.
fn sitemap_entries(
    base_url: &str,
    now: &str,
    main_menu: &[Menu],
    footer_menu: &[Menu],
    products: Vec<ProductSeoUrl>,
) -> Vec<SitemapEntry> {
    let base_url = base_url.trim_end_matches('/');

    let mut entries = vec![SitemapEntry {
        loc: base_url.to_string(),
        last_modified: Some(now.to_string()),
    }];
    entries.extend(menu_entries(base_url, main_menu, now));
    entries.extend(menu_entries(base_url, footer_menu, now));
    entries.extend(
        products
            .into_iter()
            .filter(|product| !product.path.is_empty())
            .map(|product| SitemapEntry {
                loc: format!("{base_url}/product/{}", product.path),
                last_modified: product.updated_at,
            }),
    );
    entries
}

/// Serve `/sitemap.xml`.
///
/// # Errors
///
/// Returns `AppError::Internal` if the document fails to render.
#[instrument(skip(state))]
pub async fn sitemap(State(state): State<AppState>) -> Result<Response> {
    let catalog = state.catalog();
    let (main_menu, footer_menu, products) = tokio::join!(
        catalog.get_menu(NavigationType::MainNavigation, 1),
        catalog.get_menu(NavigationType::FooterNavigation, FOOTER_MENU_DEPTH),
        catalog.get_product_seo_urls(),
    );

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let entries = sitemap_entries(
        &state.config().base_url,
        &now,
        &main_menu,
        &footer_menu,
        products,
    );

    let body = SitemapTemplate { entries }
        .render()
        .map_err(|e| AppError::Internal(format!("sitemap render failed: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "application/xml")], body).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header};

    use super::*;
    use crate::routes::tests::get;
    use crate::shopware::MenuKind;

    fn menu(path: &str) -> Menu {
        Menu {
            id: path.to_string(),
            title: path.to_string(),
            path: path.to_string(),
            kind: MenuKind::Link,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_sitemap_entries_order_and_paths() {
        let entries = sitemap_entries(
            "https://shop.example/",
            "2024-01-01T00:00:00.000Z",
            &[menu("/search/Clothing"), menu("")],
            &[menu("/cms/Shipping")],
            vec![ProductSeoUrl {
                path: "Shirt/SW10001".to_string(),
                updated_at: Some("2023-12-24T10:00:00.000+00:00".to_string()),
            }],
        );

        let locs: Vec<&str> = entries.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            [
                "https://shop.example",
                "https://shop.example/search/Clothing",
                "https://shop.example/cms/Shipping",
                "https://shop.example/product/Shirt/SW10001",
            ]
        );
        assert_eq!(
            entries[3].last_modified.as_deref(),
            Some("2023-12-24T10:00:00.000+00:00")
        );
    }

    #[test]
    fn test_sitemap_escapes_locations() {
        let xml = SitemapTemplate {
            entries: vec![SitemapEntry {
                loc: "https://shop.example/search/A&B".to_string(),
                last_modified: None,
            }],
        }
        .render()
        .unwrap();
        assert!(xml.contains("<loc>https://shop.example/search/A&#38;B</loc>"));
        assert!(!xml.contains("<lastmod>"));
    }

    #[tokio::test]
    async fn test_sitemap_with_store_api_down() {
        let (status, headers, body) = get("/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/xml");
        assert!(body.contains("<loc>http://localhost:3000</loc>"));
    }
}
