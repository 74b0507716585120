//! CMS page route handler.
//!
//! Shopware category pages of type "page" are served under `/cms/...`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::DateTime;
use tower_cookies::Cookies;
use tracing::instrument;

use super::{Layout, not_found};
use crate::filters;
use crate::middleware::CspNonce;
use crate::shopware::Page;
use crate::state::AppState;

/// CMS page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/show.html")]
pub struct PageTemplate {
    pub layout: Layout,
    pub page: Page,
    /// Human readable date of the last change, if known.
    pub last_updated: Option<String>,
}

impl PageTemplate {
    fn meta_description(&self) -> &str {
        if self.page.seo.description.is_empty() {
            &self.page.body_summary
        } else {
            &self.page.seo.description
        }
    }

    fn meta_title(&self) -> &str {
        if self.page.seo.title.is_empty() {
            &self.page.title
        } else {
            &self.page.seo.title
        }
    }
}

/// Format a Store API timestamp as e.g. `January 5, 2024`.
fn format_page_date(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|date| date.format("%B %-d, %Y").to_string())
}

/// Date shown under the page: the update time, else the creation time.
fn last_updated(page: &Page) -> Option<String> {
    let date = if page.updated_at.is_empty() {
        &page.created_at
    } else {
        &page.updated_at
    };
    format_page_date(date)
}

/// Display a CMS page.
#[instrument(skip(state, cookies, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    cookies: Cookies,
    nonce: CspNonce,
) -> Response {
    let (layout, page) = tokio::join!(
        Layout::load(&state, &cookies, nonce),
        state.catalog().get_page(&handle),
    );

    let Some(page) = page else {
        return not_found(layout);
    };

    PageTemplate {
        layout,
        last_updated: last_updated(&page),
        page,
    }
    .into_response()
}
