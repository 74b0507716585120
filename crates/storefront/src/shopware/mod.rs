//! Shopware Store API client, query payloads and storefront view models.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`: every Store API operation is a POST/GET/PATCH
//!   with a criteria body and the `sw-access-key` header
//! - Shopware is the source of truth, nothing is synced locally
//! - Remote payloads are deserialized into [`schema`] types and mapped onto
//!   view models ([`types`]) by the functions in [`conversions`]
//!
//! # Example
//!
//! ```rust,ignore
//! use shopware_storefront::shopware::{ShopwareClient, criteria};
//!
//! let client = ShopwareClient::new(&config.shopware)?;
//!
//! let listing = client
//!     .request_products(&criteria::default_product_criteria(&product_id, 1, 1))
//!     .await?;
//!
//! let cart = client.read_cart(Some(&token)).await?;
//! ```

pub mod conversions;
pub mod criteria;
pub mod schema;
mod store_api;
pub mod types;

pub use store_api::{
    CONTEXT_TOKEN_HEADER, LineItemInput, LineItemUpdate, ShopwareClient, StoreResponse,
};
pub use types::*;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the Store API.
#[derive(Debug, Error)]
pub enum ShopwareError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store API answered with a non-success status.
    #[error("Store API error (HTTP {status}): {}", format_api_errors(.errors))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Entries from the `errors` envelope.
        errors: Vec<ApiErrorDetail>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the Store API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Error envelope returned by the Store API on failure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// A single entry of the Store API error envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorDetail {
    /// HTTP status as string (e.g. "404").
    pub status: String,
    /// Shopware error code (e.g. `FRAMEWORK__ROUTE_NOT_FOUND`).
    pub code: String,
    /// Short title.
    pub title: String,
    /// Human readable detail.
    pub detail: String,
}

fn format_api_errors(errors: &[ApiErrorDetail]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.code.is_empty() {
                parts.push(format!("[{}]", e.code));
            }
            if !e.title.is_empty() {
                parts.push(e.title.clone());
            }
            if !e.detail.is_empty() {
                parts.push(e.detail.clone());
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_formatting() {
        let err = ShopwareError::Api {
            status: 404,
            errors: vec![
                ApiErrorDetail {
                    status: "404".to_string(),
                    code: "CONTENT__CATEGORY_NOT_FOUND".to_string(),
                    title: "Not Found".to_string(),
                    detail: "Category \"abc\" not found.".to_string(),
                },
                ApiErrorDetail {
                    title: "Second".to_string(),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "Store API error (HTTP 404): [CONTENT__CATEGORY_NOT_FOUND] Not Found Category \"abc\" not found.; Second"
        );
    }

    #[test]
    fn test_api_error_no_details() {
        let err = ShopwareError::Api {
            status: 500,
            errors: vec![ApiErrorDetail::default()],
        };
        assert_eq!(
            err.to_string(),
            "Store API error (HTTP 500): [error 1]: (no details)"
        );
    }

    #[test]
    fn test_api_error_empty_vec() {
        let err = ShopwareError::Api {
            status: 502,
            errors: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Store API error (HTTP 502): (no error details provided)"
        );
    }

    #[test]
    fn test_error_envelope_parses_partial_entries() {
        let envelope: ApiErrorEnvelope =
            serde_json::from_str(r#"{"errors":[{"status":"401","code":"FRAMEWORK__API_INVALID_ACCESS_KEY"}]}"#)
                .unwrap();
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].status, "401");
        assert!(envelope.errors[0].detail.is_empty());
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ShopwareError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
