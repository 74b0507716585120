//! Shopware Store API client implementation.
//!
//! JSON over `reqwest` 0.13. One method per remote endpoint; callers decide
//! what to do with failures. Caching lives in the catalog service.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use shopware_storefront_core::{NavigationType, RouteName};
use tracing::{debug, instrument};

use crate::config::ShopwareConfig;
use crate::shopware::criteria::{self, Criteria};
use crate::shopware::schema::{
    Cart, Category, CrossSellingElement, EntitySearchResult, Product, ProductListingResult,
    SalesChannelContext, SeoUrl,
};
use crate::shopware::{ApiErrorEnvelope, ShopwareError};

/// Header carrying the sales channel access key.
pub const ACCESS_KEY_HEADER: &str = "sw-access-key";
/// Header carrying the context (cart) token, in both directions.
pub const CONTEXT_TOKEN_HEADER: &str = "sw-context-token";
/// Header asking the Store API to attach SEO urls to entities.
pub const INCLUDE_SEO_URLS_HEADER: &str = "sw-include-seo-urls";

/// A decoded Store API response together with the context token header.
#[derive(Debug, Clone)]
pub struct StoreResponse<T> {
    pub data: T,
    /// `sw-context-token` response header, if any.
    pub context_token: Option<String>,
}

/// Line item to add to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub id: String,
    pub quantity: u32,
    pub referenced_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl LineItemInput {
    /// A product line item referencing `product_id`.
    #[must_use]
    pub fn product(product_id: &str, quantity: u32) -> Self {
        Self {
            id: product_id.to_string(),
            quantity,
            referenced_id: product_id.to_string(),
            kind: "product".to_string(),
        }
    }
}

/// Quantity change of an existing line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemUpdate {
    pub id: String,
    pub referenced_id: String,
    pub quantity: u32,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    #[serde(flatten)]
    criteria: &'a Criteria,
    search: String,
}

// =============================================================================
// ShopwareClient
// =============================================================================

/// Client for the Shopware Store API.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct ShopwareClient {
    inner: Arc<ShopwareClientInner>,
}

struct ShopwareClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_key: SecretString,
}

impl ShopwareClient {
    /// Create a new Store API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopwareConfig) -> Result<Self, ShopwareError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopwareClientInner {
                client,
                endpoint: config.endpoint(),
                access_key: config.access_token.clone(),
            }),
        })
    }

    /// Base URL all operation paths are appended to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    fn request(&self, method: Method, path: &str, context_token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.endpoint);
        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(ACCESS_KEY_HEADER, self.inner.access_key.expose_secret())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        if let Some(token) = context_token {
            builder = builder.header(CONTEXT_TOKEN_HEADER, token);
        }

        builder
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<StoreResponse<T>, ShopwareError> {
        let response = builder.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopwareError::RateLimited(retry_after));
        }

        let context_token = response
            .headers()
            .get(CONTEXT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let envelope: ApiErrorEnvelope =
                serde_json::from_str(&response_text).unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Store API returned non-success status"
            );
            return Err(ShopwareError::Api {
                status: status.as_u16(),
                errors: envelope.errors,
            });
        }

        let data = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Store API response"
            );
            ShopwareError::Parse(e)
        })?;

        if let Some(token) = &context_token {
            debug!(context_token = %token, "Store API returned context token");
        }

        Ok(StoreResponse {
            data,
            context_token,
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ShopwareError> {
        let builder = self.request(Method::POST, path, None).json(body);
        Ok(self.execute(builder).await?.data)
    }

    // =========================================================================
    // Navigation & Category Methods
    // =========================================================================

    /// Load the navigation tree below the sales channel's entry point.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(navigation = %navigation_type))]
    pub async fn request_navigation(
        &self,
        navigation_type: NavigationType,
        depth: u32,
    ) -> Result<Vec<Category>, ShopwareError> {
        let kind = navigation_type.as_str();
        let builder = self
            .request(Method::POST, &format!("/navigation/{kind}/{kind}"), None)
            .header(INCLUDE_SEO_URLS_HEADER, "true")
            .json(&json!({ "depth": depth }));
        Ok(self.execute(builder).await?.data)
    }

    /// Load a single category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the API request fails.
    #[instrument(skip(self, criteria), fields(category_id = %category_id))]
    pub async fn request_category(
        &self,
        category_id: &str,
        criteria: &Criteria,
    ) -> Result<Category, ShopwareError> {
        self.post(&format!("/category/{}", encode_segment(category_id)), criteria)
            .await
    }

    /// Search categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, criteria))]
    pub async fn request_category_list(
        &self,
        criteria: &Criteria,
    ) -> Result<EntitySearchResult<Category>, ShopwareError> {
        self.post("/category", criteria).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Search products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, criteria))]
    pub async fn request_products(
        &self,
        criteria: &Criteria,
    ) -> Result<EntitySearchResult<Product>, ShopwareError> {
        self.post("/product", criteria).await
    }

    /// Product listing of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, criteria), fields(category_id = %category_id))]
    pub async fn request_category_products(
        &self,
        category_id: &str,
        criteria: &Criteria,
    ) -> Result<ProductListingResult, ShopwareError> {
        self.post(
            &format!("/product-listing/{}", encode_segment(category_id)),
            criteria,
        )
        .await
    }

    /// Full text product search. The term is sent url-encoded as `search`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, criteria), fields(term = ?criteria.term))]
    pub async fn request_search(
        &self,
        criteria: &Criteria,
    ) -> Result<ProductListingResult, ShopwareError> {
        let body = SearchBody {
            criteria,
            search: urlencoding::encode(criteria.term.as_deref().unwrap_or_default()).into_owned(),
        };
        self.post("/search", &body).await
    }

    /// Cross-selling groups of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, criteria), fields(product_id = %product_id))]
    pub async fn request_cross_sell(
        &self,
        product_id: &str,
        criteria: &Criteria,
    ) -> Result<Vec<CrossSellingElement>, ShopwareError> {
        self.post(
            &format!("/product/{}/cross-selling", encode_segment(product_id)),
            criteria,
        )
        .await
    }

    // =========================================================================
    // SEO URL Methods
    // =========================================================================

    /// All SEO urls of a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(route = %route))]
    pub async fn request_seo_urls(
        &self,
        route: RouteName,
        page: u32,
        limit: u32,
    ) -> Result<EntitySearchResult<SeoUrl>, ShopwareError> {
        self.post(
            "/seo-url",
            &criteria::seo_urls_by_route_criteria(route, page, limit),
        )
        .await
    }

    /// Search SEO urls.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, criteria))]
    pub async fn request_seo_url(
        &self,
        criteria: &Criteria,
    ) -> Result<EntitySearchResult<SeoUrl>, ShopwareError> {
        self.post("/seo-url", criteria).await
    }

    // =========================================================================
    // Context & Cart Methods
    // =========================================================================

    /// Read the sales channel context. Without a token a new context is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, context_token))]
    pub async fn request_context(
        &self,
        context_token: Option<&str>,
    ) -> Result<SalesChannelContext, ShopwareError> {
        let builder = self.request(Method::GET, "/context", context_token);
        let response = self.execute::<SalesChannelContext>(builder).await?;
        let mut context = response.data;
        if context.token.is_none() {
            context.token = response.context_token;
        }
        Ok(context)
    }

    /// Read the cart of a context. Without a token a new cart is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, context_token))]
    pub async fn read_cart(&self, context_token: Option<&str>) -> Result<Cart, ShopwareError> {
        let builder = self.request(Method::GET, "/checkout/cart", context_token);
        self.cart_response(builder).await
    }

    /// Add line items to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, context_token, items), fields(items = items.len()))]
    pub async fn add_line_items(
        &self,
        context_token: &str,
        items: &[LineItemInput],
    ) -> Result<Cart, ShopwareError> {
        let builder = self
            .request(Method::POST, "/checkout/cart/line-item", Some(context_token))
            .json(&json!({ "items": items }));
        self.cart_response(builder).await
    }

    /// Change quantities of existing line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, context_token, items), fields(items = items.len()))]
    pub async fn update_line_items(
        &self,
        context_token: &str,
        items: &[LineItemUpdate],
    ) -> Result<Cart, ShopwareError> {
        let builder = self
            .request(Method::PATCH, "/checkout/cart/line-item", Some(context_token))
            .json(&json!({ "items": items }));
        self.cart_response(builder).await
    }

    /// Remove line items by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, context_token), fields(ids = ids.len()))]
    pub async fn remove_line_items(
        &self,
        context_token: &str,
        ids: &[String],
    ) -> Result<Cart, ShopwareError> {
        let builder = self
            .request(
                Method::POST,
                "/checkout/cart/line-item/delete",
                Some(context_token),
            )
            .json(&json!({ "ids": ids }));
        self.cart_response(builder).await
    }

    /// Decode a cart, taking the token from the header when the body has none.
    async fn cart_response(&self, builder: RequestBuilder) -> Result<Cart, ShopwareError> {
        let response = self.execute::<Cart>(builder).await?;
        let mut cart = response.data;
        if cart.token.is_none() {
            cart.token = response.context_token;
        }
        Ok(cart)
    }
}

/// Percent-encode a single path segment (entity ids are hex, but handles
/// passed through with SEO urls disabled may not be).
fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
