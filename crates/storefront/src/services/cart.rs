//! Cart actions scoped by the context token cookie.
//!
//! The Store API keeps the cart server side; the storefront only carries the
//! `sw-context-token` between browser and API. Nothing here is cached.

use shopware_storefront_core::CurrencyCode;
use thiserror::Error;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::{debug, instrument, warn};

use crate::config::StorefrontConfig;
use crate::error::add_breadcrumb;
use crate::shopware::conversions::{cart_error_messages, transform_cart};
use crate::shopware::schema;
use crate::shopware::{Cart, LineItemInput, LineItemUpdate, ShopwareClient};

/// Cookie holding the Store API context token.
pub const CONTEXT_TOKEN_COOKIE: &str = "sw-context-token";

/// A cart action that could not be carried out. Messages are shown to shoppers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartActionError {
    #[error("Could not get cart")]
    CartUnavailable,

    #[error("Missing product variant ID")]
    MissingVariant,

    #[error("Missing cart ID")]
    MissingCartId,

    #[error("Error updating item quantity")]
    UpdateFailed,

    #[error("Cart ID is missing")]
    CartIdMissing,

    #[error("Line ID is missing")]
    LineIdMissing,

    #[error("Missing line ID or variant ID")]
    MissingLineOrVariant,

    #[error("Error fetching cart")]
    FetchFailed,

    /// The Store API accepted the request but reported cart errors.
    #[error("{0}")]
    Rejected(String),
}

/// Cart operations against the Store API.
#[derive(Clone)]
pub struct CartService {
    client: ShopwareClient,
    secure_cookie: bool,
    checkout_url: String,
    currency: CurrencyCode,
}

impl CartService {
    #[must_use]
    pub fn new(client: ShopwareClient, config: &StorefrontConfig) -> Self {
        Self {
            client,
            secure_cookie: config.is_secure(),
            checkout_url: config.checkout_url.clone(),
            currency: config.shopware.currency,
        }
    }

    /// Context token stored in the request cookies.
    #[must_use]
    pub fn context_token(cookies: &Cookies) -> Option<String> {
        cookies
            .get(CONTEXT_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|token| !token.is_empty())
    }

    fn set_context_token(&self, cookies: &Cookies, token: &str) {
        let cookie = Cookie::build((CONTEXT_TOKEN_COOKIE, token.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.secure_cookie);
        cookies.add(cookie.into());
    }

    /// Store the cart token in the cookie when it differs from the current
    /// one. Returns the token to use for follow-up calls.
    fn sync_context_token(&self, cookies: &Cookies, cart: &schema::Cart) -> Option<String> {
        let current = Self::context_token(cookies);
        match cart.token.as_deref() {
            Some(token) if current.as_deref() != Some(token) => {
                debug!("Updating context token cookie");
                self.set_context_token(cookies, token);
                Some(token.to_string())
            }
            _ => current,
        }
    }

    async fn fetch_cart(&self, context_token: Option<&str>) -> Option<schema::Cart> {
        self.client
            .read_cart(context_token)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to read cart"))
            .ok()
    }

    /// Cart of the current visitor, `None` when it cannot be read.
    #[instrument(skip(self, cookies))]
    pub async fn get_cart(&self, cookies: &Cookies) -> Option<Cart> {
        let token = Self::context_token(cookies);
        let cart = self.fetch_cart(token.as_deref()).await?;
        Some(transform_cart(Some(&cart), &self.checkout_url, self.currency))
    }

    /// Add one unit of a variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart cannot be read, the variant is missing,
    /// or the Store API reports cart errors for the new line.
    #[instrument(skip(self, cookies))]
    pub async fn add_item(
        &self,
        cookies: &Cookies,
        variant_id: Option<&str>,
    ) -> Result<(), CartActionError> {
        let token = Self::context_token(cookies);
        let cart = self
            .fetch_cart(token.as_deref())
            .await
            .ok_or(CartActionError::CartUnavailable)?;
        let token = self.sync_context_token(cookies, &cart);

        let variant_id = variant_id
            .filter(|id| !id.is_empty())
            .ok_or(CartActionError::MissingVariant)?;

        let quantity = cart
            .line_items
            .iter()
            .find(|item| item.id.as_deref() == Some(variant_id))
            .and_then(|item| item.quantity)
            .map_or(1, |quantity| quantity + 1);

        add_breadcrumb(
            "cart",
            "Add to cart",
            Some(&[("variant_id", variant_id), ("quantity", &quantity.to_string())]),
        );

        let Some(token) = token else {
            warn!("Cart has no context token");
            return Ok(());
        };

        match self
            .client
            .add_line_items(&token, &[LineItemInput::product(variant_id, quantity)])
            .await
        {
            Ok(updated) => {
                let messages = cart_error_messages(&updated);
                if messages.is_empty() {
                    Ok(())
                } else {
                    Err(CartActionError::Rejected(messages))
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to add line item");
                Ok(())
            }
        }
    }

    /// Set the quantity of a line. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no cart cookie, the line cannot be
    /// identified, or the update fails.
    #[instrument(skip(self, cookies))]
    pub async fn update_item_quantity(
        &self,
        cookies: &Cookies,
        line_id: Option<&str>,
        variant_id: Option<&str>,
        quantity: u32,
    ) -> Result<(), CartActionError> {
        if Self::context_token(cookies).is_none() {
            return Err(CartActionError::MissingCartId);
        }

        if quantity == 0 {
            return self.remove_item(cookies, line_id).await;
        }

        self.update_line_item(cookies, line_id, variant_id, quantity)
            .await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no cart cookie or no line id.
    #[instrument(skip(self, cookies))]
    pub async fn remove_item(
        &self,
        cookies: &Cookies,
        line_id: Option<&str>,
    ) -> Result<(), CartActionError> {
        let token = Self::context_token(cookies).ok_or(CartActionError::CartIdMissing)?;
        let line_id = line_id
            .filter(|id| !id.is_empty())
            .ok_or(CartActionError::LineIdMissing)?;

        add_breadcrumb("cart", "Remove from cart", Some(&[("line_id", line_id)]));

        if let Err(e) = self
            .client
            .remove_line_items(&token, &[line_id.to_string()])
            .await
        {
            warn!(error = %e, "Failed to remove line item");
        }
        Ok(())
    }

    /// Patch the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no cart cookie, the line or variant id
    /// is missing, or the Store API rejects the change.
    #[instrument(skip(self, cookies))]
    pub async fn update_line_item(
        &self,
        cookies: &Cookies,
        line_id: Option<&str>,
        variant_id: Option<&str>,
        quantity: u32,
    ) -> Result<(), CartActionError> {
        let token = Self::context_token(cookies).ok_or(CartActionError::MissingCartId)?;
        let (Some(line_id), Some(variant_id)) = (
            line_id.filter(|id| !id.is_empty()),
            variant_id.filter(|id| !id.is_empty()),
        ) else {
            return Err(CartActionError::MissingLineOrVariant);
        };

        add_breadcrumb(
            "cart",
            "Update quantity",
            Some(&[("line_id", line_id), ("quantity", &quantity.to_string())]),
        );

        let update = LineItemUpdate {
            id: line_id.to_string(),
            referenced_id: variant_id.to_string(),
            quantity,
        };
        self.client
            .update_line_items(&token, &[update])
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(error = %e, "Failed to update line item");
                CartActionError::UpdateFailed
            })
    }

    /// Make sure the visitor carries a context token cookie.
    #[instrument(skip(self, cookies))]
    pub async fn create_cart_and_set_cookie(&self, cookies: &Cookies) {
        if Self::context_token(cookies).is_some() {
            return;
        }
        if let Some(token) = self.fetch_cart(None).await.and_then(|cart| cart.token) {
            self.set_context_token(cookies, &token);
        }
    }

    /// Checkout url of the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no cart cookie or the cart cannot be read.
    #[instrument(skip(self, cookies))]
    pub async fn redirect_to_checkout(&self, cookies: &Cookies) -> Result<String, CartActionError> {
        let token = Self::context_token(cookies).ok_or(CartActionError::MissingCartId)?;
        self.fetch_cart(Some(&token))
            .await
            .ok_or(CartActionError::FetchFailed)?;
        Ok(self.checkout_url.clone())
    }
}
