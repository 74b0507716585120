//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{CartService, Catalog};
use crate::shopware::{ShopwareClient, ShopwareError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// Store API client, the catalog and cart services, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    client: ShopwareClient,
    catalog: Catalog,
    cart: CartService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Store API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ShopwareError> {
        let client = ShopwareClient::new(&config.shopware)?;
        let catalog = Catalog::new(client.clone(), &config.shopware);
        let cart = CartService::new(client.clone(), &config);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                catalog,
                cart,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Store API client.
    #[must_use]
    pub fn client(&self) -> &ShopwareClient {
        &self.inner.client
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }
}
