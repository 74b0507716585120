//! Catalog reads composed for storefront pages.
//!
//! Wraps the Store API client with the SEO url switch and a read-through
//! `moka` cache. Failures are logged and turned into `None` or empty
//! collections so a broken upstream degrades pages instead of failing them.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache;
use shopware_storefront_core::{CurrencyCode, NavigationType, RouteName, SortOption};
use tracing::{debug, instrument, warn};

use crate::config::ShopwareConfig;
use crate::shopware::conversions::{
    transform_collection, transform_menu, transform_page, transform_product, transform_products,
    transform_sub_collection,
};
use crate::shopware::criteria::{
    default_category_criteria, default_category_with_cms_criteria, default_cross_selling_criteria,
    default_product_criteria, default_products_criteria, default_search_products_criteria,
    default_sub_categories_criteria, seo_url_criteria, sorting_criteria,
    static_collection_criteria,
};
use crate::shopware::schema::{self, Category, SeoUrl};
use crate::shopware::{
    Collection, CollectionDetail, CollectionProducts, Menu, Page, Product, ProductSeoUrl,
    ShopwareClient, ShopwareError,
};

use cache::{CacheKey, CacheValue};

/// Page size of category listings.
pub const LISTING_PAGE_SIZE: u32 = 15;

/// Catalog service shared by all page handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    client: ShopwareClient,
    seo_urls: bool,
    currency: CurrencyCode,
    cache: Cache<CacheKey, CacheValue>,
}

fn log_failure(operation: &str, error: &ShopwareError) {
    warn!(operation, error = %error, "Store API request failed");
}

impl Catalog {
    /// Create a catalog over `client` using the SEO and cache settings of `config`.
    #[must_use]
    pub fn new(client: ShopwareClient, config: &ShopwareConfig) -> Self {
        Self::with_ttl(client, config.use_seo_urls, config.currency, config.cache_ttl)
    }

    fn with_ttl(
        client: ShopwareClient,
        seo_urls: bool,
        currency: CurrencyCode,
        ttl: Duration,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogInner {
                client,
                seo_urls,
                currency,
                cache,
            }),
        }
    }

    /// Whether handles are SEO paths.
    #[must_use]
    pub fn seo_urls(&self) -> bool {
        self.inner.seo_urls
    }

    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.currency
    }

    fn client(&self) -> &ShopwareClient {
        &self.inner.client
    }

    /// Drop every cached catalog read.
    pub fn revalidate(&self) {
        self.inner.cache.invalidate_all();
        debug!("Catalog cache invalidated");
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Navigation menu of the given type.
    #[instrument(skip(self), fields(navigation = %navigation_type))]
    pub async fn get_menu(&self, navigation_type: NavigationType, depth: u32) -> Vec<Menu> {
        let key = CacheKey::Menu {
            navigation_type,
            depth,
        };
        if let Some(CacheValue::Menu(menu)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for menu");
            return menu;
        }

        match self.client().request_navigation(navigation_type, depth).await {
            Ok(categories) => {
                let menu = transform_menu(&categories, navigation_type, self.seo_urls());
                self.inner
                    .cache
                    .insert(key, CacheValue::Menu(menu.clone()))
                    .await;
                menu
            }
            Err(e) => {
                log_failure("navigation", &e);
                Vec::new()
            }
        }
    }

    // =========================================================================
    // SEO URLs
    // =========================================================================

    /// First SEO url whose path equals `handle` (with or without trailing slash).
    #[instrument(skip(self))]
    pub async fn get_first_seo_url_element(&self, handle: &str) -> Option<SeoUrl> {
        let key = CacheKey::SeoUrl(handle.to_string());
        if let Some(CacheValue::SeoUrl(seo_url)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for seo url");
            return Some(*seo_url);
        }

        let result = self
            .client()
            .request_seo_url(&seo_url_criteria(handle, 1, 1))
            .await
            .inspect_err(|e| log_failure("seo-url", e))
            .ok()?;

        let seo_url = result.elements.into_iter().next()?;
        self.inner
            .cache
            .insert(key, CacheValue::SeoUrl(Box::new(seo_url.clone())))
            .await;
        Some(seo_url)
    }

    /// Entity id behind a SEO handle, if SEO urls are on and one matches.
    async fn resolve_foreign_key(&self, handle: &str) -> Option<String> {
        if !self.seo_urls() {
            return None;
        }
        self.get_first_seo_url_element(handle)
            .await
            .and_then(|seo_url| seo_url.foreign_key)
    }

    /// SEO urls of all product detail pages, for the sitemap.
    #[instrument(skip(self))]
    pub async fn get_product_seo_urls(&self) -> Vec<ProductSeoUrl> {
        match self
            .client()
            .request_seo_urls(RouteName::ProductDetail, 1, 100)
            .await
        {
            Ok(result) => result
                .elements
                .into_iter()
                .map(|seo_url| ProductSeoUrl {
                    path: seo_url.seo_path_info.unwrap_or_default(),
                    updated_at: seo_url.updated_at.or(seo_url.created_at),
                })
                .collect(),
            Err(e) => {
                log_failure("seo-url", &e);
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Categories & Pages
    // =========================================================================

    /// Load a category, optionally with its full CMS page.
    #[instrument(skip(self))]
    pub async fn get_category(&self, category_id: &str, cms: bool) -> Option<Category> {
        let key = CacheKey::Category {
            id: category_id.to_string(),
            cms,
        };
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Some(*category);
        }

        let criteria = if cms {
            default_category_with_cms_criteria(1, 1)
        } else {
            default_category_criteria(1, 1)
        };

        let category = self
            .client()
            .request_category(category_id, &criteria)
            .await
            .inspect_err(|e| log_failure("category", e))
            .ok()?;

        self.inner
            .cache
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Some(category)
    }

    /// CMS page for a `/cms/...` handle.
    #[instrument(skip(self))]
    pub async fn get_page(&self, handle: &str) -> Option<Page> {
        let mut page_id = handle.replacen("cms/", "", 1);
        if page_id.is_empty() {
            return None;
        }

        let mut seo_url = None;
        if self.seo_urls() {
            seo_url = self.get_first_seo_url_element(&page_id).await;
            match seo_url.as_ref().and_then(|s| s.foreign_key.clone()) {
                Some(foreign_key) => page_id = foreign_key,
                None => debug!(handle = %page_id, "No seo url found for page handle"),
            }
        }

        let Some(category) = self.get_category(&page_id, true).await else {
            debug!(handle = %page_id, "No category found for page handle");
            return None;
        };

        Some(transform_page(&category, seo_url.as_ref()))
    }

    /// Listing metadata for a `/search/...` handle.
    #[instrument(skip(self))]
    pub async fn get_collection(&self, handle: &str) -> Option<CollectionDetail> {
        let mut category_id = handle.to_string();

        let mut seo_url = None;
        if self.seo_urls() {
            seo_url = self.get_first_seo_url_element(&category_id).await;
            if let Some(foreign_key) = seo_url.as_ref().and_then(|s| s.foreign_key.clone()) {
                category_id = foreign_key;
            }
        }

        let category = self.get_category(&category_id, false).await?;
        Some(transform_collection(&category, seo_url.as_ref()))
    }

    /// Child categories of a collection. The first path segment must appear in
    /// the children's SEO paths.
    #[instrument(skip(self))]
    pub async fn get_sub_collections(&self, collection: &str) -> Vec<Collection> {
        let parent_name = collection
            .split('/')
            .next()
            .filter(|segment| !segment.is_empty());

        let category_id = self
            .resolve_foreign_key(collection)
            .await
            .unwrap_or_else(|| collection.to_string());

        match self
            .client()
            .request_category_list(&default_sub_categories_criteria(&category_id, 1, 1))
            .await
        {
            Ok(list) => transform_sub_collection(&list, parent_name, self.seo_urls()),
            Err(e) => {
                log_failure("category", &e);
                Vec::new()
            }
        }
    }

    /// Top level collections worth linking from the search page.
    #[instrument(skip(self))]
    pub async fn get_static_collections(&self) -> Vec<CollectionDetail> {
        match self
            .client()
            .request_category_list(&static_collection_criteria(1, 20))
            .await
        {
            Ok(list) => list
                .elements
                .iter()
                .map(|category| {
                    let seo_url = if self.seo_urls() {
                        category.seo_urls.as_ref().and_then(|urls| urls.first())
                    } else {
                        None
                    };
                    transform_collection(category, seo_url)
                })
                .collect(),
            Err(e) => {
                log_failure("category", &e);
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Load a single product with its variants.
    #[instrument(skip(self))]
    pub async fn get_first_product(&self, product_id: &str) -> Option<schema::Product> {
        let key = CacheKey::Product(product_id.to_string());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Some(*product);
        }

        let listing = self
            .client()
            .request_products(&default_product_criteria(product_id, 1, 1))
            .await
            .inspect_err(|e| log_failure("product", e))
            .ok()?;

        let product = listing.elements.into_iter().next()?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Some(product)
    }

    /// Product for a `/product/...` handle.
    #[instrument(skip(self))]
    pub async fn get_product(&self, handle: &str) -> Option<Product> {
        let product_id = self
            .resolve_foreign_key(handle)
            .await
            .unwrap_or_else(|| handle.to_string());

        if product_id.is_empty() {
            debug!(handle, "No product found for handle");
            return None;
        }

        let product = self.get_first_product(&product_id).await?;
        Some(transform_product(&product, self.seo_urls(), self.currency()))
    }

    /// Products of the first cross-selling group.
    #[instrument(skip(self))]
    pub async fn get_product_recommendations(&self, product_id: &str) -> Vec<Product> {
        match self
            .client()
            .request_cross_sell(product_id, &default_cross_selling_criteria(1, 1))
            .await
        {
            Ok(groups) => groups
                .into_iter()
                .next()
                .map(|group| {
                    group
                        .products
                        .iter()
                        .map(|p| transform_product(p, self.seo_urls(), self.currency()))
                        .collect()
                })
                .unwrap_or_default(),
            Err(e) => {
                log_failure("cross-selling", &e);
                Vec::new()
            }
        }
    }

    /// Full text search.
    #[instrument(skip(self))]
    pub async fn get_search_collection_products(
        &self,
        query: &str,
        sort: SortOption,
    ) -> Vec<Product> {
        let criteria = default_search_products_criteria(query, 1, 100)
            .with_sorting(sorting_criteria(Some(sort.sort_key), Some(sort.reverse)));

        let mut search = match self.client().request_search(&criteria).await {
            Ok(search) => search,
            Err(e) => {
                log_failure("search", &e);
                return Vec::new();
            }
        };

        if self.seo_urls() {
            search.elements = self
                .change_variant_url_to_parent_url(std::mem::take(&mut search.elements))
                .await;
        }

        transform_products(&search, self.seo_urls(), self.currency())
    }

    /// Products of a category listing page.
    ///
    /// With SEO urls off the collection handle is the category id and
    /// `category_id` is ignored.
    #[instrument(skip(self))]
    pub async fn get_collection_products(
        &self,
        collection: &str,
        page: u32,
        sort: SortOption,
        category_id: Option<&str>,
    ) -> CollectionProducts {
        let category = if self.seo_urls() {
            match category_id {
                Some(id) => Some(id.to_string()),
                None if collection.is_empty() => None,
                None => {
                    let found = self.resolve_foreign_key(collection).await;
                    if found.is_none() {
                        debug!(collection, "No category found for collection");
                    }
                    found
                }
            }
        } else {
            Some(collection.to_string())
        };

        let Some(category) = category.filter(|c| !c.is_empty()) else {
            return CollectionProducts::default();
        };

        let criteria = default_products_criteria(page.max(1), LISTING_PAGE_SIZE)
            .with_sorting(sorting_criteria(Some(sort.sort_key), Some(sort.reverse)));

        let mut listing = match self
            .client()
            .request_category_products(&category, &criteria)
            .await
        {
            Ok(listing) => listing,
            Err(e) => {
                log_failure("product-listing", &e);
                return CollectionProducts::default();
            }
        };

        listing.elements = self
            .change_variant_url_to_parent_url(std::mem::take(&mut listing.elements))
            .await;

        CollectionProducts {
            products: transform_products(&listing, self.seo_urls(), self.currency()),
            total: listing.total.unwrap_or(0),
            limit: listing.limit.unwrap_or(0),
        }
    }

    /// Point variant SEO urls at their parent product's page. Parents are
    /// fetched concurrently and the input order is kept.
    pub async fn change_variant_url_to_parent_url(
        &self,
        products: Vec<schema::Product>,
    ) -> Vec<schema::Product> {
        join_all(products.into_iter().map(|mut item| async move {
            let has_seo_url = item.seo_urls.as_ref().is_some_and(|urls| !urls.is_empty());
            if has_seo_url
                && let Some(parent_id) = item.parent_id.clone()
                && let Some(parent_seo) = self
                    .get_first_product(&parent_id)
                    .await
                    .and_then(|parent| parent.seo_urls)
                    .and_then(|urls| urls.into_iter().next())
                && let Some(first) = item.seo_urls.as_mut().and_then(|urls| urls.first_mut())
            {
                first.seo_path_info = parent_seo.seo_path_info;
            }
            item
        }))
        .await
    }
}
