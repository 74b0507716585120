//! Cache types for catalog reads.

use shopware_storefront_core::NavigationType;

use crate::shopware::Menu;
use crate::shopware::schema::{Category, Product, SeoUrl};

/// Cache key for navigation, SEO url, category and product reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Menu {
        navigation_type: NavigationType,
        depth: u32,
    },
    SeoUrl(String),
    Category {
        id: String,
        cms: bool,
    },
    Product(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Menu(Vec<Menu>),
    SeoUrl(Box<SeoUrl>),
    Category(Box<Category>),
    Product(Box<Product>),
}
