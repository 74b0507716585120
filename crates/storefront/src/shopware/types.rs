//! Storefront view models.
//!
//! Built fresh per request from Store API payloads and handed to templates.
//! Nothing here is persisted.

use serde::Serialize;
use shopware_storefront_core::Price;

// =============================================================================
// Money, SEO & Images
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    /// Amount as rendered by the Store API (e.g. `19.99`, `20`).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Formatted amount for display, e.g. `€19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        Price::format_amount(&self.amount, &self.currency_code)
    }
}

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min_variant_price: Money,
    pub max_variant_price: Money,
}

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Seo {
    pub title: String,
    pub description: String,
}

/// Product or category image. Dimensions are 0 when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Image {
    pub url: String,
    pub alt_text: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Navigation & Pages
// =============================================================================

/// Whether a menu entry groups children or links somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    Headline,
    Link,
}

impl MenuKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Headline => "headline",
            Self::Link => "link",
        }
    }
}

/// A navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub id: String,
    pub title: String,
    /// Storefront path (`/search/...` or `/cms/...`); empty when the category
    /// has no SEO url.
    pub path: String,
    pub kind: MenuKind,
    pub children: Vec<Menu>,
}

/// A CMS page backed by a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub handle: String,
    /// Plain HTML assembled from the page's content slots.
    pub body: String,
    pub body_summary: String,
    pub seo: Seo,
    pub created_at: String,
    pub updated_at: String,
    pub route_name: Option<String>,
    pub foreign_key: Option<String>,
}

// =============================================================================
// Collections
// =============================================================================

/// A category shown as sub-collection of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub handle: String,
    pub title: String,
    pub description: String,
    pub seo: Seo,
    /// Number of child categories. Zero means the category is a content page.
    pub child_count: u32,
    pub updated_at: String,
}

/// Category metadata for a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDetail {
    pub handle: String,
    pub title: String,
    pub description: String,
    /// Media url, empty when the category has none.
    pub featured_image: String,
    pub seo: Seo,
    pub updated_at: Option<String>,
    /// Storefront path, `/search/<seo path or id>`.
    pub path: String,
}

/// A titled link, used for sub-collection and sort lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub title: String,
    pub path: String,
}

/// Products of a category listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionProducts {
    pub products: Vec<Product>,
    /// Total number of products in the category.
    pub total: u64,
    /// Page size used by the Store API.
    pub limit: u64,
}

/// Entry of the product sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSeoUrl {
    pub path: String,
    pub updated_at: Option<String>,
}

// =============================================================================
// Products
// =============================================================================

/// A product option group (e.g. "Size") with its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductOption {
    pub id: String,
    pub name: String,
    pub values: Vec<String>,
}

/// Selected option on a variant or cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductVariant {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub selected_options: Vec<SelectedOption>,
    pub price: Money,
}

/// A product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: String,
    /// Path segment after `/product/`.
    pub path: String,
    pub handle: String,
    pub available_for_sale: bool,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub options: Vec<ProductOption>,
    pub price_range: PriceRange,
    pub variants: Vec<ProductVariant>,
    pub featured_image: Image,
    pub images: Vec<Image>,
    pub seo: Seo,
    pub tags: Vec<String>,
    pub updated_at: String,
}

impl Product {
    /// Storefront URL of the product page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/product/{}", self.path)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartCost {
    pub subtotal_amount: Money,
    pub total_amount: Money,
    pub total_tax_amount: Money,
}

/// Shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    /// Context token identifying the cart.
    pub id: String,
    pub checkout_url: String,
    pub cost: CartCost,
    pub lines: Vec<CartItem>,
    pub total_quantity: u32,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cost of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemCost {
    pub total_amount: Money,
}

/// What a cart line refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Merchandise {
    /// Referenced product (variant) id.
    pub id: String,
    pub title: String,
    pub selected_options: Vec<SelectedOption>,
    pub product: Box<Product>,
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: String,
    pub quantity: u32,
    pub cost: CartItemCost,
    pub merchandise: Merchandise,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        let money = Money {
            amount: "19.9".to_string(),
            currency_code: "EUR".to_string(),
        };
        assert_eq!(money.display(), "€19.90");
    }

    #[test]
    fn test_menu_kind_as_str() {
        assert_eq!(MenuKind::Headline.as_str(), "headline");
        assert_eq!(MenuKind::Link.as_str(), "link");
    }
}
