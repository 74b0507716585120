//! Store API response payloads.
//!
//! Only the fields the storefront reads are modelled. Every field is optional
//! because the Store API omits or nulls fields depending on the requested
//! associations.

use std::fmt;

use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

/// Generic entity search result (`/category`, `/product`, `/seo-url`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySearchResult<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
}

impl<T> Default for EntitySearchResult<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            total: None,
            limit: None,
            page: None,
        }
    }
}

/// Result of `/product-listing/{id}` and `/search`.
pub type ProductListingResult = EntitySearchResult<Product>;

/// Translated entity fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Translated {
    pub name: Option<String>,
    pub description: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub alt: Option<String>,
}

// =============================================================================
// SEO URLs
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoUrl {
    pub id: Option<String>,
    pub foreign_key: Option<String>,
    pub route_name: Option<String>,
    pub path_info: Option<String>,
    pub seo_path_info: Option<String>,
    pub is_canonical: Option<bool>,
    pub is_deleted: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

// =============================================================================
// Categories & CMS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub translated: Option<Translated>,
    pub seo_urls: Option<Vec<SeoUrl>>,
    pub children: Option<Vec<Category>>,
    pub child_count: Option<u32>,
    pub cms_page: Option<CmsPage>,
    pub media: Option<Media>,
    pub visible: Option<bool>,
    pub active: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmsPage {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sections: Option<Vec<CmsSection>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmsSection {
    pub blocks: Option<Vec<CmsBlock>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmsBlock {
    pub slots: Option<Vec<CmsSlot>>,
}

/// A CMS slot. `field_config` is kept raw since its shape depends on the
/// slot type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmsSlot {
    pub slot: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub field_config: Option<Value>,
}

// =============================================================================
// Media
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Media {
    pub id: Option<String>,
    pub url: Option<String>,
    pub alt: Option<String>,
    pub translated: Option<Translated>,
    pub meta_data: Option<MediaMetaData>,
    /// Line item covers nest the media entity once more.
    pub media: Option<Box<Media>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaMetaData {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductMedia {
    pub id: Option<String>,
    pub media: Option<Media>,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub meta_description: Option<String>,
    pub translated: Option<Translated>,
    pub available: Option<bool>,
    pub calculated_price: Option<CalculatedPrice>,
    pub calculated_cheapest_price: Option<CalculatedPrice>,
    pub cover: Option<ProductMedia>,
    pub media: Option<Vec<ProductMedia>>,
    pub seo_urls: Option<Vec<SeoUrl>>,
    pub children: Option<Vec<Product>>,
    pub options: Option<Vec<PropertyGroupOption>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatedPrice {
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyGroupOption {
    pub id: Option<String>,
    pub name: Option<String>,
    pub group_id: Option<String>,
    pub group: Option<PropertyGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyGroup {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// One entry of `/product/{id}/cross-selling`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrossSellingElement {
    pub products: Vec<Product>,
    pub total: Option<u64>,
}

// =============================================================================
// Cart & Context
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cart {
    pub token: Option<String>,
    pub price: Option<CartPrice>,
    pub line_items: Vec<LineItem>,
    #[serde(deserialize_with = "deserialize_cart_errors")]
    pub errors: Vec<CartError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartPrice {
    pub net_price: Option<f64>,
    pub total_price: Option<f64>,
    pub position_price: Option<f64>,
    pub calculated_taxes: Vec<CalculatedTax>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatedTax {
    pub tax: f64,
    pub tax_rate: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub id: Option<String>,
    pub referenced_id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub price: Option<CalculatedPrice>,
    pub cover: Option<Media>,
    pub payload: Option<LineItemPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemPayload {
    pub options: Vec<LineItemOption>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemOption {
    pub group: String,
    pub option: String,
}

/// A cart error or notice (e.g. product out of stock).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartError {
    pub key: Option<String>,
    pub level: Option<u8>,
    pub message: Option<String>,
    pub message_key: Option<String>,
}

/// Sales channel context returned by `/context`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesChannelContext {
    pub token: Option<String>,
    pub currency: Option<ContextCurrency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextCurrency {
    pub iso_code: Option<String>,
    pub symbol: Option<String>,
}

/// Cart errors arrive as a map keyed by error key, or as `[]` when empty.
/// Map order is kept.
fn deserialize_cart_errors<'de, D>(deserializer: D) -> Result<Vec<CartError>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CartErrorsVisitor;

    impl<'de> Visitor<'de> for CartErrorsVisitor {
        type Value = Vec<CartError>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map or list of cart errors")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut errors = Vec::new();
            while let Some(error) = seq.next_element::<CartError>()? {
                errors.push(error);
            }
            Ok(errors)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut errors = Vec::new();
            while let Some((_key, error)) = map.next_entry::<String, CartError>()? {
                errors.push(error);
            }
            Ok(errors)
        }
    }

    deserializer.deserialize_any(CartErrorsVisitor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_errors_as_map_keeps_order() {
        let cart: Cart = serde_json::from_str(
            r#"{
                "token": "tok",
                "errors": {
                    "zeta": {"message": "first", "messageKey": "z"},
                    "alpha": {"message": "second", "messageKey": "a"}
                }
            }"#,
        )
        .unwrap();
        let messages: Vec<_> = cart
            .errors
            .iter()
            .filter_map(|e| e.message.as_deref())
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_cart_errors_as_empty_list() {
        let cart: Cart = serde_json::from_str(r#"{"token": "tok", "errors": []}"#).unwrap();
        assert!(cart.errors.is_empty());
        assert_eq!(cart.token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_cart_errors_null() {
        let cart: Cart = serde_json::from_str(r#"{"errors": null}"#).unwrap();
        assert!(cart.errors.is_empty());
    }

    #[test]
    fn test_product_tolerates_nulls() {
        let product: Product = serde_json::from_str(
            r#"{"id": "p1", "parentId": null, "translated": {"name": null}, "children": null}"#,
        )
        .unwrap();
        assert_eq!(product.id.as_deref(), Some("p1"));
        assert!(product.parent_id.is_none());
        assert!(product.children.is_none());
    }

    #[test]
    fn test_listing_without_elements() {
        let listing: ProductListingResult = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(listing.elements.is_empty());
        assert_eq!(listing.total, Some(0));
    }
}
