//! Product type conversion functions.

use shopware_storefront_core::CurrencyCode;

use crate::shopware::schema::{self, ProductListingResult};
use crate::shopware::types::{
    PriceRange, Product, ProductOption, ProductVariant, SelectedOption, Seo,
};

use super::{convert_image, first_seo_path, format_amount, money};

/// Convert every product of a listing.
#[must_use]
pub fn transform_products(
    listing: &ProductListingResult,
    seo_urls: bool,
    currency: CurrencyCode,
) -> Vec<Product> {
    listing
        .elements
        .iter()
        .map(|item| transform_product(item, seo_urls, currency))
        .collect()
}

/// Convert a single product. Options and variants are only built for parent
/// products.
#[must_use]
pub fn transform_product(item: &schema::Product, seo_urls: bool, currency: CurrencyCode) -> Product {
    let path = if seo_urls {
        first_seo_path(item.seo_urls.as_ref())
            .unwrap_or_default()
            .to_string()
    } else {
        item.parent_id
            .clone()
            .or_else(|| item.id.clone())
            .unwrap_or_default()
    };

    let translated = item.translated.as_ref();
    let total_price = item.calculated_price.as_ref().and_then(|p| p.total_price);
    let cheapest_price = item
        .calculated_cheapest_price
        .as_ref()
        .and_then(|p| p.total_price)
        .filter(|v| v.abs() > f64::EPSILON);

    Product {
        id: item.id.clone().unwrap_or_default(),
        path,
        handle: item.id.clone().unwrap_or_default(),
        available_for_sale: item.available.unwrap_or(false),
        title: translated
            .map_or_else(|| item.name.clone(), |t| t.name.clone())
            .unwrap_or_default(),
        description: translated
            .and_then(|t| t.meta_description.clone())
            .filter(|d| !d.is_empty())
            .or_else(|| item.meta_description.clone())
            .unwrap_or_default(),
        description_html: translated
            .and_then(|t| t.description.clone())
            .filter(|d| !d.is_empty())
            .or_else(|| item.description.clone())
            .unwrap_or_default(),
        options: transform_options(item),
        price_range: PriceRange {
            max_variant_price: money(format_amount(total_price, "0"), currency),
            // The listing price stands in for the cheapest variant price
            min_variant_price: money(
                cheapest_price.map_or_else(|| "0".to_string(), |_| format_amount(total_price, "0")),
                currency,
            ),
        },
        variants: transform_variants(item, currency),
        featured_image: convert_image(item.cover.as_ref().and_then(|c| c.media.as_ref())),
        images: item
            .media
            .iter()
            .flatten()
            .map(|m| convert_image(m.media.as_ref()))
            .collect(),
        seo: Seo {
            title: translated
                .and_then(|t| t.meta_title.clone().or_else(|| t.name.clone()))
                .or_else(|| item.name.clone())
                .unwrap_or_default(),
            description: translated
                .and_then(|t| t.meta_description.clone())
                .unwrap_or_default(),
        },
        tags: vec![String::new()],
        updated_at: item.updated_at.clone().unwrap_or_default(),
    }
}

/// Children of a parent product, or nothing for variants and simple products.
fn variant_children(parent: &schema::Product) -> &[schema::Product] {
    if parent.parent_id.is_some() {
        return &[];
    }
    parent.children.as_deref().unwrap_or_default()
}

/// Option groups of all children, in first-seen order with unique values.
fn transform_options(parent: &schema::Product) -> Vec<ProductOption> {
    let mut options: Vec<ProductOption> = Vec::new();

    let child_options = variant_children(parent)
        .iter()
        .flat_map(|child| child.options.iter().flatten());

    for option in child_options {
        let Some(group_name) = option.group.as_ref().and_then(|g| g.name.as_deref()) else {
            continue;
        };
        let value = option.name.clone().unwrap_or_default();
        let group_id = option.group_id.clone().unwrap_or_default();

        if let Some(existing) = options.iter_mut().find(|o| o.name == group_name) {
            existing.id = group_id;
            if !existing.values.contains(&value) {
                existing.values.push(value);
            }
        } else {
            options.push(ProductOption {
                id: group_id,
                name: group_name.to_string(),
                values: vec![value],
            });
        }
    }

    options
}

fn transform_variants(parent: &schema::Product, currency: CurrencyCode) -> Vec<ProductVariant> {
    variant_children(parent)
        .iter()
        .filter_map(|child| {
            let id = child.id.clone()?;
            let selected_options = child
                .options
                .iter()
                .flatten()
                .filter_map(|option| {
                    let group = option.group.as_ref()?;
                    Some(SelectedOption {
                        name: group.name.clone().unwrap_or_default(),
                        value: option.name.clone().unwrap_or_default(),
                    })
                })
                .collect();

            Some(ProductVariant {
                id,
                title: child
                    .name
                    .clone()
                    .or_else(|| child.translated.as_ref().and_then(|t| t.name.clone()))
                    .unwrap_or_default(),
                available_for_sale: child.available.unwrap_or(false),
                selected_options,
                price: money(
                    format_amount(
                        child.calculated_price.as_ref().and_then(|p| p.total_price),
                        "0",
                    ),
                    currency,
                ),
            })
        })
        .collect()
}

/// Join catch-all route segments into a handle.
#[must_use]
pub fn transform_handle<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopware::schema::{
        CalculatedPrice, Media, MediaMetaData, ProductMedia, PropertyGroup, PropertyGroupOption,
        SeoUrl, Translated,
    };

    fn option(group_id: &str, group: &str, value: &str) -> PropertyGroupOption {
        PropertyGroupOption {
            id: Some(format!("{group}-{value}")),
            name: Some(value.to_string()),
            group_id: Some(group_id.to_string()),
            group: Some(PropertyGroup {
                id: Some(group_id.to_string()),
                name: Some(group.to_string()),
            }),
        }
    }

    fn price(total: f64) -> Option<CalculatedPrice> {
        Some(CalculatedPrice {
            total_price: Some(total),
            ..Default::default()
        })
    }

    fn child(id: &str, options: Vec<PropertyGroupOption>, total: f64) -> schema::Product {
        schema::Product {
            id: Some(id.to_string()),
            parent_id: Some("parent".to_string()),
            name: Some(format!("Variant {id}")),
            available: Some(true),
            calculated_price: price(total),
            options: Some(options),
            ..Default::default()
        }
    }

    fn parent() -> schema::Product {
        schema::Product {
            id: Some("parent".to_string()),
            parent_id: None,
            name: Some("Shirt".to_string()),
            translated: Some(Translated {
                name: Some("Shirt (EN)".to_string()),
                description: Some("<p>Soft</p>".to_string()),
                meta_description: Some(String::new()),
                ..Default::default()
            }),
            meta_description: Some("A shirt".to_string()),
            available: Some(true),
            calculated_price: price(19.99),
            calculated_cheapest_price: price(15.0),
            seo_urls: Some(vec![SeoUrl {
                seo_path_info: Some("Shirt/SW1".to_string()),
                ..Default::default()
            }]),
            cover: Some(ProductMedia {
                id: None,
                media: Some(Media {
                    url: Some("https://cdn.example/shirt.jpg".to_string()),
                    meta_data: Some(MediaMetaData {
                        width: Some(800),
                        height: Some(600),
                    }),
                    ..Default::default()
                }),
            }),
            children: Some(vec![
                child(
                    "v1",
                    vec![option("g-size", "size", "M"), option("g-colour", "colour", "blue")],
                    19.99,
                ),
                child(
                    "v2",
                    vec![option("g-size", "size", "L"), option("g-colour", "colour", "blue")],
                    20.0,
                ),
                child("v3", vec![option("g-size", "size", "M")], 0.0),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_transform_product_fields() {
        let product = transform_product(&parent(), true, CurrencyCode::EUR);

        assert_eq!(product.id, "parent");
        assert_eq!(product.path, "Shirt/SW1");
        assert_eq!(product.title, "Shirt (EN)");
        assert_eq!(product.description, "A shirt");
        assert_eq!(product.description_html, "<p>Soft</p>");
        assert_eq!(product.price_range.max_variant_price.amount, "19.99");
        assert_eq!(product.price_range.min_variant_price.amount, "19.99");
        assert_eq!(product.price_range.min_variant_price.currency_code, "EUR");
        assert_eq!(product.featured_image.width, 800);
        assert_eq!(product.featured_image.height, 600);
        assert!(product.images.is_empty());
        assert_eq!(product.tags, vec![String::new()]);
        assert_eq!(product.url(), "/product/Shirt/SW1");
    }

    #[test]
    fn test_options_grouped_in_first_seen_order() {
        let product = transform_product(&parent(), true, CurrencyCode::EUR);
        assert_eq!(product.options.len(), 2);
        assert_eq!(product.options[0].name, "size");
        assert_eq!(product.options[0].id, "g-size");
        assert_eq!(product.options[0].values, vec!["M", "L"]);
        assert_eq!(product.options[1].name, "colour");
        assert_eq!(product.options[1].values, vec!["blue"]);
    }

    #[test]
    fn test_variants_carry_options_and_price() {
        let product = transform_product(&parent(), true, CurrencyCode::USD);
        assert_eq!(product.variants.len(), 3);
        let v2 = &product.variants[1];
        assert_eq!(v2.id, "v2");
        assert_eq!(v2.title, "Variant v2");
        assert_eq!(v2.price.amount, "20");
        assert_eq!(v2.price.currency_code, "USD");
        assert_eq!(
            v2.selected_options,
            vec![
                SelectedOption {
                    name: "size".to_string(),
                    value: "L".to_string()
                },
                SelectedOption {
                    name: "colour".to_string(),
                    value: "blue".to_string()
                },
            ]
        );
        assert_eq!(product.variants[2].price.amount, "0");
    }

    #[test]
    fn test_variant_product_has_no_options() {
        let variant = child("v1", vec![option("g-size", "size", "M")], 10.0);
        let product = transform_product(&variant, false, CurrencyCode::EUR);
        assert!(product.options.is_empty());
        assert!(product.variants.is_empty());
        assert_eq!(product.path, "parent");
        assert_eq!(product.price_range.min_variant_price.amount, "0");
    }

    #[test]
    fn test_missing_seo_url_gives_empty_path() {
        let mut product = parent();
        product.seo_urls = None;
        assert_eq!(transform_product(&product, true, CurrencyCode::EUR).path, "");
        assert_eq!(transform_product(&product, false, CurrencyCode::EUR).path, "parent");
    }

    #[test]
    fn test_transform_products_listing() {
        let listing = ProductListingResult {
            elements: vec![parent(), child("v1", vec![], 5.0)],
            total: Some(2),
            limit: Some(15),
            page: Some(1),
        };
        let products = transform_products(&listing, true, CurrencyCode::EUR);
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].title, "Variant v1");
    }

    #[test]
    fn test_transform_handle() {
        assert_eq!(transform_handle(["Clothing", "Shirts"]), "Clothing/Shirts");
        assert_eq!(transform_handle(Vec::<String>::new()), "");
    }
}
