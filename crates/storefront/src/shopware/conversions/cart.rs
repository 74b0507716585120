//! Cart type conversion functions.

use shopware_storefront_core::CurrencyCode;

use crate::shopware::schema::{self, LineItem};
use crate::shopware::types::{
    Cart, CartCost, CartItem, CartItemCost, Image, Merchandise, PriceRange, Product,
    SelectedOption, Seo,
};

use super::{format_amount, money};

/// Convert a Store API cart. A missing cart becomes an empty one.
#[must_use]
pub fn transform_cart(
    cart: Option<&schema::Cart>,
    checkout_url: &str,
    currency: CurrencyCode,
) -> Cart {
    let price = cart.and_then(|c| c.price.as_ref());
    let line_items = cart.map(|c| c.line_items.as_slice()).unwrap_or_default();

    let total_tax = price.map_or(0.0, |p| p.calculated_taxes.iter().map(|t| t.tax).sum::<f64>());
    // Summing floats drifts past the cent
    let total_tax = (total_tax * 100.0).round() / 100.0;

    Cart {
        id: cart.and_then(|c| c.token.clone()).unwrap_or_default(),
        checkout_url: checkout_url.to_string(),
        cost: CartCost {
            subtotal_amount: money(
                format_amount(price.and_then(|p| p.position_price), "0"),
                currency,
            ),
            total_amount: money(format_amount(price.and_then(|p| p.total_price), "0"), currency),
            total_tax_amount: money(format_amount(Some(total_tax), "0"), currency),
        },
        lines: line_items
            .iter()
            .map(|item| transform_line_item(item, currency))
            .collect(),
        total_quantity: line_items.iter().filter_map(|item| item.quantity).sum(),
    }
}

/// Convert a cart line item.
#[must_use]
pub fn transform_line_item(item: &LineItem, currency: CurrencyCode) -> CartItem {
    let referenced_id = item.referenced_id.clone().unwrap_or_default();
    let label = item.label.clone().unwrap_or_default();
    let description = item.description.clone().unwrap_or_default();
    let payload = item.payload.as_ref();

    let total_amount = item
        .price
        .as_ref()
        .and_then(|p| p.total_price)
        .map(|v| v.to_string())
        .unwrap_or_default();

    let featured_image = item.cover.as_ref().map_or_else(Image::default, |cover| {
        let meta = cover.meta_data.as_ref();
        Image {
            url: cover.url.clone().unwrap_or_default(),
            alt_text: cover
                .media
                .as_ref()
                .and_then(|m| {
                    m.translated
                        .as_ref()
                        .and_then(|t| t.alt.clone())
                        .or_else(|| m.alt.clone())
                })
                .or_else(|| cover.translated.as_ref().and_then(|t| t.alt.clone()))
                .or_else(|| cover.alt.clone())
                .unwrap_or_default(),
            width: meta.and_then(|m| m.width).unwrap_or(0),
            height: meta.and_then(|m| m.height).unwrap_or(0),
        }
    });

    let empty_price = || money(String::new(), currency);

    CartItem {
        id: item.id.clone().unwrap_or_default(),
        quantity: item.quantity.unwrap_or(0),
        cost: CartItemCost {
            total_amount: money(total_amount, currency),
        },
        merchandise: Merchandise {
            id: referenced_id.clone(),
            title: label.clone(),
            selected_options: payload
                .map(|p| {
                    p.options
                        .iter()
                        .map(|o| SelectedOption {
                            name: o.group.clone(),
                            value: o.option.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            product: Box::new(Product {
                id: referenced_id.clone(),
                path: referenced_id.clone(),
                handle: referenced_id,
                available_for_sale: true,
                title: label.clone(),
                description: description.clone(),
                description_html: description.clone(),
                options: Vec::new(),
                price_range: PriceRange {
                    min_variant_price: empty_price(),
                    max_variant_price: empty_price(),
                },
                variants: Vec::new(),
                featured_image,
                images: Vec::new(),
                seo: Seo {
                    title: label,
                    description,
                },
                tags: Vec::new(),
                updated_at: payload
                    .and_then(|p| p.updated_at.clone().or_else(|| p.created_at.clone()))
                    .unwrap_or_default(),
            }),
        },
    }
}

/// Concatenated messages of cart errors that carry a message key.
#[must_use]
pub fn cart_error_messages(cart: &schema::Cart) -> String {
    cart.errors
        .iter()
        .filter(|e| e.message_key.is_some())
        .filter_map(|e| e.message.as_deref())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cart_json() -> schema::Cart {
        serde_json::from_str(
            r#"{
                "token": "ctx-token",
                "price": {
                    "positionPrice": 59.97,
                    "totalPrice": 64.97,
                    "calculatedTaxes": [{"tax": 8.1, "taxRate": 19, "price": 50}, {"tax": 1.2, "taxRate": 7, "price": 14.97}]
                },
                "lineItems": [
                    {
                        "id": "line-1",
                        "referencedId": "variant-1",
                        "label": "Shirt",
                        "quantity": 2,
                        "price": {"totalPrice": 39.98},
                        "cover": {"url": "https://cdn.example/a.jpg", "alt": "cover", "metaData": {"width": 100, "height": 50}},
                        "payload": {"options": [{"group": "size", "option": "M"}], "createdAt": "2024-01-01"}
                    },
                    {
                        "id": "line-2",
                        "referencedId": "variant-2",
                        "label": "Hat",
                        "quantity": 1,
                        "price": {"totalPrice": 20}
                    }
                ],
                "errors": {
                    "stock": {"message": "Only 2 left. ", "messageKey": "product-stock-reached"},
                    "internal": {"message": "No key"}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_transform_cart_totals() {
        let cart = transform_cart(Some(&cart_json()), "https://shop.example/checkout", CurrencyCode::EUR);

        assert_eq!(cart.id, "ctx-token");
        assert_eq!(cart.checkout_url, "https://shop.example/checkout");
        assert_eq!(cart.cost.subtotal_amount.amount, "59.97");
        assert_eq!(cart.cost.total_amount.amount, "64.97");
        assert_eq!(cart.cost.total_tax_amount.amount, "9.3");
        assert_eq!(cart.total_quantity, 3);
        assert_eq!(cart.lines.len(), 2);
    }

    #[test]
    fn test_transform_missing_cart() {
        let cart = transform_cart(None, "/checkout", CurrencyCode::EUR);
        assert!(cart.id.is_empty());
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity, 0);
        assert_eq!(cart.cost.total_amount.amount, "0");
        assert_eq!(cart.cost.total_tax_amount.amount, "0");
    }

    #[test]
    fn test_transform_line_item() {
        let cart = cart_json();
        let line = transform_line_item(&cart.line_items[0], CurrencyCode::EUR);

        assert_eq!(line.id, "line-1");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.cost.total_amount.amount, "39.98");
        assert_eq!(line.merchandise.id, "variant-1");
        assert_eq!(line.merchandise.title, "Shirt");
        assert_eq!(line.merchandise.selected_options[0].value, "M");
        assert_eq!(line.merchandise.product.featured_image.alt_text, "cover");
        assert_eq!(line.merchandise.product.featured_image.width, 100);
        assert_eq!(line.merchandise.product.updated_at, "2024-01-01");

        let hat = transform_line_item(&cart.line_items[1], CurrencyCode::EUR);
        assert_eq!(hat.cost.total_amount.amount, "20");
        assert!(hat.merchandise.selected_options.is_empty());
    }

    #[test]
    fn test_cart_error_messages_need_message_key() {
        assert_eq!(cart_error_messages(&cart_json()), "Only 2 left. ");
        assert_eq!(cart_error_messages(&schema::Cart::default()), "");
    }
}
