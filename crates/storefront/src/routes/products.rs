//! Product route handlers.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;
use tracing::instrument;

use super::{Layout, not_found};
use crate::filters;
use crate::middleware::CspNonce;
use crate::shopware::{Image, Product, ProductVariant};
use crate::state::AppState;

/// Query parameter selecting a gallery image.
const IMAGE_PARAM: &str = "image";

/// Product page query: lower-cased option names mapped to values, plus `image`.
pub type SelectionQuery = BTreeMap<String, String>;

// =============================================================================
// Variant Selection
// =============================================================================

fn matches_selection(variant: &ProductVariant, params: &SelectionQuery) -> bool {
    variant
        .selected_options
        .iter()
        .all(|option| params.get(&option.name.to_lowercase()) == Some(&option.value))
}

/// Id to add to the cart for the current selection.
///
/// The first variant whose options all match the query wins. Otherwise a
/// single variant is used, and a simple product (or an incomplete selection)
/// falls back to the product id.
#[must_use]
pub fn selected_variant_id(product: &Product, params: &SelectionQuery) -> String {
    if let Some(variant) = product
        .variants
        .iter()
        .find(|variant| matches_selection(variant, params))
    {
        return variant.id.clone();
    }

    match product.variants.as_slice() {
        [only] => only.id.clone(),
        _ => product.id.clone(),
    }
}

fn selection_url(path: &str, params: &SelectionQuery) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect();

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", query.join("&"))
    }
}

/// A value button of an option group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValueView {
    pub value: String,
    pub url: String,
    pub active: bool,
    /// Whether some purchasable variant has this value together with the
    /// other selected options.
    pub available: bool,
}

/// An option group with links for each value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// Option groups of `product` with links that keep the rest of the selection.
#[must_use]
pub fn option_views(product: &Product, params: &SelectionQuery) -> Vec<OptionView> {
    let path = product.url();

    product
        .options
        .iter()
        .map(|option| {
            let key = option.name.to_lowercase();
            let values = option
                .values
                .iter()
                .map(|value| {
                    let mut next = params.clone();
                    next.remove(IMAGE_PARAM);
                    next.insert(key.clone(), value.clone());

                    // Only options the shopper picked constrain availability
                    let available = product.variants.iter().any(|variant| {
                        variant.available_for_sale
                            && variant.selected_options.iter().all(|o| {
                                next.get(&o.name.to_lowercase())
                                    .is_none_or(|selected| *selected == o.value)
                            })
                    });

                    OptionValueView {
                        value: value.clone(),
                        url: selection_url(&path, &next),
                        active: params.get(&key) == Some(value),
                        available,
                    }
                })
                .collect();

            OptionView {
                name: option.name.clone(),
                values,
            }
        })
        .collect()
}

/// A gallery thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub image: Image,
    pub url: String,
    pub active: bool,
}

/// Gallery of a product: the shown image and thumbnails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    pub current: Option<Image>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub thumbnails: Vec<GalleryImage>,
}

impl Gallery {
    /// Gallery with the image chosen by `?image=`, wrapping around at the ends.
    #[must_use]
    pub fn new(product: &Product, params: &SelectionQuery) -> Self {
        let images: Vec<&Image> = if product.images.is_empty() {
            std::iter::once(&product.featured_image)
                .filter(|image| !image.url.is_empty())
                .collect()
        } else {
            product.images.iter().collect()
        };

        let index = params
            .get(IMAGE_PARAM)
            .and_then(|i| i.parse::<usize>().ok())
            .filter(|i| *i < images.len())
            .unwrap_or(0);

        let path = product.url();
        let url = |i: usize| {
            let mut next = params.clone();
            next.insert(IMAGE_PARAM.to_string(), i.to_string());
            selection_url(&path, &next)
        };

        let count = images.len();
        let (previous_url, next_url) = if count > 1 {
            (
                Some(url(if index == 0 { count - 1 } else { index - 1 })),
                Some(url(if index + 1 < count { index + 1 } else { 0 })),
            )
        } else {
            (None, None)
        };

        Self {
            current: images.get(index).map(|image| (*image).clone()),
            previous_url,
            next_url,
            thumbnails: if count > 1 {
                images
                    .iter()
                    .enumerate()
                    .map(|(i, image)| GalleryImage {
                        image: (*image).clone(),
                        url: url(i),
                        active: i == index,
                    })
                    .collect()
            } else {
                Vec::new()
            },
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: Product,
    pub options: Vec<OptionView>,
    pub gallery: Gallery,
    pub selected_variant_id: String,
    /// Price of the selected variant, or the product price.
    pub price: String,
    pub related_products: Vec<Product>,
}

impl ProductTemplate {
    fn meta_title(&self) -> &str {
        if self.product.seo.title.is_empty() {
            &self.product.title
        } else {
            &self.product.seo.title
        }
    }

    /// Several variants exist and the query does not pick one yet.
    fn needs_selection(&self) -> bool {
        self.product.variants.len() > 1 && self.selected_variant_id == self.product.id
    }

    /// schema.org `Product` markup, safe to embed in a `<script>` element.
    fn structured_data(&self) -> String {
        let product = &self.product;
        let availability = if product.available_for_sale {
            "https://schema.org/InStock"
        } else {
            "https://schema.org/OutOfStock"
        };
        let data = serde_json::json!({
            "@context": "https://schema.org",
            "@type": "Product",
            "name": product.title,
            "description": product.description,
            "image": product.featured_image.url,
            "offers": {
                "@type": "AggregateOffer",
                "availability": availability,
                "priceCurrency": product.price_range.min_variant_price.currency_code,
                "highPrice": product.price_range.max_variant_price.amount,
                "lowPrice": product.price_range.min_variant_price.amount,
            },
        });
        data.to_string().replace("</", "<\\/")
    }
}

/// Display product detail page.
#[instrument(skip(state, cookies, nonce, params))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<SelectionQuery>,
    cookies: Cookies,
    nonce: CspNonce,
) -> Response {
    let (layout, product) = tokio::join!(
        Layout::load(&state, &cookies, nonce),
        state.catalog().get_product(&handle),
    );

    let Some(product) = product else {
        return not_found(layout);
    };

    let related_products = state
        .catalog()
        .get_product_recommendations(&product.id)
        .await;

    let selected_variant_id = selected_variant_id(&product, &params);
    let price = product
        .variants
        .iter()
        .find(|v| v.id == selected_variant_id)
        .map_or_else(
            || product.price_range.max_variant_price.display(),
            |v| v.price.display(),
        );

    ProductTemplate {
        layout,
        options: option_views(&product, &params),
        gallery: Gallery::new(&product, &params),
        selected_variant_id,
        price,
        related_products,
        product,
    }
    .into_response()
}
