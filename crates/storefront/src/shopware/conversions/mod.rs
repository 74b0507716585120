//! Conversion functions from Store API payloads to view models.
//!
//! Every conversion that builds storefront paths takes a `seo_urls` switch:
//! with SEO urls the paths use `seoPathInfo`, otherwise raw entity ids.

pub mod cart;
pub mod cms;
pub mod navigation;
pub mod products;

pub use cart::{cart_error_messages, transform_cart, transform_line_item};
pub use cms::{
    plain_html_content, transform_collection, transform_collection_to_list, transform_page,
    transform_sub_collection,
};
pub use navigation::transform_menu;
pub use products::{transform_handle, transform_product, transform_products};

use shopware_storefront_core::CurrencyCode;

use crate::shopware::schema::{Media, SeoUrl};
use crate::shopware::types::{Image, Money};

/// Render a Store API number the way the platform does (`19.99`, `20`).
/// Missing and zero amounts become `fallback`.
fn format_amount(value: Option<f64>, fallback: &str) -> String {
    value
        .filter(|v| v.abs() > f64::EPSILON)
        .map_or_else(|| fallback.to_string(), |v| v.to_string())
}

fn money(amount: String, currency: CurrencyCode) -> Money {
    Money {
        amount,
        currency_code: currency.code().to_string(),
    }
}

/// `seoPathInfo` of the first SEO url, if non-empty.
fn first_seo_path(seo_urls: Option<&Vec<SeoUrl>>) -> Option<&str> {
    seo_urls
        .and_then(|urls| urls.first())
        .and_then(|url| url.seo_path_info.as_deref())
        .filter(|path| !path.is_empty())
}

/// Convert a media entity into an image. Dimensions are only taken when a
/// width is known.
fn convert_image(media: Option<&Media>) -> Image {
    let Some(media) = media else {
        return Image::default();
    };

    let (width, height) = media
        .meta_data
        .as_ref()
        .and_then(|meta| meta.width.filter(|w| *w > 0).map(|w| (w, meta.height.unwrap_or(0))))
        .unwrap_or((0, 0));

    Image {
        url: media.url.clone().unwrap_or_default(),
        alt_text: media
            .translated
            .as_ref()
            .and_then(|t| t.alt.clone())
            .unwrap_or_default(),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopware::schema::MediaMetaData;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Some(19.99), "0"), "19.99");
        assert_eq!(format_amount(Some(20.0), "0"), "20");
        assert_eq!(format_amount(Some(0.0), "0"), "0");
        assert_eq!(format_amount(None, ""), "");
    }

    #[test]
    fn test_first_seo_path_skips_empty() {
        let urls = vec![SeoUrl {
            seo_path_info: Some(String::new()),
            ..Default::default()
        }];
        assert_eq!(first_seo_path(Some(&urls)), None);
        assert_eq!(first_seo_path(None), None);
    }

    #[test]
    fn test_convert_image_requires_width() {
        let media = Media {
            url: Some("https://cdn.example/a.jpg".to_string()),
            meta_data: Some(MediaMetaData {
                width: None,
                height: Some(300),
            }),
            ..Default::default()
        };
        let image = convert_image(Some(&media));
        assert_eq!(image.url, "https://cdn.example/a.jpg");
        assert_eq!((image.width, image.height), (0, 0));
        assert_eq!(convert_image(None), Image::default());
    }
}
