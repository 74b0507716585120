//! Navigation tree conversions.

use shopware_storefront_core::NavigationType;

use crate::shopware::schema::Category;
use crate::shopware::types::{Menu, MenuKind};

use super::first_seo_path;

/// Convert a navigation tree into menu entries.
///
/// Footer entries link to CMS pages, all others to category listings.
#[must_use]
pub fn transform_menu(
    categories: &[Category],
    navigation_type: NavigationType,
    seo_urls: bool,
) -> Vec<Menu> {
    categories
        .iter()
        .map(|item| transform_menu_item(item, navigation_type, seo_urls))
        .collect()
}

fn transform_menu_item(item: &Category, navigation_type: NavigationType, seo_urls: bool) -> Menu {
    let prefix = navigation_type.path_prefix();
    let path = if seo_urls {
        first_seo_path(item.seo_urls.as_ref())
            .map(|seo| format!("{prefix}/{seo}"))
            .unwrap_or_default()
    } else {
        format!("{prefix}/{}", item.id.as_deref().unwrap_or_default())
    };

    let children = item.children.as_deref().unwrap_or_default();

    Menu {
        id: item.id.clone().unwrap_or_default(),
        title: item.name.clone().unwrap_or_default(),
        path,
        kind: if children.is_empty() {
            MenuKind::Link
        } else {
            MenuKind::Headline
        },
        children: transform_menu(children, navigation_type, seo_urls),
    }
}
