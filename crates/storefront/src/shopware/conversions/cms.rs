//! Category, collection and CMS page conversions.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::shopware::schema::{Category, CmsPage, EntitySearchResult, SeoUrl};
use crate::shopware::types::{Collection, CollectionDetail, ListItem, Page, Seo};

/// Handle prefix of the Shopware demo data navigation root.
const DEMO_HANDLE_PREFIX: &str = "Welcome-to-Shopware-Frontends/";

/// Matches opening and closing `h1` tags. Headings come from the template.
static H1_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(</?h)(1)").expect("Invalid regex"));

fn category_title(category: &Category) -> String {
    category
        .translated
        .as_ref()
        .and_then(|t| t.meta_title.clone())
        .or_else(|| category.name.clone())
        .unwrap_or_default()
}

fn category_meta_description(category: &Category) -> String {
    category
        .translated
        .as_ref()
        .and_then(|t| t.meta_description.clone())
        .or_else(|| category.description.clone())
        .unwrap_or_default()
}

fn category_seo(category: &Category) -> Seo {
    Seo {
        title: category_title(category),
        description: category_meta_description(category),
    }
}

/// Convert a category into a CMS page.
#[must_use]
pub fn transform_page(category: &Category, seo_url: Option<&SeoUrl>) -> Page {
    let body = category.cms_page.as_ref().map_or_else(
        || category.description.clone().unwrap_or_default(),
        plain_html_content,
    );

    Page {
        id: seo_url
            .and_then(|s| s.id.clone())
            .or_else(|| category.id.clone())
            .unwrap_or_default(),
        title: category_title(category),
        handle: seo_url
            .and_then(|s| s.seo_path_info.clone())
            .or_else(|| category.id.clone())
            .unwrap_or_default(),
        body,
        body_summary: category_meta_description(category),
        seo: category_seo(category),
        created_at: seo_url
            .and_then(|s| s.created_at.clone())
            .or_else(|| category.created_at.clone())
            .unwrap_or_default(),
        updated_at: seo_url
            .and_then(|s| s.updated_at.clone())
            .or_else(|| category.updated_at.clone())
            .unwrap_or_default(),
        route_name: seo_url.and_then(|s| s.route_name.clone()),
        foreign_key: seo_url
            .and_then(|s| s.foreign_key.clone())
            .or_else(|| category.id.clone()),
    }
}

/// Text of a slot's `content` config: either a string or `{"value": "..."}`.
fn slot_content(field_config: &Value) -> Option<&str> {
    match field_config.get("content")? {
        Value::String(content) => Some(content),
        Value::Object(object) => object.get("value").and_then(Value::as_str),
        _ => None,
    }
}

/// Concatenate the `content` slots of a CMS page in section, block and slot
/// order, leaving out fragments that contain an `h1`.
#[must_use]
pub fn plain_html_content(cms_page: &CmsPage) -> String {
    cms_page
        .sections
        .iter()
        .flatten()
        .flat_map(|section| section.blocks.iter().flatten())
        .flat_map(|block| block.slots.iter().flatten())
        .filter(|slot| slot.slot.as_deref() == Some("content"))
        .filter_map(|slot| slot.field_config.as_ref().and_then(slot_content))
        .filter(|content| !content.is_empty())
        .filter(|content| !H1_TAG_RE.is_match(content))
        .collect()
}

/// Convert a category into listing metadata.
#[must_use]
pub fn transform_collection(category: &Category, seo_url: Option<&SeoUrl>) -> CollectionDetail {
    let path = match seo_url {
        Some(seo) => seo.seo_path_info.clone().unwrap_or_default(),
        None => category.id.clone().unwrap_or_default(),
    };

    CollectionDetail {
        handle: seo_url
            .and_then(|s| s.seo_path_info.clone())
            .or_else(|| category.id.clone())
            .unwrap_or_default(),
        title: category_title(category),
        description: category.description.clone().unwrap_or_default(),
        featured_image: category
            .media
            .as_ref()
            .and_then(|m| m.url.clone())
            .unwrap_or_default(),
        seo: category_seo(category),
        updated_at: seo_url
            .and_then(|s| s.updated_at.clone().or_else(|| s.created_at.clone()))
            .or_else(|| category.updated_at.clone())
            .or_else(|| category.created_at.clone()),
        path: format!("/search/{path}"),
    }
}

/// Visible, non-link children of the first category in `list`.
#[must_use]
pub fn transform_sub_collection(
    list: &EntitySearchResult<Category>,
    parent_name: Option<&str>,
    seo_urls: bool,
) -> Vec<Collection> {
    let Some(children) = list.elements.first().and_then(|c| c.children.as_ref()) else {
        return Vec::new();
    };

    children
        .iter()
        .filter(|item| item.visible.unwrap_or(false))
        .filter(|item| item.kind.as_deref() != Some("link"))
        .filter_map(|item| {
            let handle = match (&item.seo_urls, seo_urls) {
                (Some(urls), true) => find_handle(urls, parent_name),
                _ => item.id.clone().unwrap_or_default(),
            };
            if handle.is_empty() {
                return None;
            }

            Some(Collection {
                handle,
                title: category_title(item),
                description: item.description.clone().unwrap_or_default(),
                seo: category_seo(item),
                child_count: item.child_count.unwrap_or(0),
                updated_at: item
                    .updated_at
                    .clone()
                    .or_else(|| item.created_at.clone())
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// Longest canonical, non-deleted SEO path that contains the parent name.
fn find_handle(seo_urls: &[SeoUrl], parent_name: Option<&str>) -> String {
    let parent = parent_name.unwrap_or_default();
    let mut handle = "";

    for url in seo_urls {
        let Some(path) = url.seo_path_info.as_deref() else {
            continue;
        };
        if !url.is_deleted.unwrap_or(false)
            && url.is_canonical.unwrap_or(false)
            && path.len() > handle.len()
            && path.contains(parent)
        {
            handle = path;
        }
    }

    handle.to_string()
}

/// Links for a sub-collection list. Categories without children are content
/// pages.
#[must_use]
pub fn transform_collection_to_list(collections: &[Collection]) -> Vec<ListItem> {
    collections
        .iter()
        .map(|item| {
            let prefix = if item.child_count == 0 {
                "/cms"
            } else {
                "/search"
            };
            ListItem {
                title: item.title.clone(),
                path: format!("{prefix}/{}", item.handle.replacen(DEMO_HANDLE_PREFIX, "", 1)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopware::schema::{CmsBlock, CmsSection, CmsSlot, Translated};
    use serde_json::json;

    fn slot(name: &str, config: Value) -> CmsSlot {
        CmsSlot {
            slot: Some(name.to_string()),
            kind: Some("text".to_string()),
            field_config: Some(config),
        }
    }

    fn page_with_slots(slots: Vec<CmsSlot>) -> CmsPage {
        CmsPage {
            sections: Some(vec![CmsSection {
                blocks: Some(vec![CmsBlock { slots: Some(slots) }]),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_html_content_skips_h1_fragments() {
        let page = page_with_slots(vec![
            slot("content", json!({"content": "<h1>Title</h1>"})),
            slot("content", json!({"content": "<p>First</p>"})),
            slot("content", json!({"content": {"value": "<p>Second</p>"}})),
            slot("title", json!({"content": "<p>Ignored</p>"})),
            slot("content", json!({"content": "<h2>Kept</h2>"})),
        ]);

        assert_eq!(
            plain_html_content(&page),
            "<p>First</p><p>Second</p><h2>Kept</h2>"
        );
    }

    #[test]
    fn test_plain_html_content_empty_page() {
        assert_eq!(plain_html_content(&CmsPage::default()), "");
    }

    #[test]
    fn test_transform_page_prefers_seo_url() {
        let category = Category {
            id: Some("cat".to_string()),
            name: Some("About".to_string()),
            description: Some("Description".to_string()),
            translated: Some(Translated {
                meta_title: Some("About us".to_string()),
                ..Default::default()
            }),
            updated_at: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        let seo = SeoUrl {
            id: Some("seo".to_string()),
            foreign_key: Some("cat".to_string()),
            seo_path_info: Some("About/".to_string()),
            route_name: Some("frontend.navigation.page".to_string()),
            ..Default::default()
        };

        let page = transform_page(&category, Some(&seo));

        assert_eq!(page.id, "seo");
        assert_eq!(page.handle, "About/");
        assert_eq!(page.title, "About us");
        assert_eq!(page.body, "Description");
        assert_eq!(page.body_summary, "Description");
        assert_eq!(page.updated_at, "2024-01-01");
        assert_eq!(page.route_name.as_deref(), Some("frontend.navigation.page"));
        assert_eq!(page.foreign_key.as_deref(), Some("cat"));
    }

    #[test]
    fn test_transform_page_with_cms_body() {
        let category = Category {
            id: Some("cat".to_string()),
            description: Some("Fallback".to_string()),
            cms_page: Some(page_with_slots(vec![slot(
                "content",
                json!({"content": "<p>Body</p>"}),
            )])),
            ..Default::default()
        };
        let page = transform_page(&category, None);
        assert_eq!(page.body, "<p>Body</p>");
        assert_eq!(page.handle, "cat");
        assert_eq!(page.foreign_key.as_deref(), Some("cat"));
    }

    #[test]
    fn test_transform_collection_path() {
        let category = Category {
            id: Some("cat".to_string()),
            name: Some("Clothing".to_string()),
            ..Default::default()
        };
        assert_eq!(transform_collection(&category, None).path, "/search/cat");

        let seo = SeoUrl {
            seo_path_info: Some("Clothing/".to_string()),
            created_at: Some("2024-02-02".to_string()),
            ..Default::default()
        };
        let detail = transform_collection(&category, Some(&seo));
        assert_eq!(detail.path, "/search/Clothing/");
        assert_eq!(detail.handle, "Clothing/");
        assert_eq!(detail.updated_at.as_deref(), Some("2024-02-02"));
    }

    fn child(id: &str, visible: bool, kind: &str, seo: Vec<(&str, bool)>) -> Category {
        Category {
            id: Some(id.to_string()),
            name: Some(id.to_uppercase()),
            visible: Some(visible),
            kind: Some(kind.to_string()),
            child_count: Some(2),
            seo_urls: Some(
                seo.into_iter()
                    .map(|(path, canonical)| SeoUrl {
                        seo_path_info: Some(path.to_string()),
                        is_canonical: Some(canonical),
                        is_deleted: Some(false),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_transform_sub_collection_filters_and_finds_handle() {
        let list = EntitySearchResult {
            elements: vec![Category {
                children: Some(vec![
                    child(
                        "shirts",
                        true,
                        "page",
                        vec![
                            ("Clothing/Shirts/", false),
                            ("Clothing/Shirts/", true),
                            ("Clothing/Shirts-and-Tops/", true),
                            ("Other/Shirts-and-Tops-Long/", true),
                        ],
                    ),
                    child("hidden", false, "page", vec![("Clothing/Hidden/", true)]),
                    child("link", true, "link", vec![("Clothing/Link/", true)]),
                    child("orphan", true, "page", vec![("Clothing/Orphan/", false)]),
                ]),
                ..Default::default()
            }],
            ..Default::default()
        };

        let collections = transform_sub_collection(&list, Some("Clothing"), true);
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].handle, "Clothing/Shirts-and-Tops/");
        assert_eq!(collections[0].title, "SHIRTS");

        let by_id = transform_sub_collection(&list, Some("Clothing"), false);
        let handles: Vec<_> = by_id.iter().map(|c| c.handle.as_str()).collect();
        assert_eq!(handles, vec!["shirts", "orphan"]);
    }

    #[test]
    fn test_transform_sub_collection_empty_list() {
        assert!(transform_sub_collection(&EntitySearchResult::default(), None, true).is_empty());
    }

    #[test]
    fn test_transform_collection_to_list() {
        let collection = |handle: &str, child_count| Collection {
            handle: handle.to_string(),
            title: handle.to_string(),
            description: String::new(),
            seo: Seo::default(),
            child_count,
            updated_at: String::new(),
        };

        let list = transform_collection_to_list(&[
            collection("Welcome-to-Shopware-Frontends/Clothing/", 3),
            collection("Imprint/", 0),
        ]);

        assert_eq!(list[0].path, "/search/Clothing/");
        assert_eq!(list[1].path, "/cms/Imprint/");
    }
}
