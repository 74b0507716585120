//! Store API criteria payloads.
//!
//! A [`Criteria`] is the JSON body the Store API accepts for every search
//! style endpoint (`/product`, `/category`, `/seo-url`, ...). The builders
//! below produce the payloads the storefront pages need.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use shopware_storefront_core::{RouteName, SortKey};

/// Named associations to load alongside the main entity.
pub type Associations = BTreeMap<String, Association>;

/// Search criteria sent as request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Criteria {
    /// Page of an entity search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page of a product listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Free text search term.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<Filter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<FieldSorting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<Associations>,
}

impl Criteria {
    /// Merge `sorting` into this criteria. Fields set on `sorting` win.
    #[must_use]
    pub fn with_sorting(mut self, sorting: Self) -> Self {
        if sorting.page.is_some() {
            self.page = sorting.page;
        }
        if sorting.p.is_some() {
            self.p = sorting.p;
        }
        if sorting.limit.is_some() {
            self.limit = sorting.limit;
        }
        if sorting.term.is_some() {
            self.term = sorting.term;
        }
        if sorting.filter.is_some() {
            self.filter = sorting.filter;
        }
        if sorting.sort.is_some() {
            self.sort = sorting.sort;
        }
        if sorting.associations.is_some() {
            self.associations = sorting.associations;
        }
        self
    }
}

/// Nested association criteria. Serializes to `{}` when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Association {
    #[serde(skip_serializing_if = "Associations::is_empty")]
    pub associations: Associations,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Filter>,
}

impl Association {
    /// Association with nested associations.
    #[must_use]
    pub fn nested<const N: usize>(children: [(&str, Self); N]) -> Self {
        Self {
            associations: associations(children),
            filter: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter.push(filter);
        self
    }
}

fn associations<const N: usize>(entries: [(&str, Association); N]) -> Associations {
    entries
        .into_iter()
        .map(|(name, assoc)| (name.to_string(), assoc))
        .collect()
}

/// Logical operator of `multi` and `not` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    And,
    Or,
}

/// A Store API filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Filter {
    Equals {
        field: String,
        value: Value,
    },
    Contains {
        field: String,
        value: Value,
    },
    Multi {
        operator: FilterOperator,
        queries: Vec<Filter>,
    },
    Not {
        operator: FilterOperator,
        queries: Vec<Filter>,
    },
}

impl Filter {
    #[must_use]
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Self::Contains {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort by a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSorting {
    pub field: String,
    pub order: SortOrder,
}

impl FieldSorting {
    fn new(field: &str, order: SortOrder) -> Self {
        Self {
            field: field.to_string(),
            order,
        }
    }
}

// =============================================================================
// Product Criteria
// =============================================================================

fn product_associations() -> Associations {
    let options = || Association::nested([("group", Association::default())]);
    associations([
        ("options", options()),
        ("media", Association::default()),
        ("seoUrls", Association::default()),
        (
            "children",
            Association::nested([
                ("options", options()),
                ("media", Association::default()),
                ("seoUrls", Association::default()),
            ]),
        ),
    ])
}

/// Product listing criteria. Uses the listing page parameter `p`.
#[must_use]
pub fn default_products_criteria(page: u32, limit: u32) -> Criteria {
    Criteria {
        p: Some(page),
        limit: Some(limit),
        associations: Some(product_associations()),
        filter: Some(Vec::new()),
        ..Default::default()
    }
}

/// Criteria loading a single product by id.
#[must_use]
pub fn default_product_criteria(product_id: &str, page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        associations: Some(product_associations()),
        filter: Some(vec![Filter::equals("id", product_id)]),
        ..Default::default()
    }
}

/// Criteria for the `/search` endpoint.
#[must_use]
pub fn default_search_products_criteria(query: &str, page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        term: Some(query.to_string()),
        associations: Some(associations([
            ("options", Association::default()),
            ("media", Association::default()),
            ("seoUrls", Association::default()),
            (
                "children",
                Association::nested([
                    ("options", Association::default()),
                    ("media", Association::default()),
                    ("seoUrls", Association::default()),
                ]),
            ),
        ])),
        ..Default::default()
    }
}

/// Criteria for product cross-sellings.
#[must_use]
pub fn default_cross_selling_criteria(page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        associations: Some(associations([
            ("options", Association::default()),
            ("media", Association::default()),
            ("seoUrls", Association::default()),
        ])),
        filter: Some(vec![Filter::equals("active", true)]),
        ..Default::default()
    }
}

// =============================================================================
// Category Criteria
// =============================================================================

#[must_use]
pub fn default_category_criteria(page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        associations: Some(associations([
            ("media", Association::default()),
            ("cmsPage", Association::default()),
        ])),
        ..Default::default()
    }
}

/// Category criteria including the full CMS page tree (sections, blocks, slots).
#[must_use]
pub fn default_category_with_cms_criteria(page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        associations: Some(associations([
            ("media", Association::default()),
            (
                "cmsPage",
                Association::nested([(
                    "sections",
                    Association::nested([(
                        "blocks",
                        Association::nested([("slots", Association::default())]),
                    )]),
                )]),
            ),
        ])),
        ..Default::default()
    }
}

/// Categories worth pre-rendering: everything except root level, inactive,
/// landing/CMS pages, links, empty and footer categories.
#[must_use]
pub fn static_collection_criteria(page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        associations: Some(associations([
            ("cmsPage", Association::default()),
            ("seoUrls", Association::default()),
        ])),
        filter: Some(vec![Filter::Not {
            operator: FilterOperator::Or,
            queries: vec![
                Filter::equals("level", 1),
                Filter::equals("active", false),
                Filter::equals("cmsPage.type", "landingpage"),
                Filter::equals("cmsPage.type", "page"),
                Filter::equals("type", "link"),
                Filter::equals("childCount", 0),
                Filter::contains("breadcrumb", "Footer"),
            ],
        }]),
        ..Default::default()
    }
}

/// Category by id with its active children and their SEO urls.
#[must_use]
pub fn default_sub_categories_criteria(category_id: &str, page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        associations: Some(associations([
            ("cmsPage", Association::default()),
            (
                "children",
                Association::nested([("seoUrls", Association::default())])
                    .with_filter(Filter::equals("active", true)),
            ),
        ])),
        filter: Some(vec![Filter::equals("id", category_id)]),
        ..Default::default()
    }
}

// =============================================================================
// SEO URL Criteria
// =============================================================================

/// Matches a SEO path with or without trailing slash.
#[must_use]
pub fn seo_url_criteria(handle: &str, page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        filter: Some(vec![Filter::Multi {
            operator: FilterOperator::Or,
            queries: vec![
                Filter::equals("seoPathInfo", format!("{handle}/")),
                Filter::equals("seoPathInfo", handle),
            ],
        }]),
        ..Default::default()
    }
}

#[must_use]
pub fn seo_urls_by_route_criteria(route: RouteName, page: u32, limit: u32) -> Criteria {
    Criteria {
        page: Some(page),
        limit: Some(limit),
        filter: Some(vec![Filter::equals("routeName", route.as_str())]),
        ..Default::default()
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Criteria carrying only the sort for a storefront sort option.
#[must_use]
pub fn sorting_criteria(sort_key: Option<SortKey>, reverse: Option<bool>) -> Criteria {
    let sorting = match (sort_key, reverse) {
        (Some(SortKey::CreatedAt), Some(true)) => FieldSorting::new("createdAt", SortOrder::Desc),
        (Some(SortKey::Price), Some(true)) => FieldSorting::new("price", SortOrder::Desc),
        (Some(SortKey::Price), Some(false)) => FieldSorting::new("price", SortOrder::Asc),
        (Some(SortKey::BestSelling), Some(false)) => FieldSorting::new("sales", SortOrder::Desc),
        _ => FieldSorting::new("availableStock", SortOrder::Desc),
    };

    Criteria {
        sort: Some(vec![sorting]),
        ..Default::default()
    }
}
