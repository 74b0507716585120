//! Product listing sort options.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort keys offered by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortKey {
    #[default]
    Relevance,
    BestSelling,
    CreatedAt,
    Price,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "RELEVANCE",
            Self::BestSelling => "BEST_SELLING",
            Self::CreatedAt => "CREATED_AT",
            Self::Price => "PRICE",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry in the "Sort by" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub title: &'static str,
    /// Query string value; `None` for the default option.
    pub slug: Option<&'static str>,
    pub sort_key: SortKey,
    pub reverse: bool,
}

/// All sort options, default first.
pub const SORT_OPTIONS: [SortOption; 5] = [
    SortOption {
        title: "Relevance",
        slug: None,
        sort_key: SortKey::Relevance,
        reverse: false,
    },
    SortOption {
        title: "Trending",
        slug: Some("trending-desc"),
        sort_key: SortKey::BestSelling,
        reverse: false,
    },
    SortOption {
        title: "Latest arrivals",
        slug: Some("latest-desc"),
        sort_key: SortKey::CreatedAt,
        reverse: true,
    },
    SortOption {
        title: "Price: Low to high",
        slug: Some("price-asc"),
        sort_key: SortKey::Price,
        reverse: false,
    },
    SortOption {
        title: "Price: High to low",
        slug: Some("price-desc"),
        sort_key: SortKey::Price,
        reverse: true,
    },
];

impl SortOption {
    /// The option used when no (or an unknown) slug is given.
    #[must_use]
    pub const fn default_option() -> Self {
        SORT_OPTIONS[0]
    }

    /// Look up an option by its query string slug.
    #[must_use]
    pub fn from_slug(slug: Option<&str>) -> Self {
        slug.filter(|s| !s.is_empty())
            .and_then(|s| SORT_OPTIONS.iter().find(|o| o.slug == Some(s)))
            .copied()
            .unwrap_or_else(Self::default_option)
    }
}

impl Default for SortOption {
    fn default() -> Self {
        Self::default_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slug_finds_option() {
        let option = SortOption::from_slug(Some("price-desc"));
        assert_eq!(option.sort_key, SortKey::Price);
        assert!(option.reverse);
    }

    #[test]
    fn test_from_slug_defaults_to_relevance() {
        assert_eq!(SortOption::from_slug(None).sort_key, SortKey::Relevance);
        assert_eq!(SortOption::from_slug(Some("")).sort_key, SortKey::Relevance);
        assert_eq!(
            SortOption::from_slug(Some("cheapest")).sort_key,
            SortKey::Relevance
        );
    }

    #[test]
    fn test_only_default_option_has_no_slug() {
        let without_slug = SORT_OPTIONS.iter().filter(|o| o.slug.is_none()).count();
        assert_eq!(without_slug, 1);
        assert!(SortOption::default_option().slug.is_none());
    }
}
