//! Store API navigation types and SEO route names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownValue {
    kind: &'static str,
    value: String,
}

impl UnknownValue {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Navigation trees configured in the sales channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationType {
    #[default]
    MainNavigation,
    FooterNavigation,
    ServiceNavigation,
}

impl NavigationType {
    /// Identifier used in the `/navigation/{activeId}/{rootId}` path.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MainNavigation => "main-navigation",
            Self::FooterNavigation => "footer-navigation",
            Self::ServiceNavigation => "service-navigation",
        }
    }

    /// Footer entries point at CMS pages; everything else at listings.
    #[must_use]
    pub const fn path_prefix(&self) -> &'static str {
        match self {
            Self::FooterNavigation => "/cms",
            Self::MainNavigation | Self::ServiceNavigation => "/search",
        }
    }
}

impl fmt::Display for NavigationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main-navigation" => Ok(Self::MainNavigation),
            "footer-navigation" => Ok(Self::FooterNavigation),
            "service-navigation" => Ok(Self::ServiceNavigation),
            _ => Err(UnknownValue::new("navigation type", s)),
        }
    }
}

/// Route names stored on SEO url entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteName {
    #[serde(rename = "frontend.account.customer-group-registration.page")]
    CustomerGroupRegistration,
    #[serde(rename = "frontend.detail.page")]
    ProductDetail,
    #[serde(rename = "frontend.landing.page")]
    LandingPage,
    #[serde(rename = "frontend.navigation.page")]
    NavigationPage,
}

impl RouteName {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerGroupRegistration => "frontend.account.customer-group-registration.page",
            Self::ProductDetail => "frontend.detail.page",
            Self::LandingPage => "frontend.landing.page",
            Self::NavigationPage => "frontend.navigation.page",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
