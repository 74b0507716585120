//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod navigation;
pub mod price;
pub mod sort;

pub use navigation::{NavigationType, RouteName, UnknownValue};
pub use price::{CurrencyCode, Price};
pub use sort::{SORT_OPTIONS, SortKey, SortOption};
