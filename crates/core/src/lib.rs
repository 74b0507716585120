//! Shopware Storefront Core - Shared value types.
//!
//! This crate provides the small vocabulary shared by the storefront binary
//! and its integration tests:
//! - Prices and currency codes with display formatting
//! - Navigation types and SEO route names understood by the Store API
//! - The storefront's product sort options
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Prices, navigation, route names and sorting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
