//! Shopware storefront library.
//!
//! Server-rendered headless storefront backed by the Shopware Store API.
//! Split out of the binary so the router can be tested end to end.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopware;
pub mod state;
