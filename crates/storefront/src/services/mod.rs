//! Business logic services for the storefront.
//!
//! - `catalog` - Navigation, pages, listings and products (cached)
//! - `cart` - Cart actions keyed by the context token cookie

pub mod cart;
pub mod catalog;

pub use cart::{CONTEXT_TOKEN_COOKIE, CartActionError, CartService};
pub use catalog::{Catalog, LISTING_PAGE_SIZE};
