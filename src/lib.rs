//! Storefront
//!
//! Data model shared by the storefront client: catalog products, cart
//! snapshots, line quantities and derived cart totals.

pub mod carts;
pub mod ids;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod quantity;
