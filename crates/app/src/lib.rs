//! Storefront client services: catalog, cart store, cart identity and checkout.

pub mod context;
pub mod domain;
pub mod http;

#[cfg(test)]
mod test;
