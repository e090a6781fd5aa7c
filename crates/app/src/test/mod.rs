//! Test support.

mod helpers;

pub(crate) use context::TestContext;
pub(crate) use gated::{GatedCarts, GatedCheckout};
pub(crate) use helpers::make_cart;
pub(crate) use server::PNG_SIGNATURE;
