//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{Cart, CartId, CartItem, CartItemId, ItemProduct},
    ids::TypedId,
    pricing::{CartTotals, MoneyTotals, tax_rate},
    products::{Product, ProductId, ProductImage, Variant},
    quantity::{Quantity, QuantityError, QuantityRequest},
};
