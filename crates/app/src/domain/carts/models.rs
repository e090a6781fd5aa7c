//! Cart Models

pub use storefront::{
    carts::{Cart, CartId, CartItem, CartItemId, ItemProduct},
    pricing::CartTotals,
    quantity::{Quantity, QuantityError, QuantityRequest},
};
