//! Carts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    ids::TypedId,
    pricing::CartTotals,
    products::ProductId,
    quantity::Quantity,
};

/// Cart ID
pub type CartId = TypedId<Cart>;

/// Cart Item ID
pub type CartItemId = TypedId<CartItem>;

/// A shopping cart snapshot as reported by the backend.
///
/// Items keep the backend's insertion order. Nothing here assumes one line per
/// product: the backend owns merging, and a snapshot always replaces the
/// previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CartPayload")]
pub struct Cart {
    /// Backend identifier
    pub id: CartId,

    /// Lines in insertion order
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn empty(id: CartId) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Look up a line by its identifier.
    pub fn item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Derived subtotal, tax and total.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_items(&self.items)
    }
}

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Backend-assigned line identifier
    pub id: CartItemId,

    /// Referenced catalog product
    pub product_id: ProductId,

    /// Units on this line
    pub quantity: Quantity,

    /// Product display fields captured by the backend
    pub product: ItemProduct,
}

impl CartItem {
    /// Unit price multiplied by quantity.
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity.get())
    }
}

/// Denormalized product fields carried on a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProduct {
    /// Display name
    pub name: String,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartPayload {
    id: CartId,
    #[serde(default)]
    items: Vec<CartItemPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemPayload {
    id: CartItemId,
    product_id: ProductId,
    quantity: u32,
    product: ItemProduct,
}

// A zero-quantity line is a removed line; it is never exposed.
impl From<CartPayload> for Cart {
    fn from(payload: CartPayload) -> Self {
        let items = payload
            .items
            .into_iter()
            .filter_map(|item| {
                Some(CartItem {
                    quantity: Quantity::new(item.quantity)?,
                    id: item.id,
                    product_id: item.product_id,
                    product: item.product,
                })
            })
            .collect();

        Self {
            id: payload.id,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn snapshot_keeps_backend_order() -> TestResult {
        let cart: Cart = serde_json::from_value(json!({
            "id": "c-1",
            "items": [
                { "id": "i-2", "productId": "p-2", "quantity": 1,
                  "product": { "name": "Tea", "price": 5 } },
                { "id": "i-1", "productId": "p-1", "quantity": 2,
                  "product": { "name": "Mug", "price": 10, "image": "/mug.png" } }
            ]
        }))?;

        let ids: Vec<&str> = cart.items.iter().map(|item| item.id.as_str()).collect();

        assert_eq!(ids, ["i-2", "i-1"]);
        assert_eq!(cart.item_count(), 3);

        Ok(())
    }

    #[test]
    fn zero_quantity_lines_are_dropped() -> TestResult {
        let cart: Cart = serde_json::from_value(json!({
            "id": 9,
            "items": [
                { "id": 1, "productId": 1, "quantity": 0,
                  "product": { "name": "Tea", "price": 5 } }
            ]
        }))?;

        assert!(cart.is_empty(), "zero-quantity line must not be exposed");

        Ok(())
    }

    #[test]
    fn missing_items_means_empty_cart() -> TestResult {
        let cart: Cart = serde_json::from_value(json!({ "id": "c-1" }))?;

        assert_eq!(cart, Cart::empty(CartId::new("c-1")));

        Ok(())
    }

    #[test]
    fn item_lookup_by_id() -> TestResult {
        let cart: Cart = serde_json::from_value(json!({
            "id": "c-1",
            "items": [{ "id": "i-1", "productId": "p-1", "quantity": 4,
                        "product": { "name": "Tea", "price": 2.5 } }]
        }))?;

        let item = cart.item(&CartItemId::new("i-1")).ok_or("Expected item i-1")?;

        assert_eq!(item.line_total(), Decimal::from(10));
        assert!(cart.item(&CartItemId::new("i-2")).is_none());

        Ok(())
    }
}
