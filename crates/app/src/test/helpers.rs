//! Test Helpers

use rust_decimal::Decimal;

use storefront::prelude::*;

/// Build a cart from `(line id, product id, quantity, unit price)` tuples.
/// Zero quantities are skipped, as the backend never reports them.
pub(crate) fn make_cart(id: &str, lines: &[(&str, &str, u32, i64)]) -> Cart {
    Cart {
        id: CartId::new(id),
        items: lines
            .iter()
            .filter_map(|&(line, product, quantity, price)| {
                Some(CartItem {
                    id: CartItemId::new(line),
                    product_id: ProductId::new(product),
                    quantity: Quantity::new(quantity)?,
                    product: ItemProduct {
                        name: product.to_string(),
                        price: Decimal::from(price),
                        image: None,
                    },
                })
            })
            .collect(),
    }
}
