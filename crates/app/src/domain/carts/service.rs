//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use storefront::products::ProductId;

use crate::{
    domain::carts::{
        errors::CartsServiceError,
        models::{Cart, CartId, CartItemId, Quantity, QuantityRequest},
    },
    http::HttpClient,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateItemRequest<'a> {
    item_id: &'a CartItemId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct CartCreatedResponse {
    id: CartId,
}

#[derive(Debug, Clone)]
pub struct HttpCartsService {
    client: HttpClient,
}

impl HttpCartsService {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CartsService for HttpCartsService {
    #[instrument(skip(self))]
    async fn create_cart(&self) -> Result<CartId, CartsServiceError> {
        let created: CartCreatedResponse = self.client.post_empty(&["api", "carts"]).await?;

        Ok(created.id)
    }

    #[instrument(skip_all, fields(cart = %cart))]
    async fn get_cart(&self, cart: CartId) -> Result<Cart, CartsServiceError> {
        Ok(self.client.get_json(&["api", "carts", cart.as_str()]).await?)
    }

    #[instrument(skip_all, fields(cart = %cart, product = %product, %quantity))]
    async fn add_item(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: Quantity,
    ) -> Result<Cart, CartsServiceError> {
        let body = AddItemRequest {
            product_id: &product,
            quantity: quantity.get(),
        };

        Ok(self
            .client
            .post_json(&["api", "carts", cart.as_str(), "items"], &body)
            .await?)
    }

    #[instrument(skip_all, fields(cart = %cart, item = %item, quantity = request.wire_value()))]
    async fn update_item(
        &self,
        cart: CartId,
        item: CartItemId,
        request: QuantityRequest,
    ) -> Result<Cart, CartsServiceError> {
        let body = UpdateItemRequest {
            item_id: &item,
            quantity: request.wire_value(),
        };

        Ok(self
            .client
            .put_json(&["api", "carts", cart.as_str(), "items"], &body)
            .await?)
    }
}

/// The remote cart resource. Every mutation answers with the full updated cart.
#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Create a new, empty remote cart.
    async fn create_cart(&self) -> Result<CartId, CartsServiceError>;

    /// Retrieve a cart snapshot.
    async fn get_cart(&self, cart: CartId) -> Result<Cart, CartsServiceError>;

    /// Add units of a product. The backend merges lines per product.
    async fn add_item(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: Quantity,
    ) -> Result<Cart, CartsServiceError>;

    /// Set a line's quantity; [`QuantityRequest::Remove`] removes the line.
    async fn update_item(
        &self,
        cart: CartId,
        item: CartItemId,
        request: QuantityRequest,
    ) -> Result<Cart, CartsServiceError>;
}
