//! Checkout service.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use tracing::{info, instrument};

use storefront::carts::CartId;

use crate::{
    domain::checkout::{errors::CheckoutServiceError, models::CheckoutSession},
    http::HttpClient,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    cart_id: &'a CartId,
}

#[derive(Debug, Clone)]
pub struct HttpCheckoutService {
    client: HttpClient,
}

impl HttpCheckoutService {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CheckoutService for HttpCheckoutService {
    #[instrument(skip_all, fields(cart = %cart))]
    async fn initiate_checkout(
        &self,
        cart: CartId,
    ) -> Result<CheckoutSession, CheckoutServiceError> {
        let session: CheckoutSession = self
            .client
            .post_json(&["api", "checkout"], &CheckoutRequest { cart_id: &cart })
            .await?;

        info!(checkout = session.checkout_id.as_deref(), "checkout session created");

        Ok(session)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Request a hosted payment session for a cart.
    async fn initiate_checkout(
        &self,
        cart: CartId,
    ) -> Result<CheckoutSession, CheckoutServiceError>;
}
