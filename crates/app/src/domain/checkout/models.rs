//! Checkout Models

use serde::{Deserialize, Serialize};

/// A hosted payment session to hand the shopper over to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Payment page location
    #[serde(alias = "payment_url", alias = "paymentUrl")]
    pub url: String,

    /// Backend checkout reference, when reported
    #[serde(
        default,
        rename = "checkoutId",
        alias = "checkout_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub checkout_id: Option<String>,
}
