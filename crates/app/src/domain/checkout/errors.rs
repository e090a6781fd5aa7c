//! Checkout errors.

use thiserror::Error;

use crate::http::HttpError;

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("cart not found")]
    NotFound,

    #[error("checkout rejected the cart: {0}")]
    Rejected(String),

    #[error("checkout unavailable: {0}")]
    Unavailable(#[source] HttpError),
}

impl From<HttpError> for CheckoutServiceError {
    fn from(error: HttpError) -> Self {
        if error.is_not_found() {
            return Self::NotFound;
        }

        if error.is_client_error() {
            let reason = error
                .reason()
                .map_or_else(|| error.to_string(), str::to_string);

            return Self::Rejected(reason);
        }

        Self::Unavailable(error)
    }
}
