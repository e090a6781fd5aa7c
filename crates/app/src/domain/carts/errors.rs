//! Cart errors.

use thiserror::Error;

use crate::{
    domain::{
        carts::{identity::IdentityError, models::QuantityError, storage::StorageError},
        checkout::CheckoutServiceError,
    },
    http::HttpError,
};

/// Errors returned by the remote cart resource.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart or cart item not found")]
    NotFound,

    #[error("backend rejected the cart change: {0}")]
    Rejected(String),

    #[error("cart backend unavailable: {0}")]
    Unavailable(#[source] HttpError),
}

impl From<HttpError> for CartsServiceError {
    fn from(error: HttpError) -> Self {
        if error.is_not_found() {
            return Self::NotFound;
        }

        let reason = error
            .reason()
            .filter(|_| error.is_client_error())
            .map(str::to_string);

        match reason {
            Some(reason) => Self::Rejected(reason),
            None => Self::Unavailable(error),
        }
    }
}

/// Errors returned by cart store operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("cart backend unavailable: {0}")]
    Unavailable(#[source] HttpError),

    #[error("cart or cart item not found")]
    NotFound,

    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    #[error("cart is empty")]
    EmptyCart,

    #[error("cart rejected: {0}")]
    CartRejected(String),

    #[error("checkout unavailable: {0}")]
    CheckoutUnavailable(#[source] HttpError),

    #[error("cart identity storage unavailable: {0}")]
    IdentityUnavailable(#[source] StorageError),

    #[error("cart is not ready")]
    NotReady,
}

impl From<CartsServiceError> for CartError {
    fn from(error: CartsServiceError) -> Self {
        match error {
            CartsServiceError::NotFound => Self::NotFound,
            CartsServiceError::Rejected(reason) => Self::CartRejected(reason),
            CartsServiceError::Unavailable(source) => Self::Unavailable(source),
        }
    }
}

impl From<IdentityError> for CartError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::Unavailable(source) => Self::IdentityUnavailable(source),
            IdentityError::Create(source) => Self::from(source),
        }
    }
}

impl From<CheckoutServiceError> for CartError {
    fn from(error: CheckoutServiceError) -> Self {
        match error {
            CheckoutServiceError::NotFound => Self::NotFound,
            CheckoutServiceError::Rejected(reason) => Self::CartRejected(reason),
            CheckoutServiceError::Unavailable(source) => Self::CheckoutUnavailable(source),
        }
    }
}
