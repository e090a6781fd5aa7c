//! Catalog errors.

use thiserror::Error;

use crate::http::HttpError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found")]
    NotFound,

    #[error("catalog unavailable: {0}")]
    Unavailable(#[source] HttpError),
}

impl From<HttpError> for CatalogError {
    fn from(error: HttpError) -> Self {
        if error.is_not_found() {
            return Self::NotFound;
        }

        Self::Unavailable(error)
    }
}
