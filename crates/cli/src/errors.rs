//! Client errors

use std::{io, path::PathBuf};

use thiserror::Error;

use storefront_app::{
    context::AppInitError,
    domain::{carts::CartError, products::CatalogError},
};

use crate::observability::ObservabilityError;

/// Errors reported by a client command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Logging could not be set up.
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    /// The backend client could not be created.
    #[error(transparent)]
    Init(#[from] AppInitError),

    /// A catalog request failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The cart could not be loaded.
    #[error(
        "cart could not be loaded: {0}; run `storefront cart forget` to start a new cart"
    )]
    CartLoad(String),

    /// A downloaded image could not be saved.
    #[error("failed to write {path}: {source}")]
    SaveImage {
        /// Destination file
        path: PathBuf,

        /// Underlying error
        source: io::Error,
    },

    /// Command output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
