//! Cart identity resolution.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::domain::carts::{
    errors::CartsServiceError,
    models::CartId,
    service::CartsService,
    storage::{CartIdStorage, StorageError},
};

/// Storage key holding the persisted cart identifier.
pub const CART_ID_KEY: &str = "cartId";

/// The cart this client works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIdentity {
    /// Read from, or written to, persisted storage.
    Persisted(CartId),

    /// Storage was unusable; valid for the lifetime of the store only.
    Ephemeral(CartId),
}

impl CartIdentity {
    pub fn cart_id(&self) -> &CartId {
        match self {
            Self::Persisted(id) | Self::Ephemeral(id) => id,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }

    /// The same kind of identity for another cart.
    #[must_use]
    pub fn with_cart_id(&self, id: CartId) -> Self {
        match self {
            Self::Persisted(_) => Self::Persisted(id),
            Self::Ephemeral(_) => Self::Ephemeral(id),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("cart identity storage unavailable: {0}")]
    Unavailable(#[source] StorageError),

    #[error("failed to create cart: {0}")]
    Create(#[source] CartsServiceError),
}

/// Resolves the cart identifier, creating a remote cart when none is stored.
#[derive(Clone)]
pub struct CartIdentityResolver {
    storage: Arc<dyn CartIdStorage>,
    carts: Arc<dyn CartsService>,
}

impl std::fmt::Debug for CartIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartIdentityResolver").finish_non_exhaustive()
    }
}

impl CartIdentityResolver {
    #[must_use]
    pub fn new(storage: Arc<dyn CartIdStorage>, carts: Arc<dyn CartsService>) -> Self {
        Self { storage, carts }
    }

    /// Resolve the persisted identity.
    ///
    /// A stored identifier is returned without touching the network. Otherwise a
    /// remote cart is created and its identifier persisted.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] when storage cannot be read or
    /// written, and [`IdentityError::Create`] when the remote cart cannot be
    /// created.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<CartIdentity, IdentityError> {
        if let Some(id) = self.stored().await.map_err(IdentityError::Unavailable)? {
            return Ok(CartIdentity::Persisted(id));
        }

        let id = self.create().await?;

        self.storage
            .set(CART_ID_KEY, id.as_str().to_string())
            .await
            .map_err(IdentityError::Unavailable)?;

        Ok(CartIdentity::Persisted(id))
    }

    /// Resolve the persisted identity, falling back to an unpersisted cart when
    /// storage is unusable.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Create`] when the remote cart cannot be created.
    #[instrument(skip(self))]
    pub async fn resolve_or_ephemeral(&self) -> Result<CartIdentity, IdentityError> {
        match self.stored().await {
            Ok(Some(id)) => Ok(CartIdentity::Persisted(id)),
            Ok(None) => {
                let id = self.create().await?;

                match self.storage.set(CART_ID_KEY, id.as_str().to_string()).await {
                    Ok(()) => Ok(CartIdentity::Persisted(id)),
                    Err(error) => {
                        warn!(
                            %error,
                            cart = %id,
                            "failed to persist cart id, using an ephemeral cart"
                        );

                        Ok(CartIdentity::Ephemeral(id))
                    }
                }
            }
            Err(error) => {
                warn!(%error, "cart identity storage unavailable, using an ephemeral cart");

                Ok(CartIdentity::Ephemeral(self.create().await?))
            }
        }
    }

    /// Clear the persisted identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] when storage cannot be written.
    #[instrument(skip(self))]
    pub async fn forget(&self) -> Result<(), IdentityError> {
        self.storage
            .remove(CART_ID_KEY)
            .await
            .map_err(IdentityError::Unavailable)?;

        info!("persisted cart id cleared");

        Ok(())
    }

    /// Persist a cart identifier reported by the backend in place of the
    /// stored one.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] when storage cannot be written.
    #[instrument(skip(self), fields(cart = %id))]
    pub async fn adopt(&self, id: &CartId) -> Result<(), IdentityError> {
        self.storage
            .set(CART_ID_KEY, id.as_str().to_string())
            .await
            .map_err(IdentityError::Unavailable)?;

        info!("persisted cart id replaced");

        Ok(())
    }

    async fn stored(&self) -> Result<Option<CartId>, StorageError> {
        let stored = self
            .storage
            .get(CART_ID_KEY)
            .await?
            .filter(|id| !id.trim().is_empty())
            .map(CartId::new);

        if let Some(id) = &stored {
            debug!(cart = %id, "using persisted cart id");
        }

        Ok(stored)
    }

    async fn create(&self) -> Result<CartId, IdentityError> {
        let id = self
            .carts
            .create_cart()
            .await
            .map_err(IdentityError::Create)?;

        info!(cart = %id, "created cart");

        Ok(id)
    }
}
