//! App Context

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::{
    domain::{
        carts::{
            CartIdStorage, CartStore, CartStoreDeps, CartsService, DisabledStorage, FileStorage,
            HttpCartsService, MemoryStorage,
        },
        checkout::{CheckoutNavigator, CheckoutService, HttpCheckoutService},
        products::{HttpProductsService, ProductsService},
    },
    http::{HttpClient, HttpClientError, HttpConfig},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to create backend client: {0}")]
    Http(#[from] HttpClientError),
}

/// Where the cart identifier is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// A JSON file that survives restarts.
    File(PathBuf),

    /// Process lifetime only.
    Memory,

    /// No storage at all; every store runs on an ephemeral cart.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: HttpConfig,
    pub storage: StorageConfig,
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub storage: Arc<dyn CartIdStorage>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context talking to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend client cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let client = HttpClient::new(&config.backend)?;

        let storage: Arc<dyn CartIdStorage> = match &config.storage {
            StorageConfig::File(path) => Arc::new(FileStorage::new(path.clone())),
            StorageConfig::Memory => Arc::new(MemoryStorage::new()),
            StorageConfig::Disabled => Arc::new(DisabledStorage),
        };

        Ok(Self {
            products: Arc::new(HttpProductsService::new(client.clone())),
            carts: Arc::new(HttpCartsService::new(client.clone())),
            checkout: Arc::new(HttpCheckoutService::new(client)),
            storage,
        })
    }

    /// Create a cart store wired to this context.
    #[must_use]
    pub fn cart_store(&self, navigator: Arc<dyn CheckoutNavigator>) -> CartStore {
        CartStore::new(CartStoreDeps {
            carts: Arc::clone(&self.carts),
            checkout: Arc::clone(&self.checkout),
            storage: Arc::clone(&self.storage),
            navigator,
        })
    }
}
