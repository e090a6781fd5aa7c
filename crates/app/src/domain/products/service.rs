//! Products service.

use async_trait::async_trait;
use mockall::automock;
use tracing::instrument;

use crate::{
    domain::products::{
        errors::CatalogError,
        models::{Product, ProductId, ProductImageData},
    },
    http::HttpClient,
};

#[derive(Debug, Clone)]
pub struct HttpProductsService {
    client: HttpClient,
}

impl HttpProductsService {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProductsService for HttpProductsService {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.client.get_json(&["api", "products"]).await?)
    }

    #[instrument(skip_all, fields(product = %product))]
    async fn get_product(&self, product: ProductId) -> Result<Product, CatalogError> {
        Ok(self
            .client
            .get_json(&["api", "products", product.as_str()])
            .await?)
    }

    #[instrument(skip_all, fields(product = %product))]
    async fn get_product_image(
        &self,
        product: ProductId,
    ) -> Result<ProductImageData, CatalogError> {
        let body = self
            .client
            .get_bytes(&["api", "products", product.as_str(), "image"])
            .await?;

        Ok(ProductImageData {
            content_type: body.content_type,
            bytes: body.bytes,
        })
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieve the full catalog.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductId) -> Result<Product, CatalogError>;

    /// Retrieve the binary image of a product.
    async fn get_product_image(&self, product: ProductId) -> Result<ProductImageData, CatalogError>;
}
