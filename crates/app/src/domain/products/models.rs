//! Product Models

pub use storefront::products::{Product, ProductId, ProductImage, Variant};

/// Raw product image as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImageData {
    /// Declared media type, e.g. `image/png`
    pub content_type: Option<String>,

    /// Image bytes
    pub bytes: Vec<u8>,
}
