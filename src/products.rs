//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ids::TypedId;

/// Product ID
pub type ProductId = TypedId<Product>;

/// Catalog product, read-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProductPayload")]
pub struct Product {
    /// Backend identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Long-form description
    pub description: Option<String>,

    /// Product images, primary first
    pub images: Vec<ProductImage>,

    /// Selectable attributes such as size or colour
    pub variants: Vec<Variant>,
}

impl Product {
    /// The image shown in grids and cart lines.
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }
}

/// Reference to a product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ImagePayload")]
pub struct ProductImage {
    /// Image location
    pub url: String,

    /// Alternative text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A named attribute with an ordered set of selectable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Attribute name, e.g. "Size"
    pub name: String,

    /// Options in display order
    #[serde(default)]
    pub options: SmallVec<[String; 4]>,
}

// Backends disagree on the product shape: some send a single `image` string,
// others an `images` list of strings or objects, and `variations` instead of
// `variants`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductPayload {
    id: ProductId,
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    images: Vec<ProductImage>,
    #[serde(default, alias = "variations")]
    variants: Vec<Variant>,
}

impl From<ProductPayload> for Product {
    fn from(payload: ProductPayload) -> Self {
        let mut images = payload.images;

        if let Some(url) = payload.image.filter(|url| !url.is_empty()) {
            if !images.iter().any(|image| image.url == url) {
                images.insert(0, ProductImage { url, alt: None });
            }
        }

        Self {
            id: payload.id,
            name: payload.name,
            price: payload.price,
            description: payload.description,
            images,
            variants: payload.variants,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImagePayload {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },
}

impl From<ImagePayload> for ProductImage {
    fn from(payload: ImagePayload) -> Self {
        match payload {
            ImagePayload::Url(url) => Self { url, alt: None },
            ImagePayload::Detailed { url, alt } => Self { url, alt },
        }
    }
}
