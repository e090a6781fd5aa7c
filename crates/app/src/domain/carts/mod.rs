//! Carts

pub mod errors;
pub mod identity;
pub mod models;
pub mod service;
pub mod storage;
pub mod store;

pub use errors::{CartError, CartsServiceError};
pub use identity::*;
pub use service::*;
pub use storage::*;
pub use store::*;
