//! Checkout

pub mod errors;
pub mod models;
pub mod navigator;
pub mod service;

pub use errors::CheckoutServiceError;
pub use navigator::*;
pub use service::*;
