//! Quantities

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroU32,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when classifying a requested quantity.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Negative quantities are never sent to the backend.
    #[error("quantity {0} is negative")]
    Negative(i64),

    /// A line quantity must be at least one.
    #[error("quantity must be at least 1")]
    Zero,

    /// The quantity does not fit the wire representation.
    #[error("quantity {0} is too large")]
    TooLarge(i64),
}

/// A positive line quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Get the quantity as an integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match QuantityRequest::try_from(value)? {
            QuantityRequest::Set(quantity) => Ok(quantity),
            QuantityRequest::Remove => Err(QuantityError::Zero),
        }
    }
}

/// A requested change to a line's quantity.
///
/// Zero means "remove the line"; it is still sent through the quantity update
/// path and interpreted by the backend as removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityRequest {
    /// Set the line to the given quantity.
    Set(Quantity),

    /// Remove the line.
    Remove,
}

impl QuantityRequest {
    /// The integer sent to the backend.
    pub fn wire_value(self) -> u32 {
        match self {
            Self::Set(quantity) => quantity.get(),
            Self::Remove => 0,
        }
    }
}

impl TryFrom<i64> for QuantityRequest {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(QuantityError::Negative(value));
        }

        let value_u32 = u32::try_from(value).map_err(|_overflow| QuantityError::TooLarge(value))?;

        Ok(Quantity::new(value_u32).map_or(Self::Remove, Self::Set))
    }
}
