//! Commerce error types.

use thiserror::Error;

/// Errors raised while building or interpreting domain values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Quantity must be a positive integer.
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(i64),

    /// Unrecognized order status.
    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),

    /// An identifier that does not parse as a number.
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Discount outside 0..=100 percent.
    #[error("Invalid discount: {0} (must be between 0 and 100)")]
    InvalidDiscount(f64),

    /// Negative price.
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    /// A payload that matches none of the accepted shapes.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Request is missing a required field.
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl CommerceError {
    /// Check if this is a validation error on user input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CommerceError::InvalidQuantity(_)
                | CommerceError::InvalidDiscount(_)
                | CommerceError::InvalidPrice(_)
                | CommerceError::MissingField(_)
        )
    }
}

/// Result type for commerce operations.
pub type CommerceResult<T> = Result<T, CommerceError>;
