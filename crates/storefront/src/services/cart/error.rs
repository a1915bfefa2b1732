//! Cart error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while reading or changing a cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product or cart item does not exist.
    #[error("not found")]
    NotFound,

    /// The cart item belongs to another user.
    #[error("cart item belongs to another user")]
    Forbidden,

    /// The submitted quantity is not a whole number or is too large.
    #[error("invalid quantity: {0:?}")]
    InvalidQuantity(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CartError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
