//! Cart service.
//!
//! Thin layer over [`CartRepository`] that turns repository outcomes into
//! [`CartError`]s the handlers can report, and parses the raw quantity field.

mod error;

pub use error::CartError;

use sqlx::PgPool;
use tracing::instrument;

use minimart_core::{CartItemId, Price, ProductId, UserId};

use crate::db::{CartRepository, CheckoutReceipt, QuantityChange};
use crate::models::{CartItem, CartLine, MAX_QUANTITY, cart_total};

/// Parse a submitted quantity.
///
/// Accepts whole numbers up to [`MAX_QUANTITY`], including zero and
/// negatives (both remove the item). Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns `CartError::InvalidQuantity` if the input is not an integer or is
/// above [`MAX_QUANTITY`].
pub fn parse_quantity(raw: &str) -> Result<i32, CartError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|quantity| *quantity <= MAX_QUANTITY)
        .ok_or_else(|| CartError::InvalidQuantity(raw.to_owned()))
}

/// Cart operations for one authenticated user at a time.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
        }
    }

    /// Add one unit of `product_id` to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItem, CartError> {
        let item = self.carts.add_item(user_id, product_id).await?;
        tracing::debug!(quantity = item.quantity, "Cart item added");
        Ok(item)
    }

    /// Set an item's quantity. Zero or less removes the item.
    ///
    /// Returns the updated item, or `None` if it was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` above [`MAX_QUANTITY`].
    /// Returns `CartError::NotFound` if the item does not exist.
    /// Returns `CartError::Forbidden` if another user owns the item.
    #[instrument(skip(self), fields(user_id = %user_id, item_id = %item_id))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<Option<CartItem>, CartError> {
        if quantity > MAX_QUANTITY {
            return Err(CartError::InvalidQuantity(quantity.to_string()));
        }
        match self.carts.set_quantity(user_id, item_id, quantity).await? {
            QuantityChange::Updated(item) => Ok(Some(item)),
            QuantityChange::Removed => Ok(None),
            QuantityChange::NotOwner => {
                tracing::warn!("Attempt to modify another user's cart item");
                Err(CartError::Forbidden)
            }
        }
    }

    /// The user's cart lines with the current total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn view(&self, user_id: UserId) -> Result<(Vec<CartLine>, Price), CartError> {
        let lines = self.carts.list_for_user(user_id).await?;
        let total = cart_total(&lines);
        Ok((lines, total))
    }

    /// Sum of price times quantity over the user's cart, at current prices.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn total(&self, user_id: UserId) -> Result<Price, CartError> {
        let (_, total) = self.view(user_id).await?;
        Ok(total)
    }

    /// Total and clear the user's cart in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the checkout fails; the cart is
    /// unchanged in that case.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutReceipt, CartError> {
        let receipt = self.carts.checkout(user_id).await?;
        tracing::info!(
            total = %receipt.total,
            lines = receipt.lines.len(),
            "Checkout completed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3").unwrap(), 3);
        assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
        assert_eq!(parse_quantity("0").unwrap(), 0);
        assert_eq!(parse_quantity("-4").unwrap(), -4);
        assert_eq!(parse_quantity("9999").unwrap(), MAX_QUANTITY);
    }

    #[test]
    fn test_parse_quantity_rejects_non_integers() {
        for raw in ["", "abc", "1.5", "2x", "10000", "2147483647", "99999999999"] {
            assert!(
                matches!(parse_quantity(raw), Err(CartError::InvalidQuantity(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        assert!(matches!(
            CartError::from(RepositoryError::NotFound),
            CartError::NotFound
        ));
        assert!(matches!(
            CartError::from(RepositoryError::Conflict("x".into())),
            CartError::Repository(_)
        ));
    }
}
