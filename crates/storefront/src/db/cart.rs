//! Cart repository.
//!
//! Every mutating method runs in one transaction that first takes the
//! per-user cart advisory lock, so two requests from the same user never
//! interleave their read-modify-write steps. Different users never contend.
//! Dropping a transaction without committing rolls it back, so a cancelled or
//! timed-out request leaves the cart exactly as it was.

use sqlx::PgPool;

use minimart_core::{CartItemId, Price, ProductId, UserId};

use super::{LockNamespace, RepositoryError, advisory_xact_lock};
use crate::models::{CartItem, CartLine, MAX_QUANTITY, Product, cart_total};

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "cart item {} has non-positive quantity {}",
                    row.id, row.quantity
                ))
            })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    item: CartItemRow,
    name: String,
    description: String,
    price: Price,
    image: Option<String>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let item = CartItem::try_from(row.item)?;
        Ok(Self {
            product: Product {
                id: item.product_id,
                name: row.name,
                description: row.description,
                price: row.price,
                image: row.image,
            },
            item,
        })
    }
}

const CART_LINES_SQL: &str = r"
    SELECT c.id, c.user_id, c.product_id, c.quantity,
           p.name, p.description, p.price, p.image
    FROM storefront.cart_item c
    JOIN storefront.product p ON p.id = c.product_id
    WHERE c.user_id = $1
    ORDER BY c.id ASC
";

/// Outcome of [`CartRepository::set_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    /// The row now holds the new quantity.
    Updated(CartItem),
    /// The quantity was zero or negative, so the row was deleted.
    Removed,
    /// The item belongs to another user; nothing was changed.
    NotOwner,
}

/// What a completed checkout cleared from the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Sum of the cleared lines at the prices current during checkout.
    pub total: Price,
    /// The lines that were removed.
    pub lines: Vec<CartLine>,
}

/// Repository for cart reads and mutations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add one unit of a product to the user's cart.
    ///
    /// Creates the row with quantity 1 or increments the existing row, which
    /// stops at [`MAX_QUANTITY`]. The
    /// upsert is a single statement keyed on `(user_id, product_id)`, so two
    /// simultaneous adds always produce quantity 2, never a lost update or a
    /// duplicate row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        advisory_xact_lock(&mut tx, LockNamespace::Cart, user_id.as_i32()).await?;

        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO storefront.cart_item AS c (user_id, product_id, quantity)
            SELECT $1, p.id, 1
            FROM storefront.product p
            WHERE p.id = $2
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = LEAST(c.quantity + 1, $3)
            RETURNING c.id, c.user_id, c.product_id, c.quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(MAX_QUANTITY)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let item = CartItem::try_from(row)?;
        tx.commit().await?;
        Ok(item)
    }

    /// Overwrite an item's quantity on behalf of `acting_user`.
    ///
    /// A quantity of zero or less deletes the row. The row is locked while
    /// ownership is checked, and an item owned by someone else is left
    /// untouched ([`QuantityChange::NotOwner`]).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        acting_user: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<QuantityChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        advisory_xact_lock(&mut tx, LockNamespace::Cart, acting_user.as_i32()).await?;

        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, user_id, product_id, quantity
            FROM storefront.cart_item
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let current = CartItem::try_from(row)?;
        if !current.is_owned_by(acting_user) {
            tx.rollback().await?;
            return Ok(QuantityChange::NotOwner);
        }

        let change = if quantity <= 0 {
            sqlx::query("DELETE FROM storefront.cart_item WHERE id = $1")
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
            QuantityChange::Removed
        } else {
            let row = sqlx::query_as::<_, CartItemRow>(
                r"
                UPDATE storefront.cart_item
                SET quantity = $2
                WHERE id = $1
                RETURNING id, user_id, product_id, quantity
                ",
            )
            .bind(item_id)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;
            QuantityChange::Updated(row.try_into()?)
        };

        tx.commit().await?;
        Ok(change)
    }

    /// The user's cart lines joined with current product data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(CART_LINES_SQL)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Total the user's cart and delete every line, atomically.
    ///
    /// The total and the delete see the same rows: the per-user lock keeps
    /// concurrent adds and updates out until the transaction ends. An empty
    /// cart checks out with a zero total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the cart
    /// is left intact in that case.
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutReceipt, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        advisory_xact_lock(&mut tx, LockNamespace::Cart, user_id.as_i32()).await?;

        let rows = sqlx::query_as::<_, CartLineRow>(CART_LINES_SQL)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;
        let lines = rows
            .into_iter()
            .map(CartLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total = cart_total(&lines);

        let deleted = sqlx::query("DELETE FROM storefront.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if usize::try_from(deleted).ok() != Some(lines.len()) {
            return Err(RepositoryError::DataCorruption(format!(
                "checkout for user {user_id} read {} lines but deleted {deleted}",
                lines.len()
            )));
        }

        tx.commit().await?;
        Ok(CheckoutReceipt { total, lines })
    }
}
