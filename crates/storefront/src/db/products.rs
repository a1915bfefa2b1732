//! Catalog repository.
//!
//! The catalog is read-only at request time. The only write is the seed,
//! which runs at startup (or via `minimart-cli seed`) and is a no-op once any
//! product exists.

use sqlx::PgPool;

use minimart_core::{Price, ProductId};

use super::{LockNamespace, RepositoryError, advisory_xact_lock};
use crate::models::{NewProduct, Product};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub(crate) id: ProductId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) price: Price,
    pub(crate) image: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            image: row.image,
        }
    }
}

/// Repository for catalog reads and seeding.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image
            FROM storefront.product
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM storefront.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert `products` if and only if the catalog is empty.
    ///
    /// Returns the number of rows inserted (0 when the catalog was already
    /// populated). Concurrent callers are serialized on an advisory lock, so
    /// the catalog is seeded at most once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// inserted in that case.
    pub async fn seed_if_empty(&self, products: &[NewProduct]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        advisory_xact_lock(&mut tx, LockNamespace::CatalogSeed, 0).await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM storefront.product")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.commit().await?;
            return Ok(0);
        }

        let mut inserted = 0;
        for product in products {
            let result = sqlx::query(
                r"
                INSERT INTO storefront.product (name, description, price, image)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(product.name)
            .bind(product.description)
            .bind(Price::from_units(product.price))
            .bind(product.image)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
