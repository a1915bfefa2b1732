//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables (schema `storefront`)
//!
//! - `user` - Accounts (unique username, unique email, argon2 password hash)
//! - `product` - Catalog, populated by the startup seed
//! - `cart_item` - One row per (user, product) with a positive quantity
//! - `tower_sessions.session` - Session storage (managed by tower-sessions-sqlx-store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p minimart-cli -- migrate
//! ```
//! or at server start with `STOREFRONT_AUTO_MIGRATE=true`.

pub mod cart;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

pub use cart::{CartRepository, CheckoutReceipt, QuantityChange};
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded storefront migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply all pending storefront migrations.
///
/// # Errors
///
/// Returns the migration error if any migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Advisory lock namespaces (first key of `pg_advisory_xact_lock(int, int)`).
#[derive(Debug, Clone, Copy)]
#[repr(i32)]
pub(crate) enum LockNamespace {
    /// Serializes all cart mutations of one user. Second key: user id.
    Cart = 1,
    /// Serializes catalog seeding across processes. Second key: 0.
    CatalogSeed = 2,
}

/// Take a transaction-scoped advisory lock.
///
/// The lock is released automatically on commit or rollback, including when
/// the transaction is dropped because the request was cancelled.
pub(crate) async fn advisory_xact_lock(
    tx: &mut Transaction<'_, Postgres>,
    namespace: LockNamespace,
    key: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(namespace as i32)
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Returns the violated constraint name if `err` is a unique violation.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = err
        && db_err.is_unique_violation()
    {
        return Some(db_err.constraint().unwrap_or_default().to_owned());
    }
    None
}
