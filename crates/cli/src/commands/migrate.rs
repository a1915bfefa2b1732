//! Database migration command.
//!
//! Applies the embedded storefront migrations (`crates/storefront/migrations/`)
//! and creates the `tower_sessions` schema used by the session store. Both
//! steps are idempotent.

use minimart_storefront::db;
use minimart_storefront::middleware::create_session_store;

use super::{CommandError, connect};

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Creating session store table...");
    create_session_store(&pool)
        .migrate()
        .await
        .map_err(|e| CommandError::SessionStore(e.to_string()))?;

    tracing::info!("Migrations complete!");
    Ok(())
}
