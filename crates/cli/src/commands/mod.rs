//! CLI subcommands.

pub mod migrate;
pub mod seed;

use minimart_storefront::config::{ConfigError, StorefrontConfig};
use minimart_storefront::db::{self, RepositoryError};
use sqlx::PgPool;
use thiserror::Error;

/// Errors a CLI command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Load configuration and connect to the storefront database.
async fn connect() -> Result<PgPool, CommandError> {
    let config = StorefrontConfig::from_env()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&config.database_url).await?)
}
