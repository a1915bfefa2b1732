//! Catalog seeding command.

use minimart_storefront::db::ProductRepository;
use minimart_storefront::models::SAMPLE_PRODUCTS;

use super::{CommandError, connect};

/// Insert the sample products if the catalog is empty.
///
/// # Errors
///
/// Returns an error if configuration is missing or a database statement fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let products = ProductRepository::new(&pool);

    let inserted = products.seed_if_empty(&SAMPLE_PRODUCTS).await?;
    let total = products.count().await?;

    if inserted == 0 {
        tracing::info!(total, "Catalog already populated, nothing inserted");
    } else {
        tracing::info!(inserted, total, "Sample catalog seeded");
    }
    Ok(())
}
