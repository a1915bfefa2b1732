//! Integration tests for Minimart.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests (each test gets a fresh database with migrations applied)
//! DATABASE_URL=postgres://localhost/minimart cargo test -p minimart-integration-tests -- --ignored
//!
//! # End-to-end HTTP tests additionally need a running server
//! STOREFRONT_BASE_URL=http://localhost:3000 cargo test -p minimart-integration-tests -- --ignored
//! ```
//!
//! # Test Files
//!
//! - `storefront_accounts` - registration and login against `PostgreSQL`
//! - `storefront_cart` - cart consistency and catalog seeding against `PostgreSQL`
//! - `storefront_routes` - cart handlers through the router as a logged-in shopper
//! - `storefront_http` - browser-style flow through a live server
//!
//! Shared helpers live here so each test file stays focused on behaviour.

#![cfg_attr(not(test), forbid(unsafe_code))]

use minimart_storefront::models::{Product, User};
use minimart_storefront::services::AuthService;
use sqlx::PgPool;
use uuid::Uuid;

/// A password that passes validation.
pub const TEST_PASSWORD: &str = "hunter2-hunter2";

/// A unique suffix so parallel tests never collide on email or username.
#[must_use]
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Register a fresh user with [`TEST_PASSWORD`].
///
/// # Panics
///
/// Panics if registration fails.
#[allow(clippy::expect_used)]
pub async fn register_user(pool: &PgPool, name: &str) -> User {
    let suffix = unique_suffix();
    AuthService::new(pool)
        .register(
            &format!("{name}-{suffix}"),
            &format!("{name}-{suffix}@example.com"),
            TEST_PASSWORD,
        )
        .await
        .expect("Failed to register test user")
}

/// Insert a product at a whole-unit price and return it.
///
/// # Panics
///
/// Panics if the insert fails.
#[allow(clippy::expect_used)]
pub async fn insert_product(pool: &PgPool, name: &str, price: u32) -> Product {
    let id: (i32,) = sqlx::query_as(
        r"
        INSERT INTO storefront.product (name, description, price, image)
        VALUES ($1, $2, $3, NULL)
        RETURNING id
        ",
    )
    .bind(name)
    .bind(format!("{name} description"))
    .bind(minimart_core::Price::from_units(price))
    .fetch_one(pool)
    .await
    .expect("Failed to insert product");

    minimart_storefront::db::ProductRepository::new(pool)
        .get(minimart_core::ProductId::new(id.0))
        .await
        .expect("Failed to read product")
        .expect("Inserted product missing")
}
