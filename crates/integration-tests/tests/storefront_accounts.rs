//! Account integration tests against `PostgreSQL`.
//!
//! Each `#[sqlx::test]` gets its own database with the storefront migrations
//! applied. Requires `DATABASE_URL`; run with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use minimart_integration_tests::{TEST_PASSWORD, register_user, unique_suffix};
use minimart_storefront::db::UserRepository;
use minimart_storefront::services::{AuthError, AuthService};
use sqlx::PgPool;

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn duplicate_email_is_rejected_and_first_account_survives(pool: PgPool) {
    let auth = AuthService::new(&pool);
    let email = format!("dup-{}@example.com", unique_suffix());

    let first = auth
        .register("first", &email, TEST_PASSWORD)
        .await
        .unwrap();

    let second = auth.register("second", &email, "another-password").await;
    assert!(matches!(second, Err(AuthError::DuplicateEmail)));

    let stored = UserRepository::new(&pool)
        .get_by_id(first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.username.as_str(), "first");

    // The original password still works.
    let again = auth.authenticate(&email, TEST_PASSWORD).await.unwrap();
    assert_eq!(again.id, first.id);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn duplicate_username_is_rejected(pool: PgPool) {
    let auth = AuthService::new(&pool);
    let username = format!("shopper-{}", unique_suffix());

    auth.register(&username, "one@example.com", TEST_PASSWORD)
        .await
        .unwrap();
    let second = auth
        .register(&username, "two@example.com", TEST_PASSWORD)
        .await;

    assert!(matches!(second, Err(AuthError::DuplicateUsername)));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn wrong_password_and_unknown_email_fail_identically(pool: PgPool) {
    let user = register_user(&pool, "alice").await;
    let auth = AuthService::new(&pool);

    let wrong_password = auth
        .authenticate(user.email.as_str(), "not-the-password")
        .await;
    let unknown_email = auth
        .authenticate("nobody@example.com", TEST_PASSWORD)
        .await;
    let malformed_email = auth.authenticate("not an email", TEST_PASSWORD).await;

    assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
    assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    assert!(matches!(malformed_email, Err(AuthError::InvalidCredentials)));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn email_lookup_is_exact_match(pool: PgPool) {
    let user = register_user(&pool, "casey").await;
    let shouted = user.email.as_str().to_uppercase();

    let result = AuthService::new(&pool)
        .authenticate(&shouted, TEST_PASSWORD)
        .await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn stored_password_is_an_argon2_hash(pool: PgPool) {
    let user = register_user(&pool, "bob").await;

    let hash = UserRepository::new(&pool)
        .password_hash_for(user.id)
        .await
        .unwrap()
        .unwrap();

    assert_ne!(hash, TEST_PASSWORD);
    assert!(!hash.contains(TEST_PASSWORD));
    assert!(hash.starts_with("$argon2id$"));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn weak_password_is_not_stored(pool: PgPool) {
    let result = AuthService::new(&pool)
        .register("weak", "weak@example.com", "short")
        .await;
    assert!(matches!(result, Err(AuthError::WeakPassword(_))));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM storefront.user")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn nul_bytes_are_rejected_before_reaching_the_database(pool: PgPool) {
    let auth = AuthService::new(&pool);

    let login = auth.authenticate("a\0b@example.com", TEST_PASSWORD).await;
    assert!(matches!(login, Err(AuthError::InvalidCredentials)));

    let email = format!("nul-{}@example.com", unique_suffix());
    let signup = auth.register("bob\0", &email, TEST_PASSWORD).await;
    assert!(matches!(signup, Err(AuthError::InvalidUsername(_))));

    let signup = auth.register("bob", "b\0b@example.com", TEST_PASSWORD).await;
    assert!(matches!(signup, Err(AuthError::InvalidEmail(_))));
}
