//! End-to-end flow through a running storefront.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied (`minimart-cli migrate`)
//! - The storefront server running with the sample catalog (`cargo run -p minimart-storefront`)
//!
//! Run with: `cargo test -p minimart-integration-tests --test storefront_http -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use minimart_integration_tests::{TEST_PASSWORD, unique_suffix};
use reqwest::{Client, StatusCode, redirect};

/// Base URL for the storefront (configurable via environment).
fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A browser-like client: keeps cookies, does not follow redirects so each
/// hop can be checked.
fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn get(client: &Client, path: &str) -> reqwest::Response {
    client
        .get(format!("{}{path}", storefront_base_url()))
        .send()
        .await
        .expect("Request failed")
}

async fn post(client: &Client, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    client
        .post(format!("{}{path}", storefront_base_url()))
        .form(form)
        .send()
        .await
        .expect("Request failed")
}

/// Register and log in a fresh account, returning its email.
async fn sign_up_and_log_in(client: &Client) -> String {
    let suffix = unique_suffix();
    let email = format!("e2e-{suffix}@example.com");
    let username = format!("e2e-{suffix}");

    let resp = post(
        client,
        "/register",
        &[
            ("username", username.as_str()),
            ("email", email.as_str()),
            ("password", TEST_PASSWORD),
        ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = post(
        client,
        "/login",
        &[("email", email.as_str()), ("password", TEST_PASSWORD)],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    email
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = browser();
    assert_eq!(get(&client, "/health").await.status(), StatusCode::OK);
    assert_eq!(get(&client, "/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_requires_login() {
    let client = browser();
    let resp = get(&client, "/cart").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let page = get(&client, "/login").await.text().await.unwrap();
    assert!(page.contains("Please login first!"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_shopping_flow() {
    let client = browser();
    sign_up_and_log_in(&client).await;

    let home = get(&client, "/").await.text().await.unwrap();
    assert!(home.contains("Logged in successfully!"));
    assert!(home.contains("Washing Machine"));

    // Washing Machine (399) twice, Smartphone (699) once.
    for path in ["/add_to_cart/1", "/add_to_cart/1", "/add_to_cart/2"] {
        let resp = get(&client, path).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
    }

    let cart = get(&client, "/cart").await.text().await.unwrap();
    assert!(cart.contains("$1497.00"));

    let checkout = get(&client, "/checkout").await.text().await.unwrap();
    assert!(checkout.contains("Checkout successful! Total paid: $1497.00"));

    let empty = get(&client, "/cart").await.text().await.unwrap();
    assert!(empty.contains("Your cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_bad_credentials_and_duplicate_email() {
    let client = browser();
    let email = sign_up_and_log_in(&client).await;
    get(&client, "/logout").await;

    let resp = post(
        &client,
        "/login",
        &[("email", email.as_str()), ("password", "wrong-password")],
    )
    .await;
    assert_eq!(location(&resp), "/login");
    let page = get(&client, "/login").await.text().await.unwrap();
    assert!(page.contains("Invalid credentials!"));

    let username = format!("dup-{}", unique_suffix());
    let resp = post(
        &client,
        "/register",
        &[
            ("username", username.as_str()),
            ("email", email.as_str()),
            ("password", TEST_PASSWORD),
        ],
    )
    .await;
    assert_eq!(location(&resp), "/register");
    let page = get(&client, "/register").await.text().await.unwrap();
    assert!(page.contains("Email already registered!"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_redirects_home() {
    let client = browser();
    let resp = get(&client, "/product/999999").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}
