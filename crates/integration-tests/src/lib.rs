//! Integration tests for the Frechnel shop backend.
//!
//! # Running Tests
//!
//! These tests drive a running server over HTTP and are `#[ignore]`d by
//! default. To run them:
//!
//! ```bash
//! # Start the database, migrate and seed
//! cargo run -p frechnel-cli -- migrate
//! cargo run -p frechnel-cli -- seed
//!
//! # Start the server
//! cargo run -p frechnel-server
//!
//! # Run the ignored tests
//! cargo test -p frechnel-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_BASE_URL` - Server base URL (default: `http://localhost:3000`)
//! - `FRECHNEL_ADMIN_EMAIL` / `FRECHNEL_ADMIN_PASSWORD` - Admin credentials,
//!   matching the server's configuration

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the shop API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SHOP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Admin credentials matching the server configuration.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    let email =
        std::env::var("FRECHNEL_ADMIN_EMAIL").unwrap_or_else(|_| "admin@frechnel.com".to_string());
    let password =
        std::env::var("FRECHNEL_ADMIN_PASSWORD").unwrap_or_else(|_| "freshnel2024".to_string());
    (email, password)
}

/// Log in and return a bearer token.
///
/// # Panics
///
/// Panics if the login request fails or the response carries no token.
pub async fn login(client: &Client) -> String {
    let (email, password) = admin_credentials();
    let response = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");

    assert!(response.status().is_success(), "login rejected");

    let body: Value = response.json().await.expect("login response not JSON");
    body["token"]
        .as_str()
        .expect("login response missing token")
        .to_owned()
}
