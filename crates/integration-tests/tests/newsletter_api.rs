//! Integration tests for the newsletter API.
//!
//! These tests require a running server and database.
//! Run with: cargo test -p frechnel-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use frechnel_integration_tests::base_url;

fn unique_email() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("subscriber-{nanos}@example.com")
}

async fn subscribe(client: &Client, email: &str) -> reqwest::Response {
    client
        .post(format!("{}/newsletter", base_url()))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("subscribe request failed")
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_subscribe_rejects_malformed_email() {
    let client = Client::new();

    for bad in ["not-an-email", "user@domain", "a@b@c.com", ""] {
        let response = subscribe(&client, bad).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected rejection for {bad:?}"
        );
    }
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_subscribe_once_then_conflict() {
    let client = Client::new();
    let email = unique_email();

    // First subscription succeeds
    let response = subscribe(&client, &email).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["subscriber"]["email"], email.as_str());

    // Second subscription with the same email is rejected
    let response = subscribe(&client, &email).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Case differences don't evade the uniqueness check
    let response = subscribe(&client, &email.to_uppercase()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_list_subscribers_newest_first() {
    let client = Client::new();

    let first = unique_email();
    let second = unique_email();
    subscribe(&client, &first).await;
    subscribe(&client, &second).await;

    let response = client
        .get(format!("{}/newsletter", base_url()))
        .send()
        .await
        .expect("list request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let subscribers: Vec<Value> = response.json().await.unwrap();
    let emails: Vec<&str> = subscribers
        .iter()
        .filter_map(|s| s["email"].as_str())
        .collect();

    let first_pos = emails.iter().position(|e| *e == first).unwrap();
    let second_pos = emails.iter().position(|e| *e == second).unwrap();
    assert!(
        second_pos < first_pos,
        "most recent subscriber must come first"
    );
}
