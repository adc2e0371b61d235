//! Integration tests for the customer API.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The server running (cargo run -p ledgerbook-server)
//!
//! Run with: cargo test -p ledgerbook-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use ledgerbook_core::CustomerKind;

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("LEDGERBOOK_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A user id nobody else is using, derived from the clock.
///
/// Each test runs against its own user so parallel runs and leftovers from
/// earlier runs cannot interfere.
#[allow(clippy::cast_possible_truncation)]
fn fresh_uid() -> i64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_nanos();
    ((nanos as i64) & i64::MAX) | 1
}

fn client() -> Client {
    Client::new()
}

fn customer_body(name: &str, client_session_id: &str) -> Value {
    json!({
        "client_session_id": client_session_id,
        "name": name,
        "customer_type": CustomerKind::Customer.as_i16(),
        "address": "1 Main St",
        "contacts": "Jo",
        "contacts_info": "jo@example.com",
        "comment": "",
        "hidden": false,
    })
}

async fn create_customer(client: &Client, uid: i64, name: &str, token: &str) -> Value {
    let resp = client
        .post(format!("{}/api/customers", base_url()))
        .header("x-user-id", uid.to_string())
        .json(&customer_body(name, token))
        .send()
        .await
        .expect("Failed to create customer");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse create response")
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_customer_lifecycle() {
    let client = client();
    let uid = fresh_uid();
    let base = base_url();

    // Create
    let created = create_customer(&client, uid, "Acme", "").await;
    let id = created["id"].as_str().expect("id is a string").to_string();
    assert_eq!(created["name"], "Acme");
    assert_eq!(created["hidden"], false);
    assert_eq!(created["created_at"], created["updated_at"]);

    // Get
    let fetched: Value = client
        .get(format!("{base}/api/customers/{id}"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to get customer")
        .json()
        .await
        .expect("Failed to parse get response");
    assert_eq!(fetched["id"], created["id"]);

    // Modify
    let mut fields = customer_body("Acme Corp", "");
    fields.as_object_mut().expect("object").remove("client_session_id");
    let modified: Value = client
        .put(format!("{base}/api/customers/{id}"))
        .header("x-user-id", uid.to_string())
        .json(&fields)
        .send()
        .await
        .expect("Failed to modify customer")
        .json()
        .await
        .expect("Failed to parse modify response");
    assert_eq!(modified["name"], "Acme Corp");
    assert_eq!(modified["id"], created["id"]);

    // Delete
    let resp = client
        .delete(format!("{base}/api/customers/{id}"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to delete customer");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Gone from reads
    let resp = client
        .get(format!("{base}/api/customers/{id}"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to get deleted customer");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Deletion is one-way
    let resp = client
        .delete(format!("{base}/api/customers/{id}"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to re-delete customer");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_duplicate_submissions_collapse() {
    let client = client();
    let uid = fresh_uid();

    let first = create_customer(&client, uid, "Acme", "retry-token").await;
    let second = create_customer(&client, uid, "Acme", "retry-token").await;
    assert_eq!(first["id"], second["id"]);

    let listed: Value = client
        .get(format!("{}/api/customers", base_url()))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to list customers")
        .json()
        .await
        .expect("Failed to parse list response");
    assert_eq!(listed.as_array().expect("array").len(), 1);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_pagination_envelope() {
    let client = client();
    let uid = fresh_uid();
    let base = base_url();

    for i in 0..25 {
        create_customer(&client, uid, &format!("Customer {i}"), "").await;
    }

    let page: Value = client
        .get(format!("{base}/api/customers/page?page=2&page_size=20"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to get page")
        .json()
        .await
        .expect("Failed to parse page response");

    assert_eq!(page["total"], 25);
    assert_eq!(page["page"], 2);
    assert_eq!(page["page_size"], 20);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["customers"].as_array().expect("array").len(), 5);

    // Non-positive paging parameters fall back to the defaults.
    let clamped: Value = client
        .get(format!("{base}/api/customers/page?page=0&page_size=0"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to get clamped page")
        .json()
        .await
        .expect("Failed to parse clamped page response");
    assert_eq!(clamped["page"], 1);
    assert_eq!(clamped["page_size"], 20);
    assert_eq!(clamped["customers"].as_array().expect("array").len(), 20);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_hidden_toggle_and_visible_filter() {
    let client = client();
    let uid = fresh_uid();
    let base = base_url();

    let created = create_customer(&client, uid, "Quiet Corp", "").await;
    let id = created["id"].as_str().expect("id is a string").to_string();

    for _ in 0..2 {
        // Toggling to the same state twice succeeds both times.
        let resp = client
            .post(format!("{base}/api/customers/{id}/hidden"))
            .header("x-user-id", uid.to_string())
            .json(&json!({"hidden": true}))
            .send()
            .await
            .expect("Failed to hide customer");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let visible: Value = client
        .get(format!("{base}/api/customers?visible_only=true"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to list visible customers")
        .json()
        .await
        .expect("Failed to parse list response");
    assert!(visible.as_array().expect("array").is_empty());

    let all: Value = client
        .get(format!("{base}/api/customers"))
        .header("x-user-id", uid.to_string())
        .send()
        .await
        .expect("Failed to list customers")
        .json()
        .await
        .expect("Failed to parse list response");
    assert_eq!(all.as_array().expect("array").len(), 1);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_requests_without_identity_are_rejected() {
    let resp = client()
        .get(format!("{}/api/customers", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
