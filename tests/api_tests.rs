//! API integration tests
//!
//! These tests expect a running server with a migrated database and the
//! bootstrapped admin account. Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080";

/// Build a valid ISBN-13 from a 12-digit prefix by appending the
/// mod-10 check digit.
fn isbn13_from(prefix: &str) -> String {
    assert_eq!(prefix.len(), 12);
    let sum: u32 = prefix
        .chars()
        .enumerate()
        .map(|(i, c)| c.to_digit(10).expect("digit") * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    let check = (10 - sum % 10) % 10;
    format!("{}{}", prefix, check)
}

/// A fresh ISBN per test run so reruns do not collide with old rows.
fn unique_isbn() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    isbn13_from(&format!("978{:09}", nanos % 1_000_000_000))
}

fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}{}", prefix, nanos % 1_000_000_000)
}

/// Log in as the bootstrapped admin; the access token rides in the
/// `access-token` response header.
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/api/users/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    response
        .headers()
        .get("access-token")
        .expect("No access token header")
        .to_str()
        .expect("Invalid token header")
        .to_string()
}

/// Register a throwaway member and log in, returning its token.
async fn get_member_token(client: &Client) -> String {
    let username = unique_name("member");
    let response = client
        .post(format!("{}/api/users/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "password123",
            "phone": "13812345678"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "register failed: {}", body["message"]);

    let response = client
        .post(format!("{}/api/users/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    response
        .headers()
        .get("access-token")
        .expect("No access token header")
        .to_str()
        .expect("Invalid token header")
        .to_string()
}

/// Create a catalog entry plus one physical copy; returns (isbn, book_id).
async fn seed_copy(client: &Client, token: &str) -> (String, i64) {
    let isbn = unique_isbn();
    let response = client
        .post(format!("{}/api/booktypes", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": isbn,
            "title": "Effective Testing",
            "author": "Jane Doe",
            "category": "Software",
            "publisher": "Example Press",
            "publish_year": 2020,
            "description": "Fixture"
        }))
        .send()
        .await
        .expect("Failed to create book type");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "add book type failed: {}", body["message"]);

    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": isbn,
            "location": "A-1-1",
            "purchase_date": "2024-01-15T00:00:00Z",
            "purchase_price": "29.90"
        }))
        .send()
        .await
        .expect("Failed to create book");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "add book failed: {}", body["message"]);
    let book_id = body["data"]["id"].as_i64().expect("No book id");

    (isbn, book_id)
}

async fn get_book_type(client: &Client, isbn: &str) -> Value {
    let response = client
        .get(format!("{}/api/booktypes/{}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to fetch book type");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0);
    body["data"].clone()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_password_uses_envelope() {
    let client = Client::new();

    let response = client
        .post(format!("{}/api/users/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "definitely-wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    // Business errors still travel as HTTP 200 with a non-zero code.
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
#[ignore]
async fn test_me_requires_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/users/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 2);
}

#[tokio::test]
#[ignore]
async fn test_refresh_token_flow() {
    let client = Client::new();

    let response = client
        .post(format!("{}/api/users/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    let refresh = response
        .headers()
        .get("refresh-token")
        .expect("No refresh token header")
        .to_str()
        .expect("Invalid header")
        .to_string();

    let response = client
        .post(format!("{}/api/users/refresh", BASE_URL))
        .header("refresh-token", &refresh)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0);
    assert!(body["data"]["access_token"].is_string());

    // A refresh token is not an access token.
    let response = client
        .get(format!("{}/api/users/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", refresh))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 2);
}

#[tokio::test]
#[ignore]
async fn test_add_book_type_rejects_bad_isbn() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/api/booktypes", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": "9780134685990",
            "title": "Broken Checksum",
            "author": "Jane Doe",
            "category": "Software",
            "publisher": "Example Press",
            "publish_year": 2020,
            "description": ""
        }))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 8);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_manage_catalog() {
    let client = Client::new();
    let token = get_member_token(&client).await;

    let response = client
        .post(format!("{}/api/booktypes", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": unique_isbn(),
            "title": "Forbidden",
            "author": "Jane Doe",
            "category": "Software",
            "publisher": "Example Press",
            "publish_year": 2020,
            "description": ""
        }))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1005);
}

#[tokio::test]
#[ignore]
async fn test_add_copy_increments_counters() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let (isbn, _book_id) = seed_copy(&client, &token).await;

    let bt = get_book_type(&client, &isbn).await;
    assert_eq!(bt["total_copies"], 1);
    assert_eq!(bt["available_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_cycle() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let (isbn, book_id) = seed_copy(&client, &admin).await;
    let token = get_member_token(&client).await;

    // Borrow
    let response = client
        .post(format!("{}/api/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "borrow failed: {}", body["message"]);
    let borrow_id = body["data"]["borrow_id"].as_i64().expect("No borrow id");

    let bt = get_book_type(&client, &isbn).await;
    assert_eq!(bt["available_copies"], 0);
    assert_eq!(bt["total_copies"], 1);

    // Borrowing the same copy again fails while it is checked out.
    let response = client
        .post(format!("{}/api/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1008);

    // Return in good condition
    let response = client
        .post(format!("{}/api/borrows/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "borrow_id": borrow_id,
            "status": "returned",
            "late_fee": "0"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "return failed: {}", body["message"]);
    assert_eq!(body["data"]["status"], "returned");
    assert!(body["data"]["return_date"].is_string());

    let bt = get_book_type(&client, &isbn).await;
    assert_eq!(bt["available_copies"], 1);

    // Returning a closed record is rejected.
    let response = client
        .post(format!("{}/api/borrows/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "borrow_id": borrow_id,
            "status": "returned",
            "late_fee": "0"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1010);
}

#[tokio::test]
#[ignore]
async fn test_lost_return_keeps_copy_out_of_circulation() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let (isbn, book_id) = seed_copy(&client, &admin).await;
    let token = get_member_token(&client).await;

    let response = client
        .post(format!("{}/api/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["data"]["borrow_id"].as_i64().expect("No borrow id");

    let response = client
        .post(format!("{}/api/borrows/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "borrow_id": borrow_id,
            "status": "lost",
            "late_fee": "59.90"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "lost");

    // Availability is not restored for a lost copy.
    let bt = get_book_type(&client, &isbn).await;
    assert_eq!(bt["available_copies"], 0);
    assert_eq!(bt["total_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_add_copy_for_unregistered_isbn() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    // Checksum-valid ISBN with no catalog entry behind it.
    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": unique_isbn(),
            "location": "A-1-1",
            "purchase_date": "2024-01-15T00:00:00Z",
            "purchase_price": "29.90"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
#[ignore]
async fn test_borrow_cap_is_enforced() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let token = get_member_token(&client).await;

    // Default policy allows five open loans.
    let mut last_book_id = 0;
    for _ in 0..5 {
        let (_isbn, book_id) = seed_copy(&client, &admin).await;
        let response = client
            .post(format!("{}/api/borrows", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "book_id": book_id }))
            .send()
            .await
            .expect("Failed to send request");
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], 0, "borrow failed: {}", body["message"]);
        last_book_id = book_id;
    }

    let (_isbn, over_cap_book_id) = seed_copy(&client, &admin).await;
    let response = client
        .post(format!("{}/api/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": over_cap_book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1012);

    // Closing one loan frees a slot.
    let response = client
        .get(format!("{}/api/borrows?status=checked_out", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["data"]["items"]
        .as_array()
        .expect("items array")
        .iter()
        .find(|r| r["book_id"] == last_book_id)
        .and_then(|r| r["id"].as_i64())
        .expect("open record for last borrow");

    let response = client
        .post(format!("{}/api/borrows/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": last_book_id,
            "borrow_id": borrow_id,
            "status": "returned",
            "late_fee": "0"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "return failed: {}", body["message"]);

    let response = client
        .post(format!("{}/api/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": over_cap_book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "borrow after free slot failed: {}", body["message"]);
}

#[tokio::test]
#[ignore]
async fn test_renew_respects_cap() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let (_isbn, book_id) = seed_copy(&client, &admin).await;
    let token = get_member_token(&client).await;

    let response = client
        .post(format!("{}/api/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["data"]["borrow_id"].as_i64().expect("No borrow id");

    // Default policy allows two renewals.
    for expected_count in 1..=2 {
        let response = client
            .post(format!("{}/api/borrows/renew", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "borrow_id": borrow_id, "add_days": 7 }))
            .send()
            .await
            .expect("Failed to send request");
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], 0, "renew failed: {}", body["message"]);
        assert_eq!(body["data"]["renewal_count"], expected_count);
    }

    let response = client
        .post(format!("{}/api/borrows/renew", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "borrow_id": borrow_id, "add_days": 7 }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1010);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_type_in_use() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let (isbn, book_id) = seed_copy(&client, &token).await;

    let response = client
        .delete(format!("{}/api/booktypes/{}", BASE_URL, isbn))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1011);

    // After removing the copy the catalog entry can go.
    let response = client
        .delete(format!("{}/api/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0);

    let response = client
        .delete(format!("{}/api/booktypes/{}", BASE_URL, isbn))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_history_filter() {
    let client = Client::new();
    let token = get_member_token(&client).await;

    let response = client
        .get(format!("{}/api/borrows?status=checked_out", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0);
    assert!(body["data"]["items"].is_array());
    assert_eq!(body["data"]["total"], 0);

    let response = client
        .get(format!("{}/api/borrows?status=bogus", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 5);
}

#[tokio::test]
#[ignore]
async fn test_reservation_lifecycle() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let (_isbn, book_id) = seed_copy(&client, &token).await;

    // Expiry in the past is rejected.
    let response = client
        .post(format!("{}/api/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "expiry_date": "2000-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1009);

    let response = client
        .post(format!("{}/api/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "expiry_date": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0, "reserve failed: {}", body["message"]);
    assert_eq!(body["data"]["status"], "pending");
    let reservation_id = body["data"]["id"].as_i64().expect("No reservation id");

    let response = client
        .delete(format!("{}/api/reservations/{}", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "cancelled");

    // Cancelling twice fails.
    let response = client
        .delete(format!("{}/api/reservations/{}", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1013);
}
