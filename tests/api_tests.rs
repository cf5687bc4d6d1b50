//! API integration tests
//!
//! These run against a live server with a seeded admin (admin@unilib.edu /
//! admin) and librarian (librarian@unilib.edu / librarian) account.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

async fn login(client: &Client, path: &str, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, "/admin/admin_login", "admin@unilib.edu", "admin").await
}

async fn librarian_token(client: &Client) -> String {
    login(client, "/login", "librarian@unilib.edu", "librarian").await
}

/// Register a throwaway member and return (token, email)
async fn register_member(client: &Client, tag: &str) -> (String, String) {
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let email = format!("member-{}-{}@unilib.edu", tag, nonce);

    let form = reqwest::multipart::Form::new()
        .text("name", "Test Member")
        .text("email", email.clone())
        .text("password", "member-pass");

    let response = client
        .post(format!("{}/register", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    let token = login(client, "/login", &email, "member-pass").await;
    (token, email)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_readiness_reports_sources() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["sources"].is_array());
    assert_eq!(body["sources"][0]["name"], "Local");
}

#[tokio::test]
#[ignore]
async fn test_search_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert!(body["notices"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_search_ignores_unlisted_sort() {
    let client = Client::new();

    // A hostile sort value must not fault the server or change the query
    let response = client
        .get(format!("{}/?sort=title;%20DROP%20TABLE%20users", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email_rejected() {
    let client = Client::new();
    let (_, email) = register_member(&client, "dup").await;

    // Same email, different case
    let form = reqwest::multipart::Form::new()
        .text("name", "Other")
        .text("email", email.to_uppercase())
        .text("password", "other-pass");

    let response = client
        .post(format!("{}/register", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_admin_rejected_on_member_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "email": "admin@unilib.edu", "password": "admin" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["redirect_to"], "/admin/admin_login");
    assert!(body.get("token").is_none());
}

#[tokio::test]
#[ignore]
async fn test_librarian_lands_on_dashboard() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "email": "librarian@unilib.edu", "password": "librarian" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["landing"], "/librarian/");
}

#[tokio::test]
#[ignore]
async fn test_logout_destroys_session() {
    let client = Client::new();
    let (token, _) = register_member(&client, "logout").await;

    let response = client
        .get(format!("{}/logout", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // The token no longer resolves
    let response = client
        .get(format!("{}/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_library_add_is_idempotent() {
    let client = Client::new();
    let (member, _) = register_member(&client, "idem").await;
    let librarian = librarian_token(&client).await;

    // Seed a book with a PDF
    let form = reqwest::multipart::Form::new()
        .text("title", "Idempotence Study")
        .text("author", "Some Author")
        .text("university", "Test University")
        .text("department", "CS")
        .text("year_published", "2020")
        .part(
            "pdf_file",
            reqwest::multipart::Part::bytes(b"%PDF-1.4 test".to_vec()).file_name("t.pdf"),
        );

    let response = client
        .post(format!("{}/librarian/add", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["book_id"].as_i64().expect("No book ID");

    // First add creates the entry
    let response = client
        .post(format!("{}/library/add/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member))
        .json(&json!({ "source": "Local" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Second add is a no-op
    let response = client
        .post(format!("{}/library/add/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member))
        .json(&json!({ "source": "Local" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Exactly one entry
    let response = client
        .get(format!("{}/library/my-library", BASE_URL))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");

    let entries: Value = response.json().await.expect("Failed to parse response");
    let count = entries
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["book_id"].as_i64() == Some(book_id))
        .count();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore]
async fn test_library_remove_absent_is_noop() {
    let client = Client::new();
    let (member, _) = register_member(&client, "noop").await;

    let response = client
        .post(format!("{}/library/remove/999999", BASE_URL))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_missing_pdf_is_not_found() {
    let client = Client::new();
    let (member, _) = register_member(&client, "nopdf").await;

    // Metadata-only add: no PDF stored
    let response = client
        .post(format!("{}/add", BASE_URL))
        .header("Authorization", format!("Bearer {}", member))
        .json(&json!({
            "title": "No Attachment",
            "author": "Nobody",
            "university": "Test University",
            "department": "CS",
            "year_published": 2021
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["book_id"].as_i64().expect("No book ID");

    let response = client
        .post(format!("{}/library/add/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/library/pdf/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_admin_cannot_delete_self() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let me: Value = response.json().await.expect("Failed to parse response");
    let my_id = me["user_id"].as_i64().expect("No user id");

    let response = client
        .post(format!("{}/admin/delete_user/{}", BASE_URL, my_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);

    // The account still exists and the session still works
    let response = client
        .get(format!("{}/admin/dashboard", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_reach_librarian_routes() {
    let client = Client::new();
    let (member, _) = register_member(&client, "gate").await;

    let response = client
        .get(format!("{}/librarian/", BASE_URL))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["redirect_to"], "/login");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_request_redirects_to_login() {
    let client = Client::new();

    let response = client
        .get(format!("{}/library/my-library", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["redirect_to"], "/login");
}

#[tokio::test]
#[ignore]
async fn test_delete_account_destroys_session() {
    let client = Client::new();
    let (token, _) = register_member(&client, "delete").await;

    let response = client
        .post(format!("{}/profile/delete_account", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
