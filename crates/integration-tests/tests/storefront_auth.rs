//! Integration tests for the sign-up, verification, and sign-in flows.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p easytech-storefront)
//!
//! Run with: cargo test -p easytech-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Database pool for reading verification codes and asserting state.
async fn db() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set for integration tests");
    PgPool::connect(&url).await.expect("Failed to connect to database")
}

/// Create a cookie-holding HTTP client.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Read the current verification code for a pending registration.
async fn current_code(pool: &PgPool, signup_id: Uuid) -> String {
    sqlx::query("SELECT code FROM signups WHERE id = $1")
        .bind(signup_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read verification code")
        .get("code")
}

/// Start a sign-up for a fresh random email; returns the signup handle.
async fn start_signup(client: &Client, email: &str) -> Uuid {
    let resp = client
        .post(format!("{}/auth/sign-up", base_url()))
        .json(&json!({
            "first_name": "John",
            "last_name": "Doe",
            "email": email,
            "password": "Secr3t!23",
        }))
        .send()
        .await
        .expect("Failed to start sign-up");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse sign-up response");
    body["signup_id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("sign-up response carries a signup_id")
}

// ============================================================================
// Sign-up & Verification
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server, PostgreSQL, and an identity provider stub"]
async fn test_signup_verify_then_profile_shows_merged_view() {
    let client = client();
    let pool = db().await;

    let email = format!("john+{}@example.com", Uuid::new_v4().simple());
    let signup_id = start_signup(&client, &email).await;

    // Verify with the code that was just issued
    let code = current_code(&pool, signup_id).await;
    let resp = client
        .post(format!("{}/auth/verify-email", base_url()))
        .json(&json!({ "signup_id": signup_id, "code": code }))
        .send()
        .await
        .expect("Failed to verify email");
    assert_eq!(resp.status(), StatusCode::OK);

    // Verification established a session; the profile is immediately readable
    let resp = client
        .get(format!("{}/account/profile", base_url()))
        .send()
        .await
        .expect("Failed to load profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let profile: Value = resp.json().await.expect("Failed to parse profile");
    assert_eq!(profile["display_name"], "John Doe");
    assert_eq!(profile["display_email"], email.to_lowercase());
}

#[tokio::test]
#[ignore = "Requires running storefront server, PostgreSQL, and an identity provider stub"]
async fn test_resend_invalidates_previous_code() {
    let client = client();
    let pool = db().await;

    let email = format!("resend+{}@example.com", Uuid::new_v4().simple());
    let signup_id = start_signup(&client, &email).await;
    let old_code = current_code(&pool, signup_id).await;

    // Reissue; the single code slot is overwritten
    let resp = client
        .post(format!("{}/auth/resend-code", base_url()))
        .json(&json!({ "signup_id": signup_id }))
        .send()
        .await
        .expect("Failed to resend code");
    assert_eq!(resp.status(), StatusCode::OK);

    let new_code = current_code(&pool, signup_id).await;

    // The old code no longer verifies (unless the reissue happened to
    // generate the same 6 digits, in which case there is nothing to test)
    if old_code != new_code {
        let resp = client
            .post(format!("{}/auth/verify-email", base_url()))
            .json(&json!({ "signup_id": signup_id, "code": old_code }))
            .send()
            .await
            .expect("Failed to attempt verification");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    // The new code does
    let resp = client
        .post(format!("{}/auth/verify-email", base_url()))
        .json(&json!({ "signup_id": signup_id, "code": new_code }))
        .send()
        .await
        .expect("Failed to verify with new code");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server, PostgreSQL, and an identity provider stub"]
async fn test_wrong_code_is_rejected_and_verification_is_one_shot() {
    let client = client();
    let pool = db().await;

    let email = format!("oneshot+{}@example.com", Uuid::new_v4().simple());
    let signup_id = start_signup(&client, &email).await;
    let code = current_code(&pool, signup_id).await;

    // A mismatched code fails
    let wrong = if code == "000000" { "000001" } else { "000000" };
    let resp = client
        .post(format!("{}/auth/verify-email", base_url()))
        .json(&json!({ "signup_id": signup_id, "code": wrong }))
        .send()
        .await
        .expect("Failed to attempt verification");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The right code succeeds once
    let resp = client
        .post(format!("{}/auth/verify-email", base_url()))
        .json(&json!({ "signup_id": signup_id, "code": &code }))
        .send()
        .await
        .expect("Failed to verify");
    assert_eq!(resp.status(), StatusCode::OK);

    // ...and only once
    let resp = client
        .post(format!("{}/auth/verify-email", base_url()))
        .json(&json!({ "signup_id": signup_id, "code": &code }))
        .send()
        .await
        .expect("Failed to re-attempt verification");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded demo user"]
async fn test_sign_in_with_wrong_password_issues_no_session() {
    let client = client();

    // Demo user from `et-cli seed`
    let resp = client
        .post(format!("{}/auth/sign-in", base_url()))
        .json(&json!({ "telephone": "01500000000", "password": "wrong-password-1" }))
        .send()
        .await
        .expect("Failed to attempt sign-in");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get("set-cookie").is_none());

    // With no session, the profile is unreachable
    let resp = client
        .get(format!("{}/account/profile", base_url()))
        .send()
        .await
        .expect("Failed to request profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded demo user"]
async fn test_sign_in_then_sign_out() {
    let client = client();

    let resp = client
        .post(format!("{}/auth/sign-in", base_url()))
        .json(&json!({ "telephone": "01500000000", "password": "Secr3t!23" }))
        .send()
        .await
        .expect("Failed to sign in");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse sign-in response");
    assert_eq!(body["telephone"], "01500000000");
    // The password hash never appears in any response
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let resp = client
        .get(format!("{}/account/profile", base_url()))
        .send()
        .await
        .expect("Failed to load profile");
    assert_eq!(resp.status(), StatusCode::OK);

    // Sign out destroys the session
    let resp = client
        .post(format!("{}/auth/sign-out", base_url()))
        .send()
        .await
        .expect("Failed to sign out");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/account/profile", base_url()))
        .send()
        .await
        .expect("Failed to request profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_sign_in_with_missing_fields_is_rejected() {
    let client = client();

    let resp = client
        .post(format!("{}/auth/sign-in", base_url()))
        .json(&json!({ "telephone": "", "password": "" }))
        .send()
        .await
        .expect("Failed to attempt sign-in");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
