//! Integration tests for the authentication endpoints
//!
//! These run against a real database (TEST_DATABASE_URL) and are ignored by
//! default: `cargo test -- --ignored` with a database available.

mod common;

use axum::http::StatusCode;
use serde_json::json;

fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, uuid::Uuid::new_v4())
}

/// Pull the accessToken cookie pair ("accessToken=...") out of Set-Cookie
fn access_token_cookie(response: &common::TestResponse) -> Option<String> {
    response
        .set_cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .and_then(|c| c.split(';').next())
        .map(String::from)
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_student_signup_success_returns_sanitized_profile() {
    let app = common::TestApp::new().await;

    let email = unique_email("signup");
    let body = json!({
        "email": email,
        "password": "secret1",
        "firstName": "Ada",
        "university": "Cambridge",
        "graduationYear": "2026"
    });

    let response = app.post("/students/signup", &body.to_string()).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let json = response.json();
    assert_eq!(json["data"]["email"], email);
    assert_eq!(json["data"]["firstName"], "Ada");
    assert_eq!(json["data"]["role"], "STUDENT");
    assert!(json["data"].get("passwordHash").is_none());
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_normalizes_email_and_rejects_duplicates() {
    let app = common::TestApp::new().await;

    let email = unique_email("duplicate");
    let body = json!({ "email": email, "password": "secret1" });
    let response = app.post("/students/signup", &body.to_string()).await;
    assert_eq!(response.status, StatusCode::CREATED);

    // Same address with different case and padding is still a duplicate
    let shouty = json!({
        "email": format!("  {}  ", email.to_uppercase()),
        "password": "secret1"
    });
    let response = app.post("/students/signup", &shouty.to_string()).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"]["code"], "EMAIL_IN_USE");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_rejects_bad_input() {
    let app = common::TestApp::new().await;

    // Invalid email
    let response = app
        .post(
            "/students/signup",
            &json!({ "email": "not-an-email", "password": "secret1" }).to_string(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Password below minimum length
    let response = app
        .post(
            "/students/signup",
            &json!({ "email": unique_email("weak"), "password": "123" }).to_string(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Confirmation does not match
    let response = app
        .post(
            "/students/signup",
            &json!({
                "email": unique_email("mismatch"),
                "password": "secret1",
                "confirmPassword": "secret2"
            })
            .to_string(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "PASSWORD_MISMATCH");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_sets_cookie_and_returns_profile() {
    let app = common::TestApp::new().await;

    let email = unique_email("login");
    app.post(
        "/students/signup",
        &json!({ "email": email, "password": "secret1", "major": "CS" }).to_string(),
    )
    .await;

    let response = app
        .post(
            "/students/login",
            &json!({ "email": email, "password": "secret1" }).to_string(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let json = response.json();
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["data"]["email"], email);
    assert!(json["data"].get("passwordHash").is_none());

    let cookie = response
        .set_cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .expect("login must set the accessToken cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_failures_are_undifferentiated() {
    let app = common::TestApp::new().await;

    let email = unique_email("enum");
    app.post(
        "/students/signup",
        &json!({ "email": email, "password": "secret1" }).to_string(),
    )
    .await;

    let wrong_password = app
        .post(
            "/students/login",
            &json!({ "email": email, "password": "wrong" }).to_string(),
        )
        .await;
    let unknown_email = app
        .post(
            "/students/login",
            &json!({ "email": unique_email("ghost"), "password": "secret1" }).to_string(),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    // Identical client-visible message: no account enumeration
    assert_eq!(
        wrong_password.json()["error"]["message"],
        unknown_email.json()["error"]["message"]
    );
    // No cookie on failure
    assert!(access_token_cookie(&wrong_password).is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_round_trip_via_cookie() {
    let app = common::TestApp::new().await;

    let email = unique_email("profile");
    app.post(
        "/students/signup",
        &json!({ "email": email, "password": "secret1", "university": "MIT" }).to_string(),
    )
    .await;
    let login = app
        .post(
            "/students/login",
            &json!({ "email": email, "password": "secret1" }).to_string(),
        )
        .await;
    let cookie = access_token_cookie(&login).unwrap();

    let response = app
        .get("/students/profile", &[("Cookie", cookie)])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let json = response.json();
    assert_eq!(json["data"]["email"], email);
    assert_eq!(json["data"]["university"], "MIT");
    assert!(json["data"].get("passwordHash").is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_update_rehashes_password_and_rechecks_email() {
    let app = common::TestApp::new().await;

    let first = unique_email("upd1");
    let second = unique_email("upd2");
    for email in [&first, &second] {
        app.post(
            "/students/signup",
            &json!({ "email": email, "password": "secret1" }).to_string(),
        )
        .await;
    }

    let login = app
        .post(
            "/students/login",
            &json!({ "email": first, "password": "secret1" }).to_string(),
        )
        .await;
    let cookie = access_token_cookie(&login).unwrap();

    // Taking another account's email is a conflict
    let response = app
        .patch(
            "/students/profile",
            &json!({ "email": second }).to_string(),
            &[("Cookie", cookie.clone())],
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // Password change takes effect on the next login
    let response = app
        .patch(
            "/students/profile",
            &json!({ "password": "newsecret", "major": "Physics" }).to_string(),
            &[("Cookie", cookie)],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["major"], "Physics");

    let old = app
        .post(
            "/students/login",
            &json!({ "email": first, "password": "secret1" }).to_string(),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let new = app
        .post(
            "/students/login",
            &json!({ "email": first, "password": "newsecret" }).to_string(),
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_clears_cookie_with_matching_attributes() {
    let app = common::TestApp::new().await;

    let response = app.post("/students/logout", "{}").await;
    assert_eq!(response.status, StatusCode::OK);

    let cookie = response
        .set_cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .expect("logout must clear the accessToken cookie");
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_company_flow_and_role_separation() {
    let app = common::TestApp::new().await;

    let email = unique_email("acme");
    let response = app
        .post(
            "/companies/signup",
            &json!({
                "companyName": "Acme",
                "email": email,
                "password": "secret1",
                "industry": "Robotics"
            })
            .to_string(),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["data"]["role"], "COMPANY");

    let login = app
        .post(
            "/companies/login",
            &json!({ "email": email, "password": "secret1" }).to_string(),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = access_token_cookie(&login).unwrap();

    let profile = app
        .get("/companies/profile", &[("Cookie", cookie.clone())])
        .await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.json()["data"]["companyName"], "Acme");

    // A company token does not open student resources
    let cross = app.get("/students/profile", &[("Cookie", cookie)]).await;
    assert_eq!(cross.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_signups_yield_one_account() {
    let app = std::sync::Arc::new(common::TestApp::new().await);

    let email = unique_email("race");
    let body = json!({ "email": email, "password": "secret1" }).to_string();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let app = app.clone();
        let body = body.clone();
        handles.push(tokio::spawn(async move {
            app.post("/students/signup", &body).await.status
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 3);

    app.cleanup().await;
}
