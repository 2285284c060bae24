use axum::http::StatusCode;
use serde_json::json;

use crate::{TestApp, authed_request, body_json, json_request};

#[tokio::test]
async fn register_creates_account_without_leaking_password() {
    let app = TestApp::new().await;

    let response = app
        .response(json_request(
            "POST",
            "/api/register",
            json!({
                "username": "reader",
                "email": "reader@localhost",
                "password": "secret-password"
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "reader");
    assert_eq!(body["email"], "reader@localhost");
    assert_eq!(body["is_staff"], false);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let app = TestApp::new().await;
    app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(json_request(
            "POST",
            "/api/register",
            json!({
                "username": "reader",
                "email": "other@localhost",
                "password": "secret-password"
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_invalid_email_and_short_password() {
    let app = TestApp::new().await;

    let response = app
        .response(json_request(
            "POST",
            "/api/register",
            json!({
                "username": "reader",
                "email": "not-an-email",
                "password": "short"
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_usable_token() {
    let app = TestApp::new().await;
    app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(json_request(
            "POST",
            "/api/auth",
            json!({ "username": "reader", "password": "secret-password" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    let response = app
        .response(authed_request("GET", "/api/profile", &token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["username"], "reader");
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_user() {
    let app = TestApp::new().await;
    app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(json_request(
            "POST",
            "/api/auth",
            json!({ "username": "reader", "password": "wrong-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .response(json_request(
            "POST",
            "/api/auth",
            json!({ "username": "nobody", "password": "secret-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
