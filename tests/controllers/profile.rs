use axum::http::StatusCode;
use serde_json::json;

use crate::{TestApp, authed_json_request, authed_request, body_json, get_request, json_request};

#[tokio::test]
async fn profile_requires_authentication() {
    let app = TestApp::new().await;

    let response = app.response(get_request("/api/profile")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_returns_own_account() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_request("GET", "/api/profile", &token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], user.id);
    assert_eq!(body["username"], "reader");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn profile_update_changes_username_and_email() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_json_request(
            "PUT",
            "/api/profile",
            &token,
            json!({ "username": "bookworm", "email": "bookworm@localhost" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "bookworm");
    assert_eq!(body["email"], "bookworm@localhost");
}

#[tokio::test]
async fn profile_password_change_rotates_credentials() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_json_request(
            "PUT",
            "/api/profile",
            &token,
            json!({ "password": "next-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .response(json_request(
            "POST",
            "/api/auth",
            json!({ "username": "reader", "password": "next-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .response(json_request(
            "POST",
            "/api/auth",
            json!({ "username": "reader", "password": "secret-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
