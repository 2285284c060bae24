use axum::http::StatusCode;
use serde_json::json;

use crate::{TestApp, authed_json_request, authed_request, body_json, json_request};

#[tokio::test]
async fn user_management_is_staff_only() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_request("GET", "/api/admin/users", &token))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_can_list_accounts() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.create_user("admin", "secret-password", true).await;
    app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_request("GET", "/api/admin/users", &admin_token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|user| user.get("password").is_none()));
}

#[tokio::test]
async fn staff_can_delete_account() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.create_user("admin", "secret-password", true).await;
    let (reader, reader_token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_request(
            "DELETE",
            &format!("/api/admin/users/{}", reader.id),
            &admin_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // the deleted account's token stops working
    let response = app
        .response(authed_request("GET", "/api/profile", &reader_token))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reset_password_requires_new_password_value() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.create_user("admin", "secret-password", true).await;
    let (reader, _) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_json_request(
            "POST",
            &format!("/api/admin/users/{}/reset_password", reader.id),
            &admin_token,
            json!({}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "new_password is required");
}

#[tokio::test]
async fn reset_password_sets_new_credentials() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.create_user("admin", "secret-password", true).await;
    let (reader, _) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_json_request(
            "POST",
            &format!("/api/admin/users/{}/reset_password", reader.id),
            &admin_token,
            json!({ "new_password": "reset-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .response(json_request(
            "POST",
            "/api/auth",
            json!({ "username": "reader", "password": "reset-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reset_password_on_unknown_account_is_not_found() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.create_user("admin", "secret-password", true).await;

    let response = app
        .response(authed_json_request(
            "POST",
            "/api/admin/users/9999/reset_password",
            &admin_token,
            json!({ "new_password": "reset-password" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
