use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};

use crate::{TestApp, authed_request, get_request};

#[tokio::test]
async fn missing_authorization_header_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.response(get_request("/api/profile")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_header_is_unauthorized() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/api/profile")
        .header(http::header::AUTHORIZATION, "random-string")
        .body(Body::empty())
        .unwrap();

    let response = app.response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/api/profile")
        .header(http::header::AUTHORIZATION, "not-bearer random-string")
        .body(Body::empty())
        .unwrap();

    let response = app.response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .response(authed_request("GET", "/api/profile", "not-a-real-token"))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_deleted_user_is_unauthorized() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("reader", "secret-password", false).await;

    sqlx::query("DELETE FROM users WHERE id = ?;")
        .bind(user.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let response = app
        .response(authed_request("GET", "/api/profile", &token))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_passes_through() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_request("GET", "/api/profile", &token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn staff_gate_rejects_regular_users() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_request("GET", "/api/admin/users", &token))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_gate_admits_staff() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("admin", "secret-password", true).await;

    let response = app
        .response(authed_request("GET", "/api/admin/users", &token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}
