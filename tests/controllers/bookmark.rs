use axum::http::StatusCode;
use serde_json::json;

use crate::{TestApp, authed_json_request, authed_request, body_json, insert_fake_manga};

#[tokio::test]
async fn bookmark_create_and_list_are_scoped_to_caller() {
    let app = TestApp::new().await;
    let (_, first_token) = app.create_user("first", "secret-password", false).await;
    let (_, second_token) = app.create_user("second", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Saved", "Manhwa").await;

    let response = app
        .response(authed_json_request(
            "POST",
            "/api/bookmarks",
            &first_token,
            json!({ "manga": manga_id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["manga_title"], "Saved");

    let response = app
        .response(authed_request("GET", "/api/bookmarks", &first_token))
        .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app
        .response(authed_request("GET", "/api/bookmarks", &second_token))
        .await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_bookmark_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Saved", "Manhwa").await;

    for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
        let response = app
            .response(authed_json_request(
                "POST",
                "/api/bookmarks",
                &token,
                json!({ "manga": manga_id }),
            ))
            .await;
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn bookmark_requires_manga_field() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    let response = app
        .response(authed_json_request(
            "POST",
            "/api/bookmarks",
            &token,
            json!({}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "manga is required");
}

#[tokio::test]
async fn deleting_someone_elses_bookmark_is_not_found() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.create_user("owner", "secret-password", false).await;
    let (_, other_token) = app.create_user("other", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Saved", "Manhwa").await;

    let response = app
        .response(authed_json_request(
            "POST",
            "/api/bookmarks",
            &owner_token,
            json!({ "manga": manga_id }),
        ))
        .await;
    let bookmark_id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .response(authed_request(
            "DELETE",
            &format!("/api/bookmarks/{bookmark_id}"),
            &other_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .response(authed_request(
            "DELETE",
            &format!("/api/bookmarks/{bookmark_id}"),
            &owner_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
