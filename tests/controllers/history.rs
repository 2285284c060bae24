use axum::http::StatusCode;
use serde_json::json;

use crate::{
    TestApp, authed_json_request, authed_request, body_json, insert_fake_chapter,
    insert_fake_manga,
};

#[tokio::test]
async fn update_history_requires_manga_and_chapter() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    for body in [json!({}), json!({ "manga": 1 }), json!({ "chapter": 1 })] {
        let response = app
            .response(authed_json_request(
                "POST",
                "/api/history/update_history",
                &token,
                body,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "manga and chapter are required");
    }
}

#[tokio::test]
async fn rereading_keeps_only_the_latest_chapter() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("reader", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Ongoing", "Manhwa").await;
    let first_chapter = insert_fake_chapter(&app.pool, manga_id, "1", &[]).await;
    let second_chapter = insert_fake_chapter(&app.pool, manga_id, "2", &[]).await;

    for chapter in [first_chapter, second_chapter] {
        let response = app
            .response(authed_json_request(
                "POST",
                "/api/history/update_history",
                &token,
                json!({ "manga": manga_id, "chapter": chapter }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (rows, chapter_id): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), MAX(chapter_id) FROM reading_history WHERE user_id = ? AND manga_id = ?;",
    )
    .bind(user.id)
    .bind(manga_id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(chapter_id, second_chapter);
}

#[tokio::test]
async fn listing_embeds_manga_and_chapter_details() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Ongoing", "Manhwa").await;
    let chapter_id = insert_fake_chapter(&app.pool, manga_id, "7", &[]).await;

    app.response(authed_json_request(
        "POST",
        "/api/history/update_history",
        &token,
        json!({ "manga": manga_id, "chapter": chapter_id }),
    ))
    .await;

    let response = app
        .response(authed_request("GET", "/api/history", &token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["manga_title"], "Ongoing");
    assert_eq!(entries[0]["chapter_number"], "7");
}

#[tokio::test]
async fn history_entry_can_be_deleted_by_its_owner_only() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.create_user("owner", "secret-password", false).await;
    let (_, other_token) = app.create_user("other", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Ongoing", "Manhwa").await;
    let chapter_id = insert_fake_chapter(&app.pool, manga_id, "1", &[]).await;

    let response = app
        .response(authed_json_request(
            "POST",
            "/api/history/update_history",
            &owner_token,
            json!({ "manga": manga_id, "chapter": chapter_id }),
        ))
        .await;
    let history_id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .response(authed_request(
            "DELETE",
            &format!("/api/history/{history_id}"),
            &other_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .response(authed_request(
            "DELETE",
            &format!("/api/history/{history_id}"),
            &owner_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
