use axum::http::StatusCode;
use serde_json::json;

use crate::{TestApp, authed_json_request, authed_request, body_json, insert_fake_manga};

#[tokio::test]
async fn rating_requires_manga_and_score() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;

    for body in [json!({}), json!({ "manga": 1 }), json!({ "score": 4 })] {
        let response = app
            .response(authed_json_request("POST", "/api/ratings", &token, body))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "manga and score are required");
    }
}

#[tokio::test]
async fn rating_score_must_be_between_one_and_five() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("reader", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Rated", "Manhwa").await;

    for score in [0, 6] {
        let response = app
            .response(authed_json_request(
                "POST",
                "/api/ratings",
                &token,
                json!({ "manga": manga_id, "score": score }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn second_submission_overwrites_score() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("reader", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Rated", "Manhwa").await;

    for score in [4, 2] {
        let response = app
            .response(authed_json_request(
                "POST",
                "/api/ratings",
                &token,
                json!({ "manga": manga_id, "score": score }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let (rows, score): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), MAX(score) FROM ratings WHERE user_id = ? AND manga_id = ?;",
    )
    .bind(user.id)
    .bind(manga_id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(score, 2);

    let rating: f64 = sqlx::query_scalar("SELECT rating FROM mangas WHERE id = ?;")
        .bind(manga_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rating, 2.0);
}

#[tokio::test]
async fn manga_rating_is_rounded_mean_of_all_scores() {
    let app = TestApp::new().await;
    let (_, first_token) = app.create_user("first", "secret-password", false).await;
    let (_, second_token) = app.create_user("second", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Divisive", "Manhwa").await;

    for (token, score) in [(&first_token, 4), (&second_token, 5)] {
        app.response(authed_json_request(
            "POST",
            "/api/ratings",
            token,
            json!({ "manga": manga_id, "score": score }),
        ))
        .await;
    }

    let rating: f64 = sqlx::query_scalar("SELECT rating FROM mangas WHERE id = ?;")
        .bind(manga_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rating, 4.5);
}

#[tokio::test]
async fn listing_returns_only_own_ratings() {
    let app = TestApp::new().await;
    let (_, first_token) = app.create_user("first", "secret-password", false).await;
    let (_, second_token) = app.create_user("second", "secret-password", false).await;
    let manga_id = insert_fake_manga(&app.pool, "Rated", "Manhwa").await;

    app.response(authed_json_request(
        "POST",
        "/api/ratings",
        &first_token,
        json!({ "manga": manga_id, "score": 3 }),
    ))
    .await;

    let response = app
        .response(authed_request("GET", "/api/ratings", &second_token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rating_requires_authentication() {
    let app = TestApp::new().await;

    let response = app
        .response(crate::json_request(
            "POST",
            "/api/ratings",
            json!({ "manga": 1, "score": 4 }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
