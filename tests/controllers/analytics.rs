use axum::http::StatusCode;
use chrono::{Days, Utc};

use crate::{
    TestApp, body_json, get_request, insert_fake_chapter, insert_fake_daily_views,
    insert_fake_manga, set_manga_views,
};

#[tokio::test]
async fn empty_catalog_reports_zeroes_and_a_full_week() {
    let app = TestApp::new().await;

    let response = app.response(get_request("/api/analytics")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_mangas"], 0);
    assert_eq!(body["total_views"], 0);
    assert_eq!(body["total_chapters"], 0);
    assert!(body["top_mangas"].as_array().unwrap().is_empty());

    let chart = body["chart_data"].as_array().unwrap();
    assert_eq!(chart.len(), 7);
    assert!(chart.iter().all(|entry| entry["views"] == 0));
}

#[tokio::test]
async fn totals_and_top_mangas_reflect_catalog() {
    let app = TestApp::new().await;
    let quiet = insert_fake_manga(&app.pool, "Quiet", "Manhwa").await;
    let popular = insert_fake_manga(&app.pool, "Popular", "Manhwa").await;
    insert_fake_chapter(&app.pool, popular, "1", &[]).await;
    insert_fake_chapter(&app.pool, popular, "2", &[]).await;
    set_manga_views(&app.pool, quiet, 5).await;
    set_manga_views(&app.pool, popular, 50).await;

    let response = app.response(get_request("/api/analytics")).await;

    let body = body_json(response).await;
    assert_eq!(body["total_mangas"], 2);
    assert_eq!(body["total_views"], 55);
    assert_eq!(body["total_chapters"], 2);

    let top = body["top_mangas"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["title"], "Popular");
    assert_eq!(top[0]["views"], 50);
}

#[tokio::test]
async fn top_mangas_is_capped_at_five() {
    let app = TestApp::new().await;
    for index in 0..7 {
        let manga_id = insert_fake_manga(&app.pool, &format!("Series {index}"), "Manhwa").await;
        set_manga_views(&app.pool, manga_id, index * 10).await;
    }

    let response = app.response(get_request("/api/analytics")).await;

    let body = body_json(response).await;
    assert_eq!(body["top_mangas"].as_array().unwrap().len(), 5);
    assert_eq!(body["top_mangas"][0]["title"], "Series 6");
}

#[tokio::test]
async fn chart_sums_daily_views_across_mangas_with_zero_backfill() {
    let app = TestApp::new().await;
    let first = insert_fake_manga(&app.pool, "First", "Manhwa").await;
    let second = insert_fake_manga(&app.pool, "Second", "Manhwa").await;

    let today = Utc::now().date_naive();
    let two_days_ago = today.checked_sub_days(Days::new(2)).unwrap();
    let last_week = today.checked_sub_days(Days::new(9)).unwrap();

    insert_fake_daily_views(&app.pool, first, today, 3).await;
    insert_fake_daily_views(&app.pool, second, today, 4).await;
    insert_fake_daily_views(&app.pool, first, two_days_ago, 2).await;
    // outside the trailing window, must not appear
    insert_fake_daily_views(&app.pool, first, last_week, 9).await;

    let response = app.response(get_request("/api/analytics")).await;

    let body = body_json(response).await;
    let chart = body["chart_data"].as_array().unwrap();
    assert_eq!(chart.len(), 7);

    assert_eq!(chart[0]["date"], today.checked_sub_days(Days::new(6)).unwrap().to_string());
    assert_eq!(chart[6]["date"], today.to_string());
    assert_eq!(chart[6]["views"], 7);
    assert_eq!(chart[4]["views"], 2);
    assert_eq!(chart[5]["views"], 0);

    let total: i64 = chart
        .iter()
        .map(|entry| entry["views"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 9);
}
