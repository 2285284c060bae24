use axum::http::StatusCode;
use http_body_util::BodyExt;

use crate::{TestApp, get_request};

#[tokio::test]
async fn home_should_be_alive() {
    let app = TestApp::new().await;

    let response = app.response(get_request("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Alive");
}
