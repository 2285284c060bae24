use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    db::bookmark::{delete_bookmark, insert_bookmark, list_bookmarks_for_user},
    error::Error,
    model::{Bookmark, User},
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] bookmarks", skip_all, fields(user_id = user.id))]
pub async fn index(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<Bookmark>>, Error> {
    let bookmarks = list_bookmarks_for_user(&app_state.pool, user.id).await?;

    Ok(Json(bookmarks))
}

#[derive(Deserialize)]
pub struct BookmarkRequest {
    pub manga: Option<i64>,
}

#[tracing::instrument(name = "[POST] bookmarks", skip_all, fields(user_id = user.id))]
pub async fn store(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Json(request): Json<BookmarkRequest>,
) -> Result<(StatusCode, Json<Bookmark>), Error> {
    let manga_id = request
        .manga
        .ok_or_else(|| Error::BadRequest("manga is required".to_string()))?;

    let bookmark = insert_bookmark(&app_state.pool, user.id, manga_id).await?;

    Ok((StatusCode::CREATED, Json(bookmark)))
}

#[tracing::instrument(name = "[DELETE] bookmarks/{id}", skip_all, fields(user_id = user.id, bookmark_id = id))]
pub async fn destroy(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    delete_bookmark(&app_state.pool, user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
