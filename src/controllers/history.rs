use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    db::reading_history::{delete_history, list_history_for_user, upsert_history},
    error::Error,
    model::{ReadingHistory, User},
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] history", skip_all, fields(user_id = user.id))]
pub async fn index(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<ReadingHistory>>, Error> {
    let history = list_history_for_user(&app_state.pool, user.id).await?;

    Ok(Json(history))
}

#[derive(Deserialize)]
pub struct UpdateHistoryRequest {
    pub manga: Option<i64>,
    pub chapter: Option<i64>,
}

/// One row per (user, manga): a new chapter read replaces the previous one.
#[tracing::instrument(name = "[POST] history/update_history", skip_all, fields(user_id = user.id))]
pub async fn update_history(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Json(request): Json<UpdateHistoryRequest>,
) -> Result<Json<ReadingHistory>, Error> {
    let (manga_id, chapter_id) = match (request.manga, request.chapter) {
        (Some(manga_id), Some(chapter_id)) => (manga_id, chapter_id),
        _ => {
            return Err(Error::BadRequest(
                "manga and chapter are required".to_string(),
            ));
        }
    };

    let history = upsert_history(&app_state.pool, user.id, manga_id, chapter_id).await?;

    Ok(Json(history))
}

#[tracing::instrument(name = "[DELETE] history/{id}", skip_all, fields(user_id = user.id, history_id = id))]
pub async fn destroy(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    delete_history(&app_state.pool, user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
