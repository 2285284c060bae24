use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    db::genre::{delete_genre, insert_genre, list_genres, update_genre},
    error::Error,
    model::Genre,
    state::SharedAppState,
};

#[derive(Deserialize)]
pub struct GenreListQuery {
    pub search: Option<String>,
}

#[tracing::instrument(name = "[GET] genres", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<GenreListQuery>,
) -> Result<Json<Vec<Genre>>, Error> {
    let genres = list_genres(&app_state.pool, query.search.as_deref()).await?;

    Ok(Json(genres))
}

#[derive(Deserialize)]
pub struct GenreRequest {
    pub name: Option<String>,
}

impl GenreRequest {
    fn name(self) -> Result<String, Error> {
        match self.name {
            Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
            _ => Err(Error::BadRequest("name is required".to_string())),
        }
    }
}

#[tracing::instrument(name = "[POST] genres", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<GenreRequest>,
) -> Result<(StatusCode, Json<Genre>), Error> {
    let genre = insert_genre(&app_state.pool, &request.name()?).await?;

    Ok((StatusCode::CREATED, Json(genre)))
}

#[tracing::instrument(name = "[PUT] genres/{id}", skip_all, fields(genre_id = id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
    Json(request): Json<GenreRequest>,
) -> Result<Json<Genre>, Error> {
    let genre = update_genre(&app_state.pool, id, &request.name()?).await?;

    Ok(Json(genre))
}

#[tracing::instrument(name = "[DELETE] genres/{id}", skip_all, fields(genre_id = id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    delete_genre(&app_state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
