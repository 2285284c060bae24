use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    db::rating::{list_ratings_for_user, recompute_manga_rating, upsert_rating},
    error::Error,
    model::{Rating, User},
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] ratings", skip_all, fields(user_id = user.id))]
pub async fn index(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<Rating>>, Error> {
    let ratings = list_ratings_for_user(&app_state.pool, user.id).await?;

    Ok(Json(ratings))
}

#[derive(Deserialize)]
pub struct RatingRequest {
    pub manga: Option<i64>,
    pub score: Option<i64>,
}

/// Second submission from the same user overwrites the score; every write
/// re-derives the manga's average.
#[tracing::instrument(name = "[POST] ratings", skip_all, fields(user_id = user.id))]
pub async fn store(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Json(request): Json<RatingRequest>,
) -> Result<(StatusCode, Json<Rating>), Error> {
    let (manga_id, score) = match (request.manga, request.score) {
        (Some(manga_id), Some(score)) => (manga_id, score),
        _ => {
            return Err(Error::BadRequest(
                "manga and score are required".to_string(),
            ));
        }
    };

    if !(1..=5).contains(&score) {
        return Err(Error::BadRequest(
            "score must be between 1 and 5".to_string(),
        ));
    }

    let rating = upsert_rating(&app_state.pool, user.id, manga_id, score).await?;
    recompute_manga_rating(&app_state.pool, manga_id).await?;

    Ok((StatusCode::CREATED, Json(rating)))
}
