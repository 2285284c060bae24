use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    db::user::{delete_user, list_users, update_password},
    error::Error,
    model::User,
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] admin/users", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<User>>, Error> {
    let users = list_users(&app_state.pool).await?;

    Ok(Json(users))
}

#[tracing::instrument(name = "[DELETE] admin/users/{id}", skip_all, fields(user_id = id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    delete_user(&app_state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: Option<SecretString>,
}

#[tracing::instrument(name = "[POST] admin/users/{id}/reset_password", skip_all, fields(user_id = id))]
pub async fn reset_password(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<StatusCode, Error> {
    let new_password = request
        .new_password
        .ok_or_else(|| Error::BadRequest("new_password is required".to_string()))?;

    update_password(&app_state.pool, id, new_password).await?;

    Ok(StatusCode::OK)
}
