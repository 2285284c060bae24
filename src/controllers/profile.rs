use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Json, extract::State};
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    auth::compute_password_hash,
    db::user::update_profile,
    error::Error,
    model::User,
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

#[tracing::instrument(name = "[GET] profile", skip_all)]
pub async fn index(Extension(user): Extension<Arc<User>>) -> Result<Json<Arc<User>>, Error> {
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

#[tracing::instrument(name = "[PUT] profile", skip_all, fields(user_id = user.id))]
pub async fn update(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, Error> {
    let password_hashed = match request.password {
        Some(password) => Some(
            spawn_blocking_with_tracing(move || compute_password_hash(password))
                .await
                .context("compute password hash")
                .map_err(Error::Other)??,
        ),
        None => None,
    };

    let updated = update_profile(
        &app_state.pool,
        user.id,
        request.username,
        request.email,
        password_hashed,
    )
    .await?;

    Ok(Json(updated))
}
