use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    db::comment::{
        CommentQuery, NewComment, delete_comment, get_comment, insert_comment, list_comments,
        update_comment,
    },
    error::Error,
    middlewares::MaybeUser,
    model::{Comment, User},
    state::SharedAppState,
};

#[derive(Deserialize)]
pub struct CommentListQuery {
    pub manga: Option<i64>,
    pub chapter: Option<i64>,
    pub ordering: Option<String>,
}

#[tracing::instrument(name = "[GET] comments", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<Vec<Comment>>, Error> {
    let ascending = match query.ordering.as_deref() {
        None | Some("-created_at") => false,
        Some("created_at") => true,
        Some(other) => {
            return Err(Error::BadRequest(format!("invalid ordering field: {other}")));
        }
    };

    let comments = list_comments(
        &app_state.pool,
        &CommentQuery {
            manga_id: query.manga,
            chapter_id: query.chapter,
            ascending,
        },
    )
    .await?;

    Ok(Json(comments))
}

#[tracing::instrument(name = "[GET] comments/{id}", skip_all, fields(comment_id = id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<Json<Comment>, Error> {
    let comment = get_comment(&app_state.pool, id).await?;

    Ok(Json(comment))
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub manga: Option<i64>,
    pub chapter: Option<i64>,
    pub name: Option<String>,
    pub content: Option<String>,
}

/// Guests may comment under any display name; an authenticated caller's
/// identity overrides whatever the client submitted.
#[tracing::instrument(name = "[POST] comments", skip_all)]
pub async fn store(
    Extension(MaybeUser(user)): Extension<MaybeUser>,
    State(app_state): State<SharedAppState>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), Error> {
    let manga_id = request
        .manga
        .ok_or_else(|| Error::BadRequest("manga is required".to_string()))?;
    let content = match request.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Err(Error::BadRequest("content is required".to_string())),
    };

    let (user_id, name) = match &user {
        Some(user) => (Some(user.id), user.username.clone()),
        None => (
            None,
            request
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Guest".to_string()),
        ),
    };

    let comment = insert_comment(
        &app_state.pool,
        &NewComment {
            manga_id,
            chapter_id: request.chapter,
            user_id,
            name,
            content,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Owner, staff, or anyone when the comment was left anonymously.
fn can_mutate(comment: &Comment, caller: &User) -> bool {
    match comment.user {
        Some(owner_id) => owner_id == caller.id || caller.is_staff,
        None => true,
    }
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

#[tracing::instrument(name = "[PUT] comments/{id}", skip_all, fields(comment_id = id))]
pub async fn update(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, Error> {
    let content = match request.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Err(Error::BadRequest("content is required".to_string())),
    };

    let comment = get_comment(&app_state.pool, id).await?;
    if !can_mutate(&comment, &user) {
        return Err(Error::Forbidden);
    }

    let updated = update_comment(&app_state.pool, id, &content).await?;

    Ok(Json(updated))
}

#[tracing::instrument(name = "[DELETE] comments/{id}", skip_all, fields(comment_id = id))]
pub async fn destroy(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    let comment = get_comment(&app_state.pool, id).await?;
    if !can_mutate(&comment, &user) {
        return Err(Error::Forbidden);
    }

    delete_comment(&app_state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
