use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{decode_jwt, error::AuthError},
    db::user::get_user_by_id_optional,
    error::Error,
    model::User,
    state::SharedAppState,
};

/// Caller identity for routes that are open to guests. `None` when no valid
/// bearer token was presented.
#[derive(Clone)]
pub struct MaybeUser(pub Option<Arc<User>>);

fn bearer_token(req: &Request) -> Result<Option<String>, Error> {
    let auth_header = match req.headers().get(axum::http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|e| Error::Other(e.into()))?,
        None => return Ok(None),
    };

    let mut header = auth_header.split_whitespace();
    let (bearer_option, token_option) = (header.next(), header.next());

    let bearer = match bearer_option {
        Some(value) => value.to_lowercase(),
        None => return Ok(None),
    };

    if bearer != *"bearer" {
        return Ok(None);
    }

    Ok(token_option.map(ToString::to_string))
}

#[tracing::instrument(name = "[MIDDLEWARE] jwt auth", skip_all)]
pub async fn jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let token = bearer_token(&req)?.ok_or(Error::Auth(AuthError::Unauthenticated))?;

    let token_data = decode_jwt(token, &app_state.config.jwt)
        .map_err(|_| Error::Auth(AuthError::Unauthenticated))?;

    let user_optional = get_user_by_id_optional(&app_state.pool, token_data.claims.user_id).await?;
    let user = match user_optional {
        Some(user) => Arc::new(user),
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Like [`jwt_auth_middleware`] but never rejects: an invalid or absent
/// token simply leaves the caller anonymous.
#[tracing::instrument(name = "[MIDDLEWARE] optional jwt auth", skip_all)]
pub async fn optional_jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let user = match bearer_token(&req)? {
        Some(token) => match decode_jwt(token, &app_state.config.jwt) {
            Ok(token_data) => get_user_by_id_optional(&app_state.pool, token_data.claims.user_id)
                .await?
                .map(Arc::new),
            Err(_) => None,
        },
        None => None,
    };

    req.extensions_mut().insert(MaybeUser(user));

    Ok(next.run(req).await)
}

/// Must run inside [`jwt_auth_middleware`]; rejects callers without the
/// staff flag.
#[tracing::instrument(name = "[MIDDLEWARE] staff auth", skip_all)]
pub async fn staff_auth_middleware(req: Request, next: Next) -> Result<Response<Body>, Error> {
    let user = req
        .extensions()
        .get::<Arc<User>>()
        .ok_or(Error::Auth(AuthError::Unauthenticated))?;

    if !user.is_staff {
        return Err(Error::Forbidden);
    }

    Ok(next.run(req).await)
}
