use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{HeaderName, Request, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    controllers,
    middlewares::{jwt_auth_middleware, optional_jwt_auth_middleware, staff_auth_middleware},
    state::AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

// 50MB in binary bytes. https://www.gbmb.org/mb-to-bytes
const UPLOAD_BODY_LIMIT: usize = 52_428_800;

pub fn init_router(app_state: AppState) -> Router {
    let media_root = app_state.media.root().to_path_buf();
    let state = Arc::new(app_state);

    let manga_route = Router::new()
        .route("/", get(controllers::manga::index))
        .route("/{id}", get(controllers::manga::show))
        .merge(
            Router::new()
                .route("/", post(controllers::manga::store))
                .route(
                    "/{id}",
                    put(controllers::manga::update)
                        .patch(controllers::manga::update)
                        .delete(controllers::manga::destroy),
                )
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .layer(middleware::from_fn(staff_auth_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_middleware,
                )),
        );

    let chapter_route = Router::new()
        .route("/", get(controllers::chapter::index))
        .route("/{id}", get(controllers::chapter::show))
        .merge(
            Router::new()
                .route("/", post(controllers::chapter::store))
                .route(
                    "/{id}",
                    put(controllers::chapter::update).delete(controllers::chapter::destroy),
                )
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .layer(middleware::from_fn(staff_auth_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_middleware,
                )),
        );

    let genre_route = Router::new()
        .route("/", get(controllers::genre::index))
        .merge(
            Router::new()
                .route("/", post(controllers::genre::store))
                .route(
                    "/{id}",
                    put(controllers::genre::update).delete(controllers::genre::destroy),
                )
                .layer(middleware::from_fn(staff_auth_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_middleware,
                )),
        );

    let comment_route = Router::new()
        .route("/", get(controllers::comment::index))
        .route("/{id}", get(controllers::comment::show))
        .merge(
            Router::new()
                .route("/", post(controllers::comment::store))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    optional_jwt_auth_middleware,
                )),
        )
        .merge(
            Router::new()
                .route(
                    "/{id}",
                    put(controllers::comment::update).delete(controllers::comment::destroy),
                )
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_middleware,
                )),
        );

    let rating_route = Router::new()
        .route("/", get(controllers::rating::index))
        .route("/", post(controllers::rating::store))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let bookmark_route = Router::new()
        .route("/", get(controllers::bookmark::index))
        .route("/", post(controllers::bookmark::store))
        .route("/{id}", delete(controllers::bookmark::destroy))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let history_route = Router::new()
        .route("/", get(controllers::history::index))
        .route("/update_history", post(controllers::history::update_history))
        .route("/{id}", delete(controllers::history::destroy))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let profile_route = Router::new()
        .route(
            "/",
            get(controllers::profile::index).put(controllers::profile::update),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let admin_users_route = Router::new()
        .route("/", get(controllers::admin::users::index))
        .route("/{id}", delete(controllers::admin::users::destroy))
        .route(
            "/{id}/reset_password",
            post(controllers::admin::users::reset_password),
        )
        .layer(middleware::from_fn(staff_auth_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let api = Router::new()
        .route("/auth", post(controllers::auth::store))
        .route("/register", post(controllers::auth::register))
        .route("/analytics", get(controllers::analytics::index))
        .nest("/mangas", manga_route)
        .nest("/chapters", chapter_route)
        .nest("/genres", genre_route)
        .nest("/comments", comment_route)
        .nest("/ratings", rating_route)
        .nest("/bookmarks", bookmark_route)
        .nest("/history", history_route)
        .nest("/profile", profile_route)
        .nest("/admin/users", admin_users_route);

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = match request.headers().get(REQUEST_ID_HEADER) {
                    Some(val) => val.to_str().unwrap_or(""),
                    None => "",
                };
                let user_agent = match request.headers().get(header::USER_AGENT) {
                    Some(val) => val.to_str().unwrap_or(""),
                    None => "",
                };

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    Router::new()
        .route("/", get(controllers::home::index))
        .nest("/api", api)
        .nest_service("/media", ServeDir::new(media_root))
        .layer(CompressionLayer::new())
        .layer(request_id_middleware)
        .with_state(state)
}
