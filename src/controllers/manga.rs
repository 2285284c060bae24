use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header},
};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::{
        daily_view::increment_daily_views,
        genre::genre_ids_by_names,
        manga::{
            MangaChanges, MangaQuery, NewManga, delete_manga, get_manga_by_id, increment_views,
            insert_manga, list_mangas, order_clause, update_manga,
        },
    },
    error::Error,
    media::terminal_component,
    model::Manga,
    state::SharedAppState,
};

use super::Upload;

#[derive(Deserialize, Validate)]
pub struct MangaListQuery {
    pub is_featured: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

#[tracing::instrument(name = "[GET] mangas", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<MangaListQuery>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let order = match &query.ordering {
        Some(ordering) => Some(order_clause(ordering).ok_or_else(|| {
            Error::BadRequest(format!("invalid ordering field: {ordering}"))
        })?),
        None => None,
    };

    let mangas = list_mangas(
        &app_state.pool,
        &MangaQuery {
            is_featured: query.is_featured,
            kind: query.kind,
            status: query.status,
            genre: query.genre,
            search: query.search,
            order,
            limit: query.limit.unwrap_or(20),
            offset: query.offset.unwrap_or(0),
        },
    )
    .await?;

    Ok(Json(mangas))
}

#[tracing::instrument(name = "[GET] mangas/{id}", skip_all, fields(manga_id = id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<Json<Manga>, Error> {
    let manga = get_manga_by_id(&app_state.pool, id).await?;

    record_view(&app_state, id).await;

    Ok(Json(manga))
}

/// Best-effort view counters; a failure here never fails the detail request.
/// The daily counter gets one retry (it can lose a race on the first view of
/// the day), then the increment is dropped.
async fn record_view(app_state: &SharedAppState, manga_id: i64) {
    if let Err(error) = increment_views(&app_state.pool, manga_id).await {
        tracing::warn!(err.msg = %error, manga_id, "view counter increment failed");
    }

    let today = Utc::now().date_naive();
    if let Err(error) = increment_daily_views(&app_state.pool, manga_id, today).await {
        tracing::warn!(err.msg = %error, manga_id, "daily view increment failed, retrying once");

        if let Err(error) = increment_daily_views(&app_state.pool, manga_id, today).await {
            tracing::warn!(err.msg = %error, manga_id, "daily view increment dropped");
        }
    }
}

#[derive(Deserialize, Default)]
pub struct MangaRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub banner_image: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub released_year: Option<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub is_featured: Option<bool>,
    pub genres: Option<Vec<String>>,
}

#[derive(Default)]
pub struct MangaForm {
    pub fields: MangaRequest,
    pub cover_upload: Option<Upload>,
    pub banner_upload: Option<Upload>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

/// Admin forms arrive either as JSON or as multipart carrying the same
/// fields plus optional cover/banner binaries.
async fn parse_manga_form(req: Request) -> Result<MangaForm, Error> {
    if !is_multipart(&req) {
        let Json(fields) = Json::<MangaRequest>::from_request(req, &())
            .await
            .map_err(|e| Error::BadRequest(e.to_string()))?;

        return Ok(MangaForm {
            fields,
            ..Default::default()
        });
    }

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?;

    let mut form = MangaForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "cover_image_file" | "banner_image_file" => {
                let filename = terminal_component(field.file_name().unwrap_or("upload")).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(e.to_string()))?;
                let upload = Upload { filename, bytes };

                if name == "cover_image_file" {
                    form.cover_upload = Some(upload);
                } else {
                    form.banner_upload = Some(upload);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(e.to_string()))?;

                match name.as_str() {
                    "title" => form.fields.title = Some(value),
                    "description" => form.fields.description = Some(value),
                    "cover_image" => form.fields.cover_image = Some(value),
                    "banner_image" => form.fields.banner_image = Some(value),
                    "status" => form.fields.status = Some(value),
                    "type" => form.fields.kind = Some(value),
                    "released_year" => form.fields.released_year = Some(value),
                    "author" => form.fields.author = Some(value),
                    "artist" => form.fields.artist = Some(value),
                    "is_featured" => {
                        form.fields.is_featured =
                            Some(matches!(value.as_str(), "true" | "1" | "on"))
                    }
                    "genres" => form
                        .fields
                        .genres
                        .get_or_insert_with(Vec::new)
                        .push(value),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

/// A stored upload's URL overwrites the corresponding URL field.
async fn resolve_uploads(
    app_state: &SharedAppState,
    form: &mut MangaForm,
) -> Result<(), Error> {
    if let Some(upload) = form.cover_upload.take() {
        let url = app_state
            .media
            .save(&format!("covers/{}", upload.filename), &upload.bytes)
            .await?;
        form.fields.cover_image = Some(url);
    }
    if let Some(upload) = form.banner_upload.take() {
        let url = app_state
            .media
            .save(&format!("banners/{}", upload.filename), &upload.bytes)
            .await?;
        form.fields.banner_image = Some(url);
    }

    Ok(())
}

#[tracing::instrument(name = "[POST] mangas", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    req: Request,
) -> Result<(StatusCode, Json<Manga>), Error> {
    let mut form = parse_manga_form(req).await?;

    let title = match form.fields.title.take() {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(Error::BadRequest("title is required".to_string())),
    };

    resolve_uploads(&app_state, &mut form).await?;

    let genre_ids = match &form.fields.genres {
        Some(names) => genre_ids_by_names(&app_state.pool, names).await?,
        None => Vec::new(),
    };

    let fields = form.fields;
    let manga_id = insert_manga(
        &app_state.pool,
        &NewManga {
            title,
            description: fields.description.unwrap_or_default(),
            cover_image: fields.cover_image.unwrap_or_default(),
            banner_image: fields.banner_image.unwrap_or_default(),
            status: fields.status.unwrap_or_else(|| "Ongoing".to_string()),
            kind: fields.kind.unwrap_or_else(|| "Manhwa".to_string()),
            released_year: fields.released_year.unwrap_or_else(|| "2022".to_string()),
            author: fields.author.unwrap_or_else(|| "Unknown".to_string()),
            artist: fields.artist.unwrap_or_else(|| "Unknown".to_string()),
            is_featured: fields.is_featured.unwrap_or(false),
            genre_ids,
        },
    )
    .await?;

    let manga = get_manga_by_id(&app_state.pool, manga_id).await?;

    Ok((StatusCode::CREATED, Json(manga)))
}

#[tracing::instrument(name = "[PUT] mangas/{id}", skip_all, fields(manga_id = id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
    req: Request,
) -> Result<Json<Manga>, Error> {
    let mut form = parse_manga_form(req).await?;

    resolve_uploads(&app_state, &mut form).await?;

    let genre_ids = match &form.fields.genres {
        Some(names) => Some(genre_ids_by_names(&app_state.pool, names).await?),
        None => None,
    };

    let fields = form.fields;
    update_manga(
        &app_state.pool,
        id,
        &MangaChanges {
            title: fields.title,
            description: fields.description,
            cover_image: fields.cover_image,
            banner_image: fields.banner_image,
            status: fields.status,
            kind: fields.kind,
            released_year: fields.released_year,
            author: fields.author,
            artist: fields.artist,
            is_featured: fields.is_featured,
            genre_ids,
        },
    )
    .await?;

    let manga = get_manga_by_id(&app_state.pool, id).await?;

    Ok(Json(manga))
}

#[tracing::instrument(name = "[DELETE] mangas/{id}", skip_all, fields(manga_id = id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    delete_manga(&app_state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
