use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header},
};
use serde::Deserialize;

use crate::{
    db::chapter::{delete_chapter, get_chapter, insert_chapter, list_chapters, update_chapter},
    error::Error,
    media::terminal_component,
    model::Chapter,
    state::SharedAppState,
};

use super::Upload;

#[derive(Deserialize)]
pub struct ChapterListQuery {
    pub manga: Option<i64>,
}

#[tracing::instrument(name = "[GET] chapters", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<ChapterListQuery>,
) -> Result<Json<Vec<Chapter>>, Error> {
    let chapters = list_chapters(&app_state.pool, query.manga).await?;

    Ok(Json(chapters))
}

#[tracing::instrument(name = "[GET] chapters/{id}", skip_all, fields(chapter_id = id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<Json<Chapter>, Error> {
    let chapter = get_chapter(&app_state.pool, id).await?;

    Ok(Json(chapter))
}

#[derive(Deserialize, Default)]
pub struct ChapterRequest {
    pub manga: Option<i64>,
    pub chapter_number: Option<String>,
    pub pages_input: Option<String>,
}

#[derive(Default)]
pub struct ChapterForm {
    pub fields: ChapterRequest,
    pub files: Vec<Upload>,
}

/// Non-empty trimmed lines of the URL text block, in order.
fn parse_pages_input(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

async fn parse_chapter_form(req: Request) -> Result<ChapterForm, Error> {
    if !is_multipart(&req) {
        let Json(fields) = Json::<ChapterRequest>::from_request(req, &())
            .await
            .map_err(|e| Error::BadRequest(e.to_string()))?;

        return Ok(ChapterForm {
            fields,
            ..Default::default()
        });
    }

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?;

    let mut form = ChapterForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "files_input" => {
                let filename = terminal_component(field.file_name().unwrap_or("page")).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(e.to_string()))?;

                form.files.push(Upload { filename, bytes });
            }
            "manga" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(e.to_string()))?;
                form.fields.manga = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| Error::BadRequest("manga must be an id".to_string()))?,
                );
            }
            "chapter_number" => {
                form.fields.chapter_number = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::BadRequest(e.to_string()))?,
                );
            }
            "pages_input" => {
                form.fields.pages_input = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    Ok(form)
}

/// The page list is re-derived from scratch on every save: URL-list entries
/// first, then uploads in submission order. Pages reflected in neither input
/// are lost.
async fn merge_pages(
    app_state: &SharedAppState,
    manga_id: i64,
    chapter_number: &str,
    form: &ChapterForm,
) -> Result<Vec<String>, Error> {
    let mut pages = parse_pages_input(form.fields.pages_input.as_deref().unwrap_or(""));

    for upload in &form.files {
        let url = app_state
            .media
            .save(
                &format!("chapters/{manga_id}/{chapter_number}/{}", upload.filename),
                &upload.bytes,
            )
            .await?;
        pages.push(url);
    }

    Ok(pages)
}

#[tracing::instrument(name = "[POST] chapters", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    req: Request,
) -> Result<(StatusCode, Json<Chapter>), Error> {
    let form = parse_chapter_form(req).await?;

    let (manga_id, chapter_number) = match (&form.fields.manga, &form.fields.chapter_number) {
        (Some(manga_id), Some(chapter_number)) if !chapter_number.trim().is_empty() => {
            (*manga_id, chapter_number.trim().to_string())
        }
        _ => {
            return Err(Error::BadRequest(
                "manga and chapter_number are required".to_string(),
            ));
        }
    };

    let pages = merge_pages(&app_state, manga_id, &chapter_number, &form).await?;
    let chapter = insert_chapter(&app_state.pool, manga_id, &chapter_number, &pages).await?;

    Ok((StatusCode::CREATED, Json(chapter)))
}

#[tracing::instrument(name = "[PUT] chapters/{id}", skip_all, fields(chapter_id = id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
    req: Request,
) -> Result<Json<Chapter>, Error> {
    let form = parse_chapter_form(req).await?;

    let current = get_chapter(&app_state.pool, id).await?;
    let chapter_number = form
        .fields
        .chapter_number
        .clone()
        .filter(|number| !number.trim().is_empty())
        .unwrap_or(current.chapter_number);

    let pages = merge_pages(&app_state, current.manga, &chapter_number, &form).await?;
    let chapter = update_chapter(&app_state.pool, id, &chapter_number, &pages).await?;

    Ok(Json(chapter))
}

#[tracing::instrument(name = "[DELETE] chapters/{id}", skip_all, fields(chapter_id = id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    delete_chapter(&app_state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
