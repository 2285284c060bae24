use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::{
    error::Error,
    model::{ChapterSummary, Manga},
};

use super::{SqliteTransaction, error::DatabaseError};

/// Fields accepted by the `ordering` query parameter; anything else is a
/// client error.
pub const ORDERABLE_FIELDS: &[&str] = &[
    "id",
    "title",
    "views",
    "rating",
    "released_year",
    "created_at",
    "updated_at",
];

/// Translates an ordering parameter (`views`, `-views`) into an ORDER BY
/// clause. Returns `None` for fields outside the whitelist.
pub fn order_clause(ordering: &str) -> Option<String> {
    let (field, direction) = match ordering.strip_prefix('-') {
        Some(field) => (field, "DESC"),
        None => (ordering, "ASC"),
    };

    ORDERABLE_FIELDS
        .contains(&field)
        .then(|| format!("{field} {direction}"))
}

#[derive(Debug, Default)]
pub struct MangaQuery {
    pub is_featured: Option<bool>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
    pub search: Option<String>,
    /// Pre-validated ORDER BY clause built with [`order_clause`].
    pub order: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

pub struct NewManga {
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub banner_image: String,
    pub status: String,
    pub kind: String,
    pub released_year: String,
    pub author: String,
    pub artist: String,
    pub is_featured: bool,
    pub genre_ids: Vec<i64>,
}

#[derive(Default)]
pub struct MangaChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub banner_image: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub released_year: Option<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub is_featured: Option<bool>,
    pub genre_ids: Option<Vec<i64>>,
}

#[derive(sqlx::FromRow)]
struct MangaRow {
    id: i64,
    title: String,
    description: String,
    cover_image: String,
    banner_image: String,
    status: String,
    #[sqlx(rename = "type")]
    kind: String,
    released_year: String,
    author: String,
    artist: String,
    views: i64,
    is_featured: bool,
    rating: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MangaRow {
    fn into_manga(self, genres: Vec<String>, chapters: Vec<ChapterSummary>) -> Manga {
        Manga {
            id: self.id,
            title: self.title,
            description: self.description,
            cover_image: self.cover_image,
            banner_image: self.banner_image,
            genres,
            status: self.status,
            kind: self.kind,
            released_year: self.released_year,
            author: self.author,
            artist: self.artist,
            views: self.views,
            is_featured: self.is_featured,
            rating: self.rating,
            created_at: self.created_at,
            updated_at: self.updated_at,
            chapters,
        }
    }
}

const MANGA_COLUMNS: &str = "id, title, description, cover_image, banner_image, status, type, \
     released_year, author, artist, views, is_featured, rating, created_at, updated_at";

#[tracing::instrument(name = "list mangas", skip_all)]
pub async fn list_mangas(pool: &SqlitePool, query: &MangaQuery) -> Result<Vec<Manga>, Error> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {MANGA_COLUMNS} FROM mangas WHERE 1 = 1"));

    if let Some(is_featured) = query.is_featured {
        builder.push(" AND is_featured = ");
        builder.push_bind(is_featured);
    }
    if let Some(kind) = &query.kind {
        builder.push(" AND LOWER(type) = LOWER(");
        builder.push_bind(kind);
        builder.push(")");
    }
    if let Some(status) = &query.status {
        builder.push(" AND LOWER(status) = LOWER(");
        builder.push_bind(status);
        builder.push(")");
    }
    if let Some(genre) = &query.genre {
        builder.push(
            " AND EXISTS (\
             SELECT 1 FROM manga_genres \
             INNER JOIN genres ON manga_genres.genre_id = genres.id \
             WHERE manga_genres.manga_id = mangas.id \
             AND LOWER(genres.name) LIKE '%' || LOWER(",
        );
        builder.push_bind(genre);
        builder.push(") || '%')");
    }
    if let Some(search) = &query.search {
        builder.push(" AND (LOWER(title) LIKE '%' || LOWER(");
        builder.push_bind(search);
        builder.push(") || '%' OR LOWER(description) LIKE '%' || LOWER(");
        builder.push_bind(search);
        builder.push(") || '%')");
    }

    builder.push(format!(
        " ORDER BY {}",
        query.order.as_deref().unwrap_or("id ASC")
    ));
    builder.push(" LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);

    let rows: Vec<MangaRow> = builder
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let manga_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let genres = genres_for_mangas(pool, &manga_ids).await?;
    let chapters = super::chapter::summaries_for_manga_ids(pool, &manga_ids).await?;

    let mut mangas = Vec::with_capacity(rows.len());
    for row in rows {
        let manga_id = row.id;
        let manga_genres = genres
            .iter()
            .filter(|(id, _)| *id == manga_id)
            .map(|(_, name)| name.clone())
            .collect();
        // listings only carry a 2-chapter preview
        let manga_chapters: Vec<ChapterSummary> = chapters
            .iter()
            .filter(|(id, _)| *id == manga_id)
            .map(|(_, summary)| summary.clone())
            .take(2)
            .collect();

        mangas.push(row.into_manga(manga_genres, manga_chapters));
    }

    Ok(mangas)
}

#[tracing::instrument(name = "get manga by id", skip_all, fields(manga_id))]
pub async fn get_manga_by_id(pool: &SqlitePool, manga_id: i64) -> Result<Manga, Error> {
    let row: MangaRow = sqlx::query_as(&format!(
        "SELECT {MANGA_COLUMNS} FROM mangas WHERE id = ?;"
    ))
    .bind(manga_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or(Error::Database(DatabaseError::NotFound))?;

    let genres = sqlx::query(
        r#"
        SELECT
            genres.name
        FROM
            manga_genres
        INNER JOIN
            genres ON manga_genres.genre_id = genres.id
        WHERE
            manga_genres.manga_id = ?
        ORDER BY genres.name;
    "#,
    )
    .bind(manga_id)
    .map(|row: sqlx::sqlite::SqliteRow| row.get::<String, _>("name"))
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::from)?;

    let chapters = super::chapter::summaries_for_manga(pool, manga_id).await?;

    Ok(row.into_manga(genres, chapters))
}

async fn genres_for_mangas(
    pool: &SqlitePool,
    manga_ids: &[i64],
) -> Result<Vec<(i64, String)>, Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT
            manga_genres.manga_id, genres.name
        FROM
            manga_genres
        INNER JOIN
            genres ON manga_genres.genre_id = genres.id
        WHERE
            manga_genres.manga_id IN (
    "#,
    );
    let mut separated = builder.separated(", ");
    for manga_id in manga_ids {
        separated.push_bind(*manga_id);
    }
    separated.push_unseparated(") ORDER BY genres.name;");

    let mut stream = builder.build().fetch(pool);

    let mut genres = Vec::new();
    while let Some(row) = stream.try_next().await.map_err(DatabaseError::from)? {
        genres.push((row.get("manga_id"), row.get("name")));
    }

    Ok(genres)
}

#[tracing::instrument(name = "insert manga", skip_all, fields(title = %data.title))]
pub async fn insert_manga(pool: &SqlitePool, data: &NewManga) -> Result<i64, Error> {
    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO mangas
            (title, description, cover_image, banner_image, status, type,
             released_year, author, artist, is_featured, created_at, updated_at)
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);
    "#,
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.cover_image)
    .bind(&data.banner_image)
    .bind(&data.status)
    .bind(&data.kind)
    .bind(&data.released_year)
    .bind(&data.author)
    .bind(&data.artist)
    .bind(data.is_featured)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(DatabaseError::from)?;

    let manga_id = result.last_insert_rowid();
    replace_genres(&mut tx, manga_id, &data.genre_ids).await?;

    tx.commit().await.map_err(DatabaseError::from)?;

    Ok(manga_id)
}

#[tracing::instrument(name = "update manga", skip_all, fields(manga_id))]
pub async fn update_manga(
    pool: &SqlitePool,
    manga_id: i64,
    changes: &MangaChanges,
) -> Result<(), Error> {
    let current: MangaRow = sqlx::query_as(&format!(
        "SELECT {MANGA_COLUMNS} FROM mangas WHERE id = ?;"
    ))
    .bind(manga_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or(Error::Database(DatabaseError::NotFound))?;

    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    sqlx::query(
        r#"
        UPDATE mangas
        SET
            title = ?,
            description = ?,
            cover_image = ?,
            banner_image = ?,
            status = ?,
            type = ?,
            released_year = ?,
            author = ?,
            artist = ?,
            is_featured = ?,
            updated_at = ?
        WHERE
            id = ?;
    "#,
    )
    .bind(changes.title.clone().unwrap_or(current.title))
    .bind(changes.description.clone().unwrap_or(current.description))
    .bind(changes.cover_image.clone().unwrap_or(current.cover_image))
    .bind(changes.banner_image.clone().unwrap_or(current.banner_image))
    .bind(changes.status.clone().unwrap_or(current.status))
    .bind(changes.kind.clone().unwrap_or(current.kind))
    .bind(changes.released_year.clone().unwrap_or(current.released_year))
    .bind(changes.author.clone().unwrap_or(current.author))
    .bind(changes.artist.clone().unwrap_or(current.artist))
    .bind(changes.is_featured.unwrap_or(current.is_featured))
    .bind(Utc::now())
    .bind(manga_id)
    .execute(&mut *tx)
    .await
    .map_err(DatabaseError::from)?;

    if let Some(genre_ids) = &changes.genre_ids {
        replace_genres(&mut tx, manga_id, genre_ids).await?;
    }

    tx.commit().await.map_err(DatabaseError::from)?;

    Ok(())
}

async fn replace_genres(
    tx: &mut SqliteTransaction<'_>,
    manga_id: i64,
    genre_ids: &[i64],
) -> Result<(), Error> {
    sqlx::query("DELETE FROM manga_genres WHERE manga_id = ?;")
        .bind(manga_id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from)?;

    for genre_id in genre_ids {
        sqlx::query(
            r#"
            INSERT INTO manga_genres
                (manga_id, genre_id)
            VALUES
                (?, ?)
            ON CONFLICT (manga_id, genre_id) DO NOTHING;
        "#,
        )
        .bind(manga_id)
        .bind(genre_id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from)?;
    }

    Ok(())
}

#[tracing::instrument(name = "delete manga", skip_all, fields(manga_id))]
pub async fn delete_manga(pool: &SqlitePool, manga_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM mangas WHERE id = ?;")
        .bind(manga_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

/// Deliberate read-modify-write: concurrent detail requests may undercount,
/// which the caller tolerates.
#[tracing::instrument(name = "increment manga views", skip_all, fields(manga_id))]
pub async fn increment_views(pool: &SqlitePool, manga_id: i64) -> Result<i64, Error> {
    let views: i64 = sqlx::query_scalar("SELECT views FROM mangas WHERE id = ?;")
        .bind(manga_id)
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from)?;

    sqlx::query("UPDATE mangas SET views = ? WHERE id = ?;")
        .bind(views + 1)
        .bind(manga_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(views + 1)
}
