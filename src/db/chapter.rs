use chrono::Utc;
use futures::TryStreamExt;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};

use crate::{
    error::Error,
    model::{Chapter, ChapterSummary},
};

use super::error::DatabaseError;

/// Pages live in a TEXT column as a JSON array of URL strings.
fn parse_pages(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn row_to_chapter(row: &SqliteRow) -> Chapter {
    Chapter {
        id: row.get("id"),
        manga: row.get("manga_id"),
        chapter_number: row.get("chapter_number"),
        released_at: row.get("released_at"),
        pages: parse_pages(&row.get::<String, _>("pages")),
    }
}

#[tracing::instrument(name = "list chapters", skip_all)]
pub async fn list_chapters(pool: &SqlitePool, manga_id: Option<i64>) -> Result<Vec<Chapter>, Error> {
    let rows = match manga_id {
        Some(manga_id) => {
            sqlx::query(
                r#"
                SELECT
                    id, manga_id, chapter_number, released_at, pages
                FROM
                    chapters
                WHERE
                    manga_id = ?
                ORDER BY released_at DESC;
            "#,
            )
            .bind(manga_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(
                r#"
                SELECT
                    id, manga_id, chapter_number, released_at, pages
                FROM
                    chapters
                ORDER BY released_at DESC;
            "#,
            )
            .fetch_all(pool)
            .await
        }
    }
    .map_err(DatabaseError::from)?;

    Ok(rows.iter().map(row_to_chapter).collect())
}

#[tracing::instrument(name = "get chapter by id", skip_all, fields(chapter_id))]
pub async fn get_chapter(pool: &SqlitePool, chapter_id: i64) -> Result<Chapter, Error> {
    let row = sqlx::query(
        r#"
        SELECT
            id, manga_id, chapter_number, released_at, pages
        FROM
            chapters
        WHERE
            id = ?;
    "#,
    )
    .bind(chapter_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?;

    match row {
        Some(row) => Ok(row_to_chapter(&row)),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "insert chapter", skip_all, fields(manga_id, chapter_number))]
pub async fn insert_chapter(
    pool: &SqlitePool,
    manga_id: i64,
    chapter_number: &str,
    pages: &[String],
) -> Result<Chapter, Error> {
    let released_at = Utc::now();
    let pages_json = serde_json::to_string(pages).map_err(|e| Error::Other(e.into()))?;

    let result = sqlx::query(
        r#"
        INSERT INTO chapters
            (manga_id, chapter_number, released_at, pages)
        VALUES
            (?, ?, ?, ?);
    "#,
    )
    .bind(manga_id)
    .bind(chapter_number)
    .bind(released_at)
    .bind(&pages_json)
    .execute(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(Chapter {
        id: result.last_insert_rowid(),
        manga: manga_id,
        chapter_number: chapter_number.to_string(),
        released_at,
        pages: pages.to_vec(),
    })
}

#[tracing::instrument(name = "update chapter", skip_all, fields(chapter_id))]
pub async fn update_chapter(
    pool: &SqlitePool,
    chapter_id: i64,
    chapter_number: &str,
    pages: &[String],
) -> Result<Chapter, Error> {
    let pages_json = serde_json::to_string(pages).map_err(|e| Error::Other(e.into()))?;

    let result = sqlx::query(
        r#"
        UPDATE chapters
        SET
            chapter_number = ?,
            pages = ?
        WHERE
            id = ?;
    "#,
    )
    .bind(chapter_number)
    .bind(&pages_json)
    .bind(chapter_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    get_chapter(pool, chapter_id).await
}

#[tracing::instrument(name = "delete chapter", skip_all, fields(chapter_id))]
pub async fn delete_chapter(pool: &SqlitePool, chapter_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = ?;")
        .bind(chapter_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "chapter summaries for manga", skip_all, fields(manga_id))]
pub async fn summaries_for_manga(
    pool: &SqlitePool,
    manga_id: i64,
) -> Result<Vec<ChapterSummary>, Error> {
    sqlx::query_as::<_, ChapterSummary>(
        r#"
        SELECT
            id, chapter_number, released_at
        FROM
            chapters
        WHERE
            manga_id = ?
        ORDER BY released_at DESC;
    "#,
    )
    .bind(manga_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(e.into()))
}

/// Batch variant feeding the 2-chapter previews on manga listings.
pub async fn summaries_for_manga_ids(
    pool: &SqlitePool,
    manga_ids: &[i64],
) -> Result<Vec<(i64, ChapterSummary)>, Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT
            id, manga_id, chapter_number, released_at
        FROM
            chapters
        WHERE
            manga_id IN (
    "#,
    );
    let mut separated = builder.separated(", ");
    for manga_id in manga_ids {
        separated.push_bind(*manga_id);
    }
    separated.push_unseparated(") ORDER BY released_at DESC;");

    let mut stream = builder.build().fetch(pool);

    let mut summaries = Vec::new();
    while let Some(row) = stream.try_next().await.map_err(DatabaseError::from)? {
        summaries.push((
            row.get("manga_id"),
            ChapterSummary {
                id: row.get("id"),
                chapter_number: row.get("chapter_number"),
                released_at: row.get("released_at"),
            },
        ));
    }

    Ok(summaries)
}
