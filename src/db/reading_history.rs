use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{error::Error, model::ReadingHistory};

use super::error::DatabaseError;

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    manga_id: i64,
    manga_title: String,
    manga_cover: String,
    chapter_id: i64,
    chapter_number: String,
    last_read_at: DateTime<Utc>,
}

impl From<HistoryRow> for ReadingHistory {
    fn from(row: HistoryRow) -> Self {
        ReadingHistory {
            id: row.id,
            manga: row.manga_id,
            manga_title: row.manga_title,
            manga_cover: row.manga_cover,
            chapter: row.chapter_id,
            chapter_number: row.chapter_number,
            last_read_at: row.last_read_at,
        }
    }
}

const HISTORY_COLUMNS: &str = "reading_history.id, reading_history.manga_id, \
     mangas.title AS manga_title, mangas.cover_image AS manga_cover, \
     reading_history.chapter_id, chapters.chapter_number, reading_history.last_read_at";

#[tracing::instrument(name = "list reading history for user", skip_all, fields(user_id))]
pub async fn list_history_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ReadingHistory>, Error> {
    let rows: Vec<HistoryRow> = sqlx::query_as(&format!(
        "SELECT {HISTORY_COLUMNS} FROM reading_history \
         INNER JOIN mangas ON reading_history.manga_id = mangas.id \
         INNER JOIN chapters ON reading_history.chapter_id = chapters.id \
         WHERE reading_history.user_id = ? \
         ORDER BY reading_history.last_read_at DESC;"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(rows.into_iter().map(ReadingHistory::from).collect())
}

/// Atomic create-or-update keyed by (user, manga): only the most recently
/// read chapter per manga per user survives.
#[tracing::instrument(name = "upsert reading history", skip_all, fields(user_id, manga_id, chapter_id))]
pub async fn upsert_history(
    pool: &SqlitePool,
    user_id: i64,
    manga_id: i64,
    chapter_id: i64,
) -> Result<ReadingHistory, Error> {
    let history_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO reading_history
            (user_id, manga_id, chapter_id, last_read_at)
        VALUES
            (?, ?, ?, ?)
        ON CONFLICT (user_id, manga_id) DO UPDATE
        SET
            chapter_id = excluded.chapter_id,
            last_read_at = excluded.last_read_at
        RETURNING id;
    "#,
    )
    .bind(user_id)
    .bind(manga_id)
    .bind(chapter_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    let row: HistoryRow = sqlx::query_as(&format!(
        "SELECT {HISTORY_COLUMNS} FROM reading_history \
         INNER JOIN mangas ON reading_history.manga_id = mangas.id \
         INNER JOIN chapters ON reading_history.chapter_id = chapters.id \
         WHERE reading_history.id = ?;"
    ))
    .bind(history_id)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(ReadingHistory::from(row))
}

#[tracing::instrument(name = "delete reading history", skip_all, fields(user_id, history_id))]
pub async fn delete_history(pool: &SqlitePool, user_id: i64, history_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM reading_history WHERE id = ? AND user_id = ?;")
        .bind(history_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
