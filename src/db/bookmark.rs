use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{error::Error, model::Bookmark};

use super::error::DatabaseError;

#[derive(sqlx::FromRow)]
struct BookmarkRow {
    id: i64,
    manga_id: i64,
    manga_title: String,
    manga_cover: String,
    created_at: DateTime<Utc>,
}

impl From<BookmarkRow> for Bookmark {
    fn from(row: BookmarkRow) -> Self {
        Bookmark {
            id: row.id,
            manga: row.manga_id,
            manga_title: row.manga_title,
            manga_cover: row.manga_cover,
            created_at: row.created_at,
        }
    }
}

const BOOKMARK_COLUMNS: &str = "bookmarks.id, bookmarks.manga_id, \
     mangas.title AS manga_title, mangas.cover_image AS manga_cover, bookmarks.created_at";

#[tracing::instrument(name = "list bookmarks for user", skip_all, fields(user_id))]
pub async fn list_bookmarks_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Bookmark>, Error> {
    let rows: Vec<BookmarkRow> = sqlx::query_as(&format!(
        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks \
         INNER JOIN mangas ON bookmarks.manga_id = mangas.id \
         WHERE bookmarks.user_id = ? \
         ORDER BY bookmarks.created_at DESC;"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(rows.into_iter().map(Bookmark::from).collect())
}

/// Duplicate (user, manga) pairs surface as a unique violation for the
/// caller to map to a client error.
#[tracing::instrument(name = "insert bookmark", skip_all, fields(user_id, manga_id))]
pub async fn insert_bookmark(
    pool: &SqlitePool,
    user_id: i64,
    manga_id: i64,
) -> Result<Bookmark, Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO bookmarks
            (user_id, manga_id, created_at)
        VALUES
            (?, ?, ?);
    "#,
    )
    .bind(user_id)
    .bind(manga_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(DatabaseError::from)?;

    let bookmark_id = result.last_insert_rowid();

    let row: BookmarkRow = sqlx::query_as(&format!(
        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks \
         INNER JOIN mangas ON bookmarks.manga_id = mangas.id \
         WHERE bookmarks.id = ?;"
    ))
    .bind(bookmark_id)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(Bookmark::from(row))
}

/// Scoped by owner; deleting someone else's bookmark reads as not-found.
#[tracing::instrument(name = "delete bookmark", skip_all, fields(user_id, bookmark_id))]
pub async fn delete_bookmark(
    pool: &SqlitePool,
    user_id: i64,
    bookmark_id: i64,
) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE id = ? AND user_id = ?;")
        .bind(bookmark_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
