use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::Error;

use super::error::DatabaseError;

/// Get-or-create-then-increment, deliberately not a single upsert: two
/// requests racing on the first view of the day can collide on the unique
/// (manga, date) key, and the caller handles that with one best-effort
/// retry before giving up.
#[tracing::instrument(name = "increment daily views", skip_all, fields(manga_id, %date))]
pub async fn increment_daily_views(
    pool: &SqlitePool,
    manga_id: i64,
    date: NaiveDate,
) -> Result<(), Error> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT views FROM daily_views WHERE manga_id = ? AND date = ?;")
            .bind(manga_id)
            .bind(date)
            .fetch_optional(pool)
            .await
            .map_err(DatabaseError::from)?;

    match existing {
        Some(views) => {
            sqlx::query("UPDATE daily_views SET views = ? WHERE manga_id = ? AND date = ?;")
                .bind(views + 1)
                .bind(manga_id)
                .bind(date)
                .execute(pool)
                .await
                .map_err(DatabaseError::from)?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO daily_views
                    (manga_id, date, views)
                VALUES
                    (?, ?, 1);
            "#,
            )
            .bind(manga_id)
            .bind(date)
            .execute(pool)
            .await
            .map_err(DatabaseError::from)?;
        }
    }

    Ok(())
}
