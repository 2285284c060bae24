use chrono::{Days, NaiveDate};
use sqlx::SqlitePool;

use crate::{
    error::Error,
    model::{DailyStat, TopManga},
};

use super::error::DatabaseError;

pub struct Totals {
    pub total_mangas: i64,
    pub total_views: i64,
    pub total_chapters: i64,
}

#[tracing::instrument(name = "catalog totals", skip_all)]
pub async fn totals(pool: &SqlitePool) -> Result<Totals, Error> {
    let total_mangas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mangas;")
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from)?;

    let total_views: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(views), 0) FROM mangas;")
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from)?;

    let total_chapters: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chapters;")
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(Totals {
        total_mangas,
        total_views,
        total_chapters,
    })
}

/// Per-day view sums across all mangas for the inclusive date range. Days
/// without a row are absent here; [`fill_daily_window`] backfills them.
#[tracing::instrument(name = "daily view sums", skip_all, fields(%start, %end))]
pub async fn daily_view_sums(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyStat>, Error> {
    sqlx::query_as::<_, DailyStat>(
        r#"
        SELECT
            date, SUM(views) AS views
        FROM
            daily_views
        WHERE
            date BETWEEN ? AND ?
        GROUP BY date
        ORDER BY date;
    "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(e.into()))
}

#[tracing::instrument(name = "top mangas by views", skip_all)]
pub async fn top_mangas_by_views(pool: &SqlitePool, limit: i64) -> Result<Vec<TopManga>, Error> {
    sqlx::query_as::<_, TopManga>(
        r#"
        SELECT
            id, title, views, cover_image
        FROM
            mangas
        ORDER BY views DESC
        LIMIT ?;
    "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(e.into()))
}

/// Expands sparse per-day sums into exactly 7 entries covering `today` and
/// the 6 preceding calendar days, oldest first, with 0 for absent days.
pub fn fill_daily_window(today: NaiveDate, sums: &[DailyStat]) -> Vec<DailyStat> {
    (0..7)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| DailyStat {
            date,
            views: sums
                .iter()
                .find(|stat| stat.date == date)
                .map(|stat| stat.views)
                .unwrap_or(0),
        })
        .collect()
}
