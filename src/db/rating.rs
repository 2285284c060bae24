use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{error::Error, model::Rating};

use super::error::DatabaseError;

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: i64,
    manga_id: i64,
    score: i64,
    created_at: DateTime<Utc>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            id: row.id,
            manga: row.manga_id,
            score: row.score,
            created_at: row.created_at,
        }
    }
}

/// Single-statement create-or-overwrite keyed by (user, manga); concurrent
/// submissions from the same user cannot race into duplicate rows.
#[tracing::instrument(name = "upsert rating", skip_all, fields(user_id, manga_id, score))]
pub async fn upsert_rating(
    pool: &SqlitePool,
    user_id: i64,
    manga_id: i64,
    score: i64,
) -> Result<Rating, Error> {
    let now = Utc::now();

    let row: RatingRow = sqlx::query_as(
        r#"
        INSERT INTO ratings
            (user_id, manga_id, score, created_at, updated_at)
        VALUES
            (?, ?, ?, ?, ?)
        ON CONFLICT (user_id, manga_id) DO UPDATE
        SET
            score = excluded.score,
            updated_at = excluded.updated_at
        RETURNING id, manga_id, score, created_at;
    "#,
    )
    .bind(user_id)
    .bind(manga_id)
    .bind(score)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(Rating::from(row))
}

/// Read-aggregate-write; O(ratings-for-that-manga) per rating submission.
#[tracing::instrument(name = "recompute manga rating", skip_all, fields(manga_id))]
pub async fn recompute_manga_rating(pool: &SqlitePool, manga_id: i64) -> Result<f64, Error> {
    let average: Option<f64> =
        sqlx::query_scalar("SELECT ROUND(AVG(score), 1) FROM ratings WHERE manga_id = ?;")
            .bind(manga_id)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::from)?;

    let rating = average.unwrap_or(0.0);

    sqlx::query("UPDATE mangas SET rating = ? WHERE id = ?;")
        .bind(rating)
        .bind(manga_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(rating)
}

#[tracing::instrument(name = "list ratings for user", skip_all, fields(user_id))]
pub async fn list_ratings_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Rating>, Error> {
    let rows: Vec<RatingRow> = sqlx::query_as(
        r#"
        SELECT
            id, manga_id, score, created_at
        FROM
            ratings
        WHERE
            user_id = ?
        ORDER BY updated_at DESC;
    "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(rows.into_iter().map(Rating::from).collect())
}
