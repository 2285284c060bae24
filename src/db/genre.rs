use sqlx::SqlitePool;

use crate::{error::Error, model::Genre};

use super::error::DatabaseError;

#[tracing::instrument(name = "list genres", skip_all)]
pub async fn list_genres(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Genre>, Error> {
    let genres = match search {
        Some(search) => {
            sqlx::query_as::<_, Genre>(
                r#"
                SELECT
                    id, name
                FROM
                    genres
                WHERE
                    LOWER(name) LIKE '%' || LOWER(?) || '%'
                ORDER BY name;
            "#,
            )
            .bind(search)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name;")
                .fetch_all(pool)
                .await
        }
    };

    genres.map_err(|e| Error::Database(e.into()))
}

#[tracing::instrument(name = "insert genre", skip_all, fields(name))]
pub async fn insert_genre(pool: &SqlitePool, name: &str) -> Result<Genre, Error> {
    let result = sqlx::query("INSERT INTO genres (name) VALUES (?);")
        .bind(name)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(Genre {
        id: result.last_insert_rowid(),
        name: name.to_string(),
    })
}

#[tracing::instrument(name = "update genre", skip_all, fields(genre_id))]
pub async fn update_genre(pool: &SqlitePool, genre_id: i64, name: &str) -> Result<Genre, Error> {
    let result = sqlx::query("UPDATE genres SET name = ? WHERE id = ?;")
        .bind(name)
        .bind(genre_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(Genre {
        id: genre_id,
        name: name.to_string(),
    })
}

#[tracing::instrument(name = "delete genre", skip_all, fields(genre_id))]
pub async fn delete_genre(pool: &SqlitePool, genre_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM genres WHERE id = ?;")
        .bind(genre_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

/// Resolves genre names to ids; an unknown name is a client error, matching
/// the slug-based genre references in manga payloads.
#[tracing::instrument(name = "resolve genre names", skip_all)]
pub async fn genre_ids_by_names(pool: &SqlitePool, names: &[String]) -> Result<Vec<i64>, Error> {
    let mut ids = Vec::with_capacity(names.len());

    for name in names {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE name = ?;")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(DatabaseError::from)?;

        match id {
            Some(id) => ids.push(id),
            None => {
                return Err(Error::BadRequest(format!("unknown genre: {name}")));
            }
        }
    }

    Ok(ids)
}
