use anyhow::Context;
use chrono::Utc;
use secrecy::SecretString;
use sqlx::{Row, SqlitePool};

use crate::{
    auth::{compute_password_hash, error::AuthError},
    error::Error,
    model::User,
    telemetry::spawn_blocking_with_tracing,
};

use super::error::DatabaseError;

#[tracing::instrument(name = "create user", skip_all, fields(username))]
pub async fn create_user(
    pool: &SqlitePool,
    username: String,
    email: String,
    password: SecretString,
    is_staff: bool,
) -> Result<User, Error> {
    let password_hashed = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)??;

    let date_joined = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (username, email, password, is_staff, date_joined)
        VALUES
            (?, ?, ?, ?, ?);
    "#,
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hashed)
    .bind(is_staff)
    .bind(date_joined)
    .execute(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(User {
        id: result.last_insert_rowid(),
        username,
        email,
        is_staff,
        date_joined,
    })
}

#[tracing::instrument(name = "get user by id", skip_all, fields(user_id))]
pub async fn get_user_by_id_optional(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT
            id, username, email, is_staff, date_joined
        FROM
            users
        WHERE
            id = ?;
    "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Database(e.into()))
}

/// Looks a user up for login; the hash never leaves the db layer otherwise.
#[tracing::instrument(name = "get user with password", skip_all, fields(username))]
pub async fn get_user_with_password(
    pool: &SqlitePool,
    username: &str,
) -> Result<(User, String), Error> {
    let row = sqlx::query(
        r#"
        SELECT
            id, username, email, password, is_staff, date_joined
        FROM
            users
        WHERE
            username = ?;
    "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?;

    match row {
        Some(row) => Ok((
            User {
                id: row.get("id"),
                username: row.get("username"),
                email: row.get("email"),
                is_staff: row.get("is_staff"),
                date_joined: row.get("date_joined"),
            },
            row.get("password"),
        )),
        None => Err(Error::Auth(AuthError::UserNotFound)),
    }
}

#[tracing::instrument(name = "list users", skip_all)]
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT
            id, username, email, is_staff, date_joined
        FROM
            users
        ORDER BY id;
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(e.into()))
}

#[tracing::instrument(name = "delete user", skip_all, fields(user_id))]
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?;")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "update user password", skip_all, fields(user_id))]
pub async fn update_password(
    pool: &SqlitePool,
    user_id: i64,
    password: SecretString,
) -> Result<(), Error> {
    let password_hashed = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)??;

    let result = sqlx::query("UPDATE users SET password = ? WHERE id = ?;")
        .bind(&password_hashed)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "update user profile", skip_all, fields(user_id))]
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    username: Option<String>,
    email: Option<String>,
    password_hashed: Option<String>,
) -> Result<User, Error> {
    let current = get_user_by_id_optional(pool, user_id)
        .await?
        .ok_or(Error::Database(DatabaseError::NotFound))?;

    let username = username.unwrap_or(current.username);
    let email = email.unwrap_or(current.email);

    sqlx::query(
        r#"
        UPDATE users
        SET
            username = ?,
            email = ?,
            password = COALESCE(?, password)
        WHERE
            id = ?;
    "#,
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hashed)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(User {
        id: user_id,
        username,
        email,
        is_staff: current.is_staff,
        date_joined: current.date_joined,
    })
}
