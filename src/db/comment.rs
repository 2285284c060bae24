use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{error::Error, model::Comment};

use super::error::DatabaseError;

#[derive(Debug, Default)]
pub struct CommentQuery {
    pub manga_id: Option<i64>,
    pub chapter_id: Option<i64>,
    /// `true` for oldest-first; newest-first is the default.
    pub ascending: bool,
}

pub struct NewComment {
    pub manga_id: i64,
    pub chapter_id: Option<i64>,
    pub user_id: Option<i64>,
    pub name: String,
    pub content: String,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    manga_id: i64,
    chapter_id: Option<i64>,
    user_id: Option<i64>,
    user_username: Option<String>,
    name: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            manga: row.manga_id,
            chapter: row.chapter_id,
            user: row.user_id,
            user_username: row.user_username,
            name: row.name,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

const COMMENT_COLUMNS: &str = "comments.id, comments.manga_id, comments.chapter_id, \
     comments.user_id, users.username AS user_username, comments.name, comments.content, \
     comments.created_at";

#[tracing::instrument(name = "list comments", skip_all)]
pub async fn list_comments(pool: &SqlitePool, query: &CommentQuery) -> Result<Vec<Comment>, Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {COMMENT_COLUMNS} FROM comments \
         LEFT JOIN users ON comments.user_id = users.id WHERE 1 = 1"
    ));

    if let Some(manga_id) = query.manga_id {
        builder.push(" AND comments.manga_id = ");
        builder.push_bind(manga_id);
    }
    if let Some(chapter_id) = query.chapter_id {
        builder.push(" AND comments.chapter_id = ");
        builder.push_bind(chapter_id);
    }

    builder.push(if query.ascending {
        " ORDER BY comments.created_at ASC"
    } else {
        " ORDER BY comments.created_at DESC"
    });

    let rows: Vec<CommentRow> = builder
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(rows.into_iter().map(Comment::from).collect())
}

#[tracing::instrument(name = "get comment by id", skip_all, fields(comment_id))]
pub async fn get_comment(pool: &SqlitePool, comment_id: i64) -> Result<Comment, Error> {
    let row: Option<CommentRow> = sqlx::query_as(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments \
         LEFT JOIN users ON comments.user_id = users.id \
         WHERE comments.id = ?;"
    ))
    .bind(comment_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?;

    row.map(Comment::from)
        .ok_or(Error::Database(DatabaseError::NotFound))
}

#[tracing::instrument(name = "insert comment", skip_all, fields(manga_id = data.manga_id))]
pub async fn insert_comment(pool: &SqlitePool, data: &NewComment) -> Result<Comment, Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO comments
            (manga_id, chapter_id, user_id, name, content, created_at)
        VALUES
            (?, ?, ?, ?, ?, ?);
    "#,
    )
    .bind(data.manga_id)
    .bind(data.chapter_id)
    .bind(data.user_id)
    .bind(&data.name)
    .bind(&data.content)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(DatabaseError::from)?;

    get_comment(pool, result.last_insert_rowid()).await
}

#[tracing::instrument(name = "update comment", skip_all, fields(comment_id))]
pub async fn update_comment(
    pool: &SqlitePool,
    comment_id: i64,
    content: &str,
) -> Result<Comment, Error> {
    let result = sqlx::query("UPDATE comments SET content = ? WHERE id = ?;")
        .bind(content)
        .bind(comment_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    get_comment(pool, comment_id).await
}

#[tracing::instrument(name = "delete comment", skip_all, fields(comment_id))]
pub async fn delete_comment(pool: &SqlitePool, comment_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?;")
        .bind(comment_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
