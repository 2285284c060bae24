pub mod analytics;
pub mod bookmark;
pub mod chapter;
pub mod comment;
pub mod daily_view;
pub mod error;
pub mod genre;
pub mod manga;
pub mod rating;
pub mod reading_history;
pub mod user;

pub type SqliteTransaction<'a> = sqlx::Transaction<'a, sqlx::Sqlite>;
