#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("Database error")]
    DatabaseError(sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    UniqueViolation,
    #[error("Referenced record does not exist")]
    ForeignKeyViolation,
}

impl From<sqlx::Error> for DatabaseError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(e) if e.is_unique_violation() => Self::UniqueViolation,
            sqlx::Error::Database(e) if e.is_foreign_key_violation() => Self::ForeignKeyViolation,
            _ => Self::DatabaseError(value),
        }
    }
}
