use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::ValidationErrors;

use crate::{auth::error::AuthError, db::error::DatabaseError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Database(DatabaseError),

    #[error("Auth error")]
    Auth(AuthError),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Permission denied")]
    Forbidden,

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<DatabaseError> for Error {
    fn from(value: DatabaseError) -> Self {
        Self::Database(value)
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Self::Database(DatabaseError::from(value))
    }
}

fn json_error(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Database(database_error) => match database_error {
                DatabaseError::DatabaseError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Database Error");

                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                }
                DatabaseError::NotFound => json_error(StatusCode::NOT_FOUND, "not found"),
                DatabaseError::UniqueViolation => {
                    json_error(StatusCode::BAD_REQUEST, "already exists")
                }
                DatabaseError::ForeignKeyViolation => {
                    json_error(StatusCode::BAD_REQUEST, "referenced record does not exist")
                }
            },
            Error::Auth(auth_error) => match auth_error {
                AuthError::JwtError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "JWT Error");

                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                }
                AuthError::PasswordError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Password Hash Error");

                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                }
                AuthError::Unauthenticated => {
                    json_error(StatusCode::UNAUTHORIZED, "authentication required")
                }
                AuthError::UserNotFound | AuthError::IncorrectCredential => {
                    json_error(StatusCode::UNAUTHORIZED, "incorrect credential")
                }
            },
            Error::Validation(validation_error) => {
                tracing::error!(err.msg = %validation_error, err.details = ?validation_error, "Validation Error");

                json_error(StatusCode::BAD_REQUEST, &validation_error.to_string())
            }
            Error::BadRequest(message) => json_error(StatusCode::BAD_REQUEST, &message),
            Error::Forbidden => json_error(StatusCode::FORBIDDEN, "permission denied"),
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details = ?error, "Other Error");

                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}
