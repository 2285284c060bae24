use axum::body::Bytes;

/// One file received through a multipart form.
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod bookmark;
pub mod chapter;
pub mod comment;
pub mod genre;
pub mod history;
pub mod home;
pub mod manga;
pub mod profile;
pub mod rating;
