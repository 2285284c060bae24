use std::sync::Arc;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use crate::{config::Config, media::MediaStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub media: MediaStore,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn init(config: Config) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(config.database.connect_options());

        if config.application.run_migration {
            tracing::warn!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
        }

        let media = MediaStore::new(&config.media);

        Ok(AppState {
            pool,
            config,
            media,
        })
    }
}
