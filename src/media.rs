use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{config, error::Error};

/// Local-disk file store for uploaded page images and cover art. Accepts a
/// byte payload plus a relative path and returns the public URL the file is
/// served back under.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    pub fn new(config: &config::Media) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[tracing::instrument(name = "save media file", skip(self, bytes), fields(relative))]
    pub async fn save(&self, relative: &str, bytes: &[u8]) -> Result<String, Error> {
        let mut relative = clean_relative(relative);
        if relative.is_empty() {
            return Err(Error::BadRequest("invalid file name".to_string()));
        }

        let mut target = self.root.join(&relative);
        let exists = tokio::fs::try_exists(&target)
            .await
            .context("check media file existence")
            .map_err(Error::Other)?;
        if exists {
            relative = with_random_suffix(&relative);
            target = self.root.join(&relative);
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("create media directory")
                .map_err(Error::Other)?;
        }

        tokio::fs::write(&target, bytes)
            .await
            .context("write media file")
            .map_err(Error::Other)?;

        Ok(format!("{}/{}", self.base_url, relative))
    }
}

/// Reduces a client-supplied filename to its terminal path component.
pub fn terminal_component(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Drops empty, `.` and `..` path segments. Client-supplied names must not
/// escape the media root.
fn clean_relative(relative: &str) -> String {
    relative
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("/")
}

fn with_random_suffix(relative: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    let short = &id[..8];

    match relative.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.contains('/') => {
            format!("{stem}_{short}.{extension}")
        }
        _ => format!("{relative}_{short}"),
    }
}
