// Local disk storage backend
// Copies uploads into a directory and hands out file:// URLs

use async_trait::async_trait;
use reqwest::Url;
use std::path::{Path, PathBuf};

use super::video::Video;
use super::StorageBackend;
use crate::error::StorageError;

pub struct LocalDiskBackend {
    dir: PathBuf,
}

impl LocalDiskBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StorageBackend for LocalDiskBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn store(&self, local_file: &Path) -> Result<Video, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let title = local_file
            .file_name()
            .map_or_else(|| "video".to_string(), |n| n.to_string_lossy().into_owned());
        let stored_name = match local_file.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::new_v4()),
            None => uuid::Uuid::new_v4().to_string(),
        };

        let dest = self.dir.join(stored_name);
        let copied = tokio::fs::copy(local_file, &dest).await?;
        let dest = tokio::fs::canonicalize(&dest).await?;
        tracing::info!(from = %local_file.display(), to = %dest.display(), bytes = copied, "Stored video on local disk");

        let url = Url::from_file_path(&dest).map_err(|()| {
            StorageError::Misconfigured(format!("cannot build URL for {}", dest.display()))
        })?;
        Ok(Video::new(title, url.to_string()))
    }
}
