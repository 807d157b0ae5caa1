//! Storage module
//!
//! The upload collaborator: takes a local video file and returns a publicly
//! fetchable URL plus metadata. Backends share one capability trait.

mod cloudinary;
mod local;
mod registry;
mod video;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use cloudinary::CloudinaryBackend;
pub use local::LocalDiskBackend;
pub use registry::VideoRegistry;
pub use video::Video;

use crate::config::{StorageConfig, StorageKind};
use crate::error::StorageError;

/// Something that can store a local video file and say where it lives
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Store `local_file`, returning the video with its fetchable URL
    async fn store(&self, local_file: &Path) -> Result<Video, StorageError>;
}

/// Build the configured backend
pub fn from_config(
    config: &StorageConfig,
    client: reqwest::Client,
) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.backend {
        StorageKind::Cloudinary => Ok(Arc::new(CloudinaryBackend::new(
            &config.cloudinary,
            client,
        )?)),
        StorageKind::Local => Ok(Arc::new(LocalDiskBackend::new(&config.local.dir))),
    }
}
