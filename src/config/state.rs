// Application state module
// Shared, read-mostly services handed to every request

use std::sync::Arc;

use super::types::Config;
use crate::logger;
use crate::storage::{self, StorageBackend, VideoRegistry};
use crate::streamer::{MediaProvider, RangeStreamer, SeekFallback};

/// Application state
pub struct AppState {
    pub config: Config,
    pub registry: VideoRegistry,
    pub provider: MediaProvider,
    pub streamer: RangeStreamer,
    /// None when the configured backend could not be built
    pub storage: Option<Arc<dyn StorageBackend>>,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// A misconfigured storage backend only disables uploads; streaming
    /// keeps working.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let provider = MediaProvider::new(&config.stream, &config.http.server_name)?;
        let upload_client = reqwest::Client::builder()
            .user_agent(config.http.server_name.as_str())
            .build()?;

        let storage = match storage::from_config(&config.storage, upload_client) {
            Ok(backend) => {
                logger::log_info(&format!("Storage backend: {}", backend.name()));
                Some(backend)
            }
            Err(e) => {
                logger::log_warning(&format!("Uploads disabled: {e}"));
                None
            }
        };

        Ok(Self::with_parts(config, provider, storage))
    }

    /// Build state around an explicit storage backend
    pub fn with_storage(
        config: &Config,
        storage: Arc<dyn StorageBackend>,
    ) -> Result<Self, reqwest::Error> {
        let provider = MediaProvider::new(&config.stream, &config.http.server_name)?;
        Ok(Self::with_parts(config, provider, Some(storage)))
    }

    fn with_parts(
        config: &Config,
        provider: MediaProvider,
        storage: Option<Arc<dyn StorageBackend>>,
    ) -> Self {
        let fallback = if config.stream.degrade_unseekable {
            SeekFallback::FullBody
        } else {
            SeekFallback::Fail
        };

        Self {
            config: config.clone(),
            registry: VideoRegistry::new(),
            provider,
            streamer: RangeStreamer::new(
                config.stream.buffer_size,
                fallback,
                &config.stream.default_content_type,
            ),
            storage,
        }
    }
}
