//! Upload route
//!
//! `POST /upload` stores the configured local video through the storage
//! backend and registers it for streaming.

use hyper::{Response, StatusCode};
use std::path::Path;

use crate::config::AppState;
use crate::http::{self, ResponseBody};
use crate::logger;

pub async fn handle_upload(state: &AppState) -> Response<ResponseBody> {
    let Some(storage) = state.storage.as_ref() else {
        return http::build_json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Storage backend is not configured",
        );
    };

    let Some(video_path) = state.config.upload.video_path.as_deref() else {
        return http::build_json_error(StatusCode::INTERNAL_SERVER_ERROR, "VIDEO_PATH is not set");
    };

    let path = Path::new(video_path);
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        logger::log_error(&format!("Upload source missing: {video_path}"));
        return http::build_json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to open local file",
        );
    }

    match storage.store(path).await {
        Ok(video) => {
            tracing::info!(id = %video.id, url = %video.url, backend = storage.name(), "Video uploaded");
            state.registry.insert(video.clone()).await;
            http::build_json_response(StatusCode::OK, &video)
        }
        Err(e) => {
            logger::log_error(&format!("Upload failed: {e}"));
            http::build_json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
