//! Streaming routes
//!
//! `/stream/{id}` serves a registered video, `/stream` the configured
//! default URL. Both hand the inbound `Range` header to the range streamer
//! and never buffer the media.

use hyper::header::HeaderValue;
use hyper::{Response, StatusCode};

use super::router::RequestContext;
use crate::config::AppState;
use crate::error::StreamError;
use crate::http::{self, ResponseBody};
use crate::streamer;

/// Serve `/stream/{id}`
pub async fn serve_video(
    ctx: &RequestContext<'_>,
    id: &str,
    state: &AppState,
) -> Response<ResponseBody> {
    let Some(video) = state.registry.get(id).await else {
        tracing::debug!(id, "Unknown video id");
        return http::build_404_response();
    };
    stream_url(ctx, &video.url, state).await
}

/// Serve `/stream` from `stream.default_url`
pub async fn serve_default(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    match state.config.stream.default_url.as_deref() {
        Some(url) if !url.is_empty() => stream_url(ctx, url, state).await,
        _ => http::build_text_response(StatusCode::BAD_REQUEST, "URL parameter missing"),
    }
}

async fn stream_url(ctx: &RequestContext<'_>, url: &str, state: &AppState) -> Response<ResponseBody> {
    tracing::debug!(url, range = ?ctx.range, "Streaming video");

    let planned = match ctx.range.map(HeaderValue::to_str).transpose() {
        Err(_) => Err(StreamError::invalid_range("Range header is not visible ASCII")),
        Ok(range) if ctx.is_head => {
            streamer::open_headers_and_plan(&state.provider, &state.streamer, url, range).await
        }
        Ok(range) => streamer::open_and_plan(&state.provider, &state.streamer, url, range).await,
    };

    match planned {
        Ok(plan) => {
            tracing::debug!(
                status = plan.status.as_u16(),
                content_length = ?plan.content_length(),
                "Stream planned"
            );
            plan.into_response(ctx.is_head)
        }
        Err(err) => {
            log_stream_error(url, &err);
            http::build_stream_error_response(&err)
        }
    }
}

fn log_stream_error(url: &str, err: &StreamError) {
    match err {
        StreamError::UpstreamFetchFailed(_) | StreamError::UpstreamUnreachable(_) => {
            tracing::error!(url, "Error fetching video: {err}");
        }
        StreamError::SourceNotSeekable { .. } | StreamError::Io(_) => {
            tracing::error!(url, "Streaming failed: {err}");
        }
        StreamError::InvalidRangeFormat(_)
        | StreamError::RangeNotSatisfiable { .. }
        | StreamError::NotFound(_) => {
            tracing::debug!(url, "Rejected stream request: {err}");
        }
    }
}
