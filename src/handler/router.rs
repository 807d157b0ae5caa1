//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, route matching, dispatching and the access log.

use hyper::header::{HeaderValue, CONTENT_LENGTH, RANGE, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::{home, stream, upload};
use crate::config::AppState;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub is_head: bool,
    /// Raw `Range` header; decoding it is part of range validation
    pub range: Option<&'a HeaderValue>,
}

/// Main entry point for HTTP request handling
///
/// Request bodies are never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    drop(body);
    let headers = &parts.headers;

    let ctx = RequestContext {
        method: &parts.method,
        path: parts.uri.path(),
        is_head: parts.method == Method::HEAD,
        range: headers.get(RANGE),
    };

    let response = match check_http_method(ctx.method, state.config.http.enable_cors) {
        Some(resp) => resp,
        None => route_request(&ctx, &state).await,
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            ctx.method.to_string(),
            ctx.path.to_string(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.range = ctx
            .range
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        entry.referer = header_string(headers, REFERER);
        entry.user_agent = header_string(headers, USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Reject methods no route accepts; answer OPTIONS directly
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<ResponseBody>> {
    match method {
        &Method::GET | &Method::HEAD | &Method::POST => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path
async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<ResponseBody> {
    let routes = &state.config.routes;
    let is_read = *ctx.method != Method::POST;

    // Health check endpoints come first and never touch storage
    if routes.health.enabled
        && (ctx.path == routes.health.liveness_path || ctx.path == routes.health.readiness_path)
    {
        return if is_read {
            http::build_health_response("ok")
        } else {
            http::build_405_response()
        };
    }

    match ctx.path {
        "/upload" if !is_read => upload::handle_upload(state).await,
        "/upload" => http::build_405_response(),
        _ if !is_read => http::build_405_response(),
        "/" => serve_homepage(ctx, state).await,
        "/videos" => http::build_json_response(StatusCode::OK, &state.registry.list().await),
        "/stream" | "/stream/" => stream::serve_default(ctx, state).await,
        path => match path.strip_prefix("/stream/") {
            Some(id) if !id.contains('/') => stream::serve_video(ctx, id, state).await,
            _ => http::build_404_response(),
        },
    }
}

async fn serve_homepage(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    let videos = state.registry.list().await;
    let has_default = state
        .config
        .stream
        .default_url
        .as_deref()
        .is_some_and(|url| !url.is_empty());
    http::build_html_response(home::render_homepage(&videos, has_default), ctx.is_head)
}

fn header_string(headers: &hyper::HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::Video;
    use http_body_util::BodyExt;

    fn test_state(cfg: &Config) -> Arc<AppState> {
        Arc::new(AppState::new(cfg).unwrap())
    }

    fn default_config() -> Config {
        Config::load_from("/nonexistent/kiach-config").unwrap()
    }

    async fn send(state: &Arc<AppState>, method: Method, path: &str) -> Response<ResponseBody> {
        let req = Request::builder().method(method).uri(path).body(()).unwrap();
        handle_request(req, Arc::clone(state), "127.0.0.1:9000".parse().unwrap())
            .await
            .unwrap()
    }

    async fn text(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_stream_without_default_url_is_bad_request() {
        let state = test_state(&default_config());
        let resp = send(&state, Method::GET, "/stream").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(resp).await, "URL parameter missing");
    }

    #[tokio::test]
    async fn test_unknown_video_id_is_not_found() {
        let state = test_state(&default_config());
        let resp = send(&state, Method::GET, "/stream/does-not-exist").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_registered_local_video_streams() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();
        let url = reqwest::Url::from_file_path(&path).unwrap().to_string();

        let state = test_state(&default_config());
        let video = Video::new("clip.mp4", url);
        state.registry.insert(video.clone()).await;

        let req = Request::builder()
            .uri(format!("/stream/{}", video.id))
            .header("Range", "bytes=2-5")
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state), "127.0.0.1:9000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()["Content-Range"], "bytes 2-5/10");
        assert_eq!(resp.headers()["Content-Type"], "video/mp4");
        assert_eq!(text(resp).await, "2345");
    }

    #[tokio::test]
    async fn test_non_ascii_range_header_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();
        let url = reqwest::Url::from_file_path(&path).unwrap().to_string();

        let state = test_state(&default_config());
        let video = Video::new("clip.mp4", url);
        state.registry.insert(video.clone()).await;

        let req = Request::builder()
            .uri(format!("/stream/{}", video.id))
            .header(RANGE, HeaderValue::from_bytes(b"bytes=\xff-").unwrap())
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state), "127.0.0.1:9000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.headers().get("Content-Range").is_none());
    }

    #[tokio::test]
    async fn test_method_handling() {
        let state = test_state(&default_config());
        assert_eq!(
            send(&state, Method::DELETE, "/stream").await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            send(&state, Method::POST, "/stream").await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            send(&state, Method::GET, "/upload").await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            send(&state, Method::OPTIONS, "/stream").await.status(),
            StatusCode::NO_CONTENT
        );
    }

    #[tokio::test]
    async fn test_upload_without_storage_is_json_error() {
        // Default config selects Cloudinary without credentials
        let state = test_state(&default_config());
        assert!(state.storage.is_none());
        let resp = send(&state, Method::POST, "/upload").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(text(resp).await.contains("\"error\""));
    }

    #[tokio::test]
    async fn test_home_and_listing() {
        let state = test_state(&default_config());
        let video = Video::new("clip.mp4", "https://cdn.example.com/clip.mp4");
        state.registry.insert(video.clone()).await;

        let home = send(&state, Method::GET, "/").await;
        assert_eq!(home.status(), StatusCode::OK);
        assert!(text(home).await.contains(&format!("/stream/{}", video.id)));

        let list = send(&state, Method::GET, "/videos").await;
        let listed: Vec<Video> = serde_json::from_str(&text(list).await).unwrap();
        assert_eq!(listed, vec![video]);
    }

    #[tokio::test]
    async fn test_health_and_unknown_paths() {
        let state = test_state(&default_config());
        assert_eq!(send(&state, Method::GET, "/healthz").await.status(), StatusCode::OK);
        assert_eq!(send(&state, Method::GET, "/readyz").await.status(), StatusCode::OK);
        assert_eq!(
            send(&state, Method::GET, "/stream/a/b").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(send(&state, Method::GET, "/nope").await.status(), StatusCode::NOT_FOUND);
    }
}
