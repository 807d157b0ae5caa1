//! HTTP response building module
//!
//! Builders for fixed-body responses. Streaming responses are produced by
//! `streamer::ResponsePlan`; both share the boxed `ResponseBody` type.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::StreamError;

/// Body type of every response the server writes
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Wrap in-memory bytes as a response body
pub fn full<T: Into<Bytes>>(data: T) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty response body
pub fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, POST, OPTIONS")
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, POST, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, HEAD, POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type, Range")
            .header(
                "Access-Control-Expose-Headers",
                "Content-Length, Content-Range, Accept-Ranges",
            )
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(empty()).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(empty())
    })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(total_length: Option<u64>) -> Response<ResponseBody> {
    let content_range = total_length.map_or_else(
        || "bytes */*".to_string(),
        |total| format!("bytes */{total}"),
    );
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header("Content-Type", "text/plain")
        .header("Content-Range", content_range)
        .body(full("Range Not Satisfiable"))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(full("Range Not Satisfiable"))
        })
}

/// Map a streaming failure onto its boundary response
pub fn build_stream_error_response(err: &StreamError) -> Response<ResponseBody> {
    match err {
        StreamError::RangeNotSatisfiable { total_length } => build_416_response(*total_length),
        StreamError::InvalidRangeFormat(_) | StreamError::NotFound(_) => {
            build_text_response(err.status_code(), &err.to_string())
        }
        StreamError::UpstreamFetchFailed(_) => {
            build_text_response(err.status_code(), "Bad Gateway")
        }
        StreamError::UpstreamUnreachable(_) => {
            build_text_response(err.status_code(), "Service Unavailable")
        }
        StreamError::SourceNotSeekable { .. } | StreamError::Io(_) => {
            build_text_response(err.status_code(), "Internal Server Error")
        }
    }
}

/// Build plain text response with arbitrary status
pub fn build_text_response(status: StatusCode, message: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(full(message.to_string()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full(message.to_string()))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty())
        })
}

/// Build JSON response
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ResponseBody> {
    let json = match serde_json::to_string_pretty(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full(json))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full("Error"))
        })
}

/// Build `{"error": ...}` JSON response
pub fn build_json_error(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let body = serde_json::json!({ "error": message });
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full(body.to_string()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full("Error"))
        })
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<ResponseBody> {
    build_json_response(StatusCode::OK, &serde_json::json!({ "status": status }))
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_416_carries_total() {
        let resp = build_416_response(Some(1000));
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()["Content-Range"], "bytes */1000");

        let resp = build_416_response(None);
        assert_eq!(resp.headers()["Content-Range"], "bytes */*");
    }

    #[tokio::test]
    async fn test_invalid_range_is_400_with_reason() {
        let err = StreamError::invalid_range("invalid start byte position");
        let resp = build_stream_error_response(&err);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(resp).await.contains("invalid start byte position"));
    }

    #[tokio::test]
    async fn test_upstream_details_not_leaked() {
        let err = StreamError::UpstreamFetchFailed("secret-host.internal: 500".into());
        let resp = build_stream_error_response(&err);
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_string(resp).await, "Bad Gateway");
    }

    #[tokio::test]
    async fn test_head_html_has_length_without_body() {
        let resp = build_html_response("<p>hi</p>".to_string(), true);
        assert_eq!(resp.headers()["Content-Length"], "9");
        assert_eq!(body_string(resp).await, "");
    }

    #[test]
    fn test_cors_preflight_allows_range() {
        let resp = build_options_response(true);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers()["Access-Control-Allow-Headers"],
            "Content-Type, Range"
        );
        assert!(build_options_response(false)
            .headers()
            .get("Access-Control-Allow-Origin")
            .is_none());
    }
}
