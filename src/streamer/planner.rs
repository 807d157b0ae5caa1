//! Response planner
//!
//! Turns a media source and an optional range request into a `ResponsePlan`:
//! status, ordered headers, and a body positioned on the first byte to send.

use http_body_util::BodyExt;
use hyper::header::{
    HeaderMap, HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};

use super::body::MediaBody;
use super::source::MediaSource;
use crate::error::{StreamError, StreamResult};
use crate::http::mime;
use crate::http::range::{RangeRequest, ResolvedRange};
use crate::http::response::{self, ResponseBody};

/// Default copy buffer size
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// What to do when a range cannot be served because the source cannot seek.
///
/// The planner never degrades on its own; the transport layer chooses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeekFallback {
    /// Surface `SourceNotSeekable`
    #[default]
    Fail,
    /// Serve the whole resource with 200 if the source is still at offset 0
    FullBody,
}

/// Plans range responses for media sources
#[derive(Debug, Clone)]
pub struct RangeStreamer {
    buffer_size: usize,
    seek_fallback: SeekFallback,
    default_content_type: String,
}

impl Default for RangeStreamer {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            seek_fallback: SeekFallback::Fail,
            default_content_type: mime::OCTET_STREAM.to_string(),
        }
    }
}

impl RangeStreamer {
    pub fn new(buffer_size: usize, seek_fallback: SeekFallback, default_content_type: &str) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            seek_fallback,
            default_content_type: default_content_type.to_string(),
        }
    }

    /// Build the response plan for `source`.
    ///
    /// # Errors
    /// `RangeNotSatisfiable` when the range falls outside the resource,
    /// `SourceNotSeekable` when the source cannot reach `start` (and the
    /// fallback does not apply), or whatever the source's seek reports.
    pub async fn plan(
        &self,
        mut source: Box<dyn MediaSource>,
        range: Option<RangeRequest>,
    ) -> StreamResult<ResponsePlan> {
        let Some(range) = range else {
            return Ok(self.full_plan(source, true));
        };

        let resolved = range.resolve(source.total_length())?;

        match source.seek_to(resolved.start).await {
            Ok(()) => {
                let resolved = narrow_to_transfer(resolved, source.transfer_end());
                Ok(self.partial_plan(source, resolved))
            }
            Err(StreamError::SourceNotSeekable { offset })
                if self.seek_fallback == SeekFallback::FullBody && source.position() == 0 =>
            {
                tracing::warn!(
                    offset,
                    "Source cannot seek, degrading range request to full response"
                );
                Ok(self.full_plan(source, false))
            }
            Err(e) => Err(e),
        }
    }

    fn full_plan(&self, source: Box<dyn MediaSource>, accept_ranges: bool) -> ResponsePlan {
        let total = source.total_length();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, self.content_type_value(source.as_ref()));
        if let Some(total) = total {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(total));
        }
        headers.insert(
            ACCEPT_RANGES,
            HeaderValue::from_static(if accept_ranges { "bytes" } else { "none" }),
        );

        ResponsePlan {
            status: StatusCode::OK,
            headers,
            content_length: total,
            body: MediaBody::new(source, None, self.buffer_size),
        }
    }

    fn partial_plan(&self, source: Box<dyn MediaSource>, range: ResolvedRange) -> ResponsePlan {
        let length = range.len();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, self.content_type_value(source.as_ref()));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        if let Ok(value) = HeaderValue::from_str(&range.content_range()) {
            headers.insert(CONTENT_RANGE, value);
        }

        ResponsePlan {
            status: StatusCode::PARTIAL_CONTENT,
            headers,
            content_length: Some(length),
            body: MediaBody::new(source, Some(length), self.buffer_size),
        }
    }

    fn content_type_value(&self, source: &dyn MediaSource) -> HeaderValue {
        source
            .content_type()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .or_else(|| HeaderValue::from_str(&self.default_content_type).ok())
            .unwrap_or_else(|| HeaderValue::from_static(mime::OCTET_STREAM))
    }
}

/// Shrink `range` to what the source will actually deliver.
///
/// Upstreams may answer an open range with a shorter span; a 206 for that
/// span is still a valid answer to the request.
fn narrow_to_transfer(range: ResolvedRange, transfer_end: Option<u64>) -> ResolvedRange {
    match transfer_end {
        Some(last) if last >= range.start && last < range.end => {
            tracing::debug!(
                requested_end = range.end,
                served_end = last,
                "Source caps the transfer, narrowing range"
            );
            ResolvedRange { end: last, ..range }
        }
        _ => range,
    }
}

/// Status, headers and body of one streaming response. Consumed exactly once.
pub struct ResponsePlan {
    pub status: StatusCode,
    pub headers: HeaderMap,
    content_length: Option<u64>,
    body: MediaBody,
}

impl ResponsePlan {
    /// Bytes the body will carry, when known up front
    pub const fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Hand the plan to the transport. A HEAD response keeps the headers and
    /// releases the source immediately.
    pub fn into_response(self, is_head: bool) -> Response<ResponseBody> {
        let Self {
            status,
            headers,
            mut body,
            ..
        } = self;

        let body = if is_head {
            body.discard();
            response::empty()
        } else {
            body.boxed_unsync()
        };

        let mut resp = Response::new(body);
        *resp.status_mut() = status;
        *resp.headers_mut() = headers;
        resp
    }
}
