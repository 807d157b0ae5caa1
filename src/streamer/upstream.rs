//! Remote HTTP media source
//!
//! Fetches the resource with reqwest and exposes the response body as an
//! `AsyncRead`. The caller's start offset is forwarded as `Range: bytes=N-`
//! so a single upstream request normally lands on the right byte already.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use reqwest::StatusCode;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::StreamReader;

use super::source::MediaSource;
use crate::error::{StreamError, StreamResult};
use crate::http::mime;

type BodyReader = StreamReader<BoxStream<'static, std::io::Result<Bytes>>, Bytes>;

/// Media source streaming from an HTTP(S) upstream
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    header_timeout: Duration,
    reader: BodyReader,
    position: u64,
    total_length: Option<u64>,
    content_type: Option<String>,
    seekable: bool,
    /// Last byte of the current 206 body
    transfer_end: Option<u64>,
    /// Built from a HEAD reply; there is no body to read
    headers_only: bool,
}

/// What an upstream response says about the bytes it carries
struct UpstreamBody {
    reader: BodyReader,
    position: u64,
    total_length: Option<u64>,
    content_type: Option<String>,
    seekable: bool,
    transfer_end: Option<u64>,
}

impl HttpSource {
    /// Issue the upstream GET, starting at `start` when it is non-zero.
    ///
    /// An upstream that ignores the range answers 200 and the source stays at
    /// offset 0; the planner then finds out through `seek_to`.
    pub async fn open(
        client: &reqwest::Client,
        url: &str,
        start: u64,
        header_timeout: Duration,
    ) -> StreamResult<Self> {
        let body = fetch(client, url, start, header_timeout).await?;
        tracing::debug!(
            url,
            position = body.position,
            total_length = ?body.total_length,
            seekable = body.seekable,
            "Upstream stream opened"
        );

        Ok(Self {
            client: client.clone(),
            url: url.to_string(),
            header_timeout,
            reader: body.reader,
            position: body.position,
            total_length: body.total_length,
            content_type: body.content_type,
            seekable: body.seekable,
            transfer_end: body.transfer_end,
            headers_only: false,
        })
    }

    /// Learn length, type and range support with a HEAD request.
    ///
    /// The source carries no body; seeking only moves the reported position.
    pub async fn inspect(
        client: &reqwest::Client,
        url: &str,
        header_timeout: Duration,
    ) -> StreamResult<Self> {
        let response = send(client.head(url), header_timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::UpstreamFetchFailed(format!(
                "upstream returned {status} to HEAD"
            )));
        }

        // reqwest reports the (empty) HEAD body size, so read the header
        let headers = response.headers();
        let total_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        tracing::debug!(url, total_length = ?total_length, "Upstream inspected");

        Ok(Self {
            client: client.clone(),
            url: url.to_string(),
            header_timeout,
            reader: StreamReader::new(futures::stream::empty::<std::io::Result<Bytes>>().boxed()),
            position: 0,
            total_length,
            content_type: content_type_of(&response),
            seekable: accepts_byte_ranges(headers),
            transfer_end: None,
            headers_only: true,
        })
    }
}

async fn send(
    request: reqwest::RequestBuilder,
    header_timeout: Duration,
) -> StreamResult<reqwest::Response> {
    tokio::time::timeout(header_timeout, request.send())
        .await
        .map_err(|_| {
            StreamError::UpstreamUnreachable(format!(
                "no response from upstream within {}s",
                header_timeout.as_secs()
            ))
        })?
        .map_err(StreamError::from)
}

fn accepts_byte_ranges(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|unit| unit.trim() == "bytes"))
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
        .or_else(|| guess_content_type(response.url().path()))
}

async fn fetch(
    client: &reqwest::Client,
    url: &str,
    start: u64,
    header_timeout: Duration,
) -> StreamResult<UpstreamBody> {
    let mut request = client.get(url);
    if start > 0 {
        request = request.header(RANGE, format!("bytes={start}-"));
    }

    let response = send(request, header_timeout).await?;

    let status = response.status();
    let headers = response.headers();
    let content_range = headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range);

    let (position, total_length, transfer_end) = match status {
        StatusCode::PARTIAL_CONTENT => {
            let Some(ContentRange {
                span: Some((first, last)),
                total,
            }) = content_range
            else {
                return Err(StreamError::UpstreamFetchFailed(
                    "206 response without a usable Content-Range".to_string(),
                ));
            };
            (first, total, Some(last))
        }
        StatusCode::OK => (0, response.content_length(), None),
        StatusCode::RANGE_NOT_SATISFIABLE => {
            return Err(StreamError::not_satisfiable(
                content_range.and_then(|r| r.total),
            ));
        }
        other => {
            return Err(StreamError::UpstreamFetchFailed(format!(
                "upstream returned {other}"
            )));
        }
    };

    let seekable = status == StatusCode::PARTIAL_CONTENT || accepts_byte_ranges(headers);
    let content_type = content_type_of(&response);

    let stream = response
        .bytes_stream()
        .map_err(std::io::Error::other)
        .boxed();

    Ok(UpstreamBody {
        reader: StreamReader::new(stream),
        position,
        total_length,
        content_type,
        seekable,
        transfer_end,
    })
}

fn guess_content_type(path: &str) -> Option<String> {
    let guess = mime::content_type_for_path(path);
    (guess != mime::OCTET_STREAM).then(|| guess.to_string())
}

impl AsyncRead for HttpSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.reader).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            self.position += (buf.filled().len() - before) as u64;
        }
        poll
    }
}

#[async_trait]
impl MediaSource for HttpSource {
    fn total_length(&self) -> Option<u64> {
        self.total_length
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn position(&self) -> u64 {
        self.position
    }

    /// Re-requests the resource from `offset`; the old body is dropped
    async fn seek_to(&mut self, offset: u64) -> StreamResult<()> {
        if offset == self.position {
            return Ok(());
        }
        if !self.seekable {
            return Err(StreamError::SourceNotSeekable { offset });
        }
        if self.headers_only {
            self.position = offset;
            return Ok(());
        }

        let body = fetch(&self.client, &self.url, offset, self.header_timeout).await?;
        if body.position != offset {
            return Err(StreamError::SourceNotSeekable { offset });
        }

        self.reader = body.reader;
        self.position = body.position;
        self.transfer_end = body.transfer_end;
        if body.total_length.is_some() {
            self.total_length = body.total_length;
        }
        Ok(())
    }

    fn transfer_end(&self) -> Option<u64> {
        self.transfer_end
    }
}

/// Parsed `Content-Range` response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContentRange {
    /// First and last byte, None for the unsatisfied form `bytes */total`
    span: Option<(u64, u64)>,
    total: Option<u64>,
}

fn parse_content_range(value: &str) -> Option<ContentRange> {
    let rest = value.trim().strip_prefix("bytes ")?;
    let (range, total) = rest.split_once('/')?;

    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse().ok()?),
    };

    let span = match range.trim() {
        "*" => None,
        r => {
            let (s, e) = r.split_once('-')?;
            let first: u64 = s.trim().parse().ok()?;
            let last: u64 = e.trim().parse().ok()?;
            if last < first {
                return None;
            }
            Some((first, last))
        }
    };

    Some(ContentRange { span, total })
}
