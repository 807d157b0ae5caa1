//! Range streaming module
//!
//! Proxies media bytes from a source to the client with HTTP range
//! semantics. Everything here is request-scoped; no state is shared between
//! concurrent streams.

mod body;
mod file;
mod planner;
mod provider;
mod source;
mod upstream;

pub use body::MediaBody;
pub use file::FileSource;
pub use planner::{RangeStreamer, ResponsePlan, SeekFallback, DEFAULT_BUFFER_SIZE};
pub use provider::MediaProvider;
pub use source::MediaSource;
pub use upstream::HttpSource;

use crate::error::StreamResult;
use crate::http::range::parse_range_header;

/// Validate the `Range` header, open `url` and plan the response.
///
/// The header is checked for syntax before any upstream traffic; bounds are
/// checked once the source has reported its length.
pub async fn open_and_plan(
    provider: &MediaProvider,
    streamer: &RangeStreamer,
    url: &str,
    range_header: Option<&str>,
) -> StreamResult<ResponsePlan> {
    let range = parse_range_header(range_header, None)?;
    let start_hint = range.map_or(0, |r| r.start);

    let source = provider.open(url, start_hint).await?;
    streamer.plan(source, range).await
}

/// Same as [`open_and_plan`] for a HEAD request.
///
/// Remote media is asked with HEAD, so no body transfer is started upstream.
pub async fn open_headers_and_plan(
    provider: &MediaProvider,
    streamer: &RangeStreamer,
    url: &str,
    range_header: Option<&str>,
) -> StreamResult<ResponsePlan> {
    let range = parse_range_header(range_header, None)?;
    let start_hint = range.map_or(0, |r| r.start);

    let source = provider.open_headers(url, start_hint).await?;
    streamer.plan(source, range).await
}
