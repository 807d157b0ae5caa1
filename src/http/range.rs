//! HTTP Range request parsing module
//!
//! Strict single-range parsing (`bytes=start-end` / `bytes=start-`). Anything
//! the grammar does not accept is rejected rather than silently served in full.

use crate::error::{StreamError, StreamResult};

/// Parsed Range request, end not yet resolved against the resource size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    /// Start byte position
    pub start: u64,
    /// End byte position (inclusive), None means until end of resource
    pub end: Option<u64>,
}

/// A range with both ends known, ready to be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    /// Inclusive
    pub end: u64,
    /// Total resource length, None when the upstream did not report one
    pub total: Option<u64>,
}

impl RangeRequest {
    /// Resolve the end position against the total length.
    ///
    /// An explicit end past the last byte is clamped. An open end needs a
    /// known total; without one the range cannot be finalized.
    pub fn resolve(&self, total: Option<u64>) -> StreamResult<ResolvedRange> {
        let end = match (self.end, total) {
            (_, Some(0)) => return Err(StreamError::not_satisfiable(total)),
            (_, Some(t)) if self.start > t - 1 => {
                return Err(StreamError::not_satisfiable(total));
            }
            (Some(e), Some(t)) => e.min(t - 1),
            (Some(e), None) => e,
            (None, Some(t)) => t - 1,
            (None, None) => return Err(StreamError::not_satisfiable(None)),
        };

        if end < self.start {
            return Err(StreamError::not_satisfiable(total));
        }

        Ok(ResolvedRange {
            start: self.start,
            end,
            total,
        })
    }
}

impl ResolvedRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` response header
    pub fn content_range(&self) -> String {
        match self.total {
            Some(total) => format!("bytes {}-{}/{total}", self.start, self.end),
            None => format!("bytes {}-{}/*", self.start, self.end),
        }
    }
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
///
/// # Arguments
/// * `range_header` - Value of Range header
/// * `total_length` - Total resource size, if already known
///
/// # Examples
/// ```
/// use kiach::http::range::parse_range_header;
///
/// let range = parse_range_header(Some("bytes=500-"), Some(1000)).unwrap().unwrap();
/// assert_eq!(range.start, 500);
/// assert_eq!(range.resolve(Some(1000)).unwrap().len(), 500);
///
/// // No Range header
/// assert!(parse_range_header(None, Some(1000)).unwrap().is_none());
/// ```
pub fn parse_range_header(
    range_header: Option<&str>,
    total_length: Option<u64>,
) -> StreamResult<Option<RangeRequest>> {
    let Some(header) = range_header else {
        return Ok(None);
    };

    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return Err(StreamError::invalid_range(format!(
            "unsupported range unit in '{header}'"
        )));
    };

    if ranges.contains(',') {
        return Err(StreamError::invalid_range("multiple ranges are not supported"));
    }

    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return Err(StreamError::invalid_range(format!("missing '-' in '{header}'")));
    };

    let start = parse_position(start_str.trim())
        .ok_or_else(|| StreamError::invalid_range("invalid start byte position"))?;

    let end_str = end_str.trim();
    let end = if end_str.is_empty() {
        None
    } else {
        Some(
            parse_position(end_str)
                .ok_or_else(|| StreamError::invalid_range("invalid end byte position"))?,
        )
    };

    if let Some(total) = total_length {
        if total == 0 || start > total - 1 {
            return Err(StreamError::not_satisfiable(total_length));
        }
    }

    Ok(Some(RangeRequest { start, end }))
}

/// Digits only; `u64::from_str` alone would accept a leading '+'
fn parse_position(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(header: &str, total: Option<u64>) -> StreamResult<Option<RangeRequest>> {
        parse_range_header(Some(header), total)
    }

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range_header(None, Some(100)).unwrap(), None);
        assert_eq!(parse_range_header(None, None).unwrap(), None);
    }

    #[test]
    fn test_standard_range() {
        let r = parse("bytes=0-9", Some(100)).unwrap().unwrap();
        assert_eq!(r, RangeRequest { start: 0, end: Some(9) });
        let resolved = r.resolve(Some(100)).unwrap();
        assert_eq!(resolved.len(), 10);
        assert_eq!(resolved.content_range(), "bytes 0-9/100");
    }

    #[test]
    fn test_open_range() {
        let r = parse("bytes=500-", Some(1000)).unwrap().unwrap();
        assert_eq!(r.end, None);
        let resolved = r.resolve(Some(1000)).unwrap();
        assert_eq!(resolved.end, 999);
        assert_eq!(resolved.len(), 500);
        assert_eq!(resolved.content_range(), "bytes 500-999/1000");
    }

    #[test]
    fn test_whole_resource_as_range() {
        let resolved = parse("bytes=0-", Some(1000))
            .unwrap()
            .unwrap()
            .resolve(Some(1000))
            .unwrap();
        assert_eq!(resolved.len(), 1000);
        assert_eq!(resolved.content_range(), "bytes 0-999/1000");
    }

    #[test]
    fn test_not_satisfiable() {
        assert!(matches!(
            parse("bytes=2000-3000", Some(1000)),
            Err(StreamError::RangeNotSatisfiable { total_length: Some(1000) })
        ));
        assert!(matches!(
            parse("bytes=1000-", Some(1000)),
            Err(StreamError::RangeNotSatisfiable { .. })
        ));
    }

    #[test]
    fn test_empty_resource_not_satisfiable() {
        assert!(matches!(
            parse("bytes=0-", Some(0)),
            Err(StreamError::RangeNotSatisfiable { .. })
        ));
        let r = RangeRequest { start: 0, end: Some(0) };
        assert!(r.resolve(Some(0)).is_err());
    }

    #[test]
    fn test_invalid_format() {
        for header in [
            "bytes=abc-",
            "bytes=10-5,20-30",
            "bytes=0-9,20-29",
            "bytes=-500",
            "bytes=",
            "bytes=10",
            "bytes=a-b",
            "bytes=+5-",
            "items=0-9",
            "0-9",
        ] {
            assert!(
                matches!(parse(header, Some(100)), Err(StreamError::InvalidRangeFormat(_))),
                "expected InvalidRangeFormat for {header}"
            );
        }
    }

    #[test]
    fn test_inverted_range_has_no_length() {
        let r = parse("bytes=50-10", Some(100)).unwrap().unwrap();
        assert!(matches!(
            r.resolve(Some(100)),
            Err(StreamError::RangeNotSatisfiable { .. })
        ));
    }

    #[test]
    fn test_end_clamped_to_last_byte() {
        let resolved = parse("bytes=90-500", Some(100))
            .unwrap()
            .unwrap()
            .resolve(Some(100))
            .unwrap();
        assert_eq!(resolved.end, 99);
        assert_eq!(resolved.len(), 10);
    }

    #[test]
    fn test_unknown_total_defers_resolution() {
        let r = parse("bytes=100-", None).unwrap().unwrap();
        assert_eq!(r.start, 100);
        assert!(r.resolve(None).is_err());
        assert_eq!(r.resolve(Some(400)).unwrap().end, 399);

        let bounded = parse("bytes=100-199", None).unwrap().unwrap();
        let resolved = bounded.resolve(None).unwrap();
        assert_eq!(resolved.len(), 100);
        assert_eq!(resolved.content_range(), "bytes 100-199/*");
    }

    #[test]
    fn test_whitespace_tolerated() {
        let r = parse(" bytes= 5 - 9 ", Some(100)).unwrap().unwrap();
        assert_eq!(r, RangeRequest { start: 5, end: Some(9) });
    }
}
