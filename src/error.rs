//! Error types
//!
//! `StreamError` covers the range-streaming path and knows its HTTP status;
//! `StorageError` covers the upload collaborator.

use hyper::StatusCode;

/// Failure while planning or serving a media stream
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Malformed `Range` header (bad syntax, non-numeric, multi-range)
    #[error("Invalid Range header: {0}")]
    InvalidRangeFormat(String),

    /// Start beyond the resource, empty resource, or computed length <= 0
    #[error("Range not satisfiable")]
    RangeNotSatisfiable { total_length: Option<u64> },

    /// The source cannot reposition its read cursor
    #[error("Source cannot seek to byte {offset}")]
    SourceNotSeekable { offset: u64 },

    /// Upstream answered, but not with usable media bytes
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetchFailed(String),

    /// Connect failure or timeout reaching the upstream
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Unknown video id or missing local file
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    pub fn invalid_range<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRangeFormat(msg.into())
    }

    pub const fn not_satisfiable(total_length: Option<u64>) -> Self {
        Self::RangeNotSatisfiable { total_length }
    }

    /// Status code this error maps to at the HTTP boundary
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRangeFormat(_) => StatusCode::BAD_REQUEST,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::SourceNotSeekable { .. } | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamFetchFailed(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::UpstreamUnreachable(err.to_string())
        } else {
            Self::UpstreamFetchFailed(err.to_string())
        }
    }
}

/// Failure while handing a local file to a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Storage backend misconfigured: {0}")]
    Misconfigured(String),
}

pub type StreamResult<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StreamError::invalid_range("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StreamError::not_satisfiable(Some(10)).status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert_eq!(
            StreamError::SourceNotSeekable { offset: 5 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StreamError::UpstreamFetchFailed("500".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            StreamError::UpstreamUnreachable("dns".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_display() {
        let err = StreamError::SourceNotSeekable { offset: 42 };
        assert_eq!(err.to_string(), "Source cannot seek to byte 42");
        let err = StorageError::Rejected {
            status: 401,
            message: "bad key".into(),
        };
        assert_eq!(err.to_string(), "Upload rejected (401): bad key");
    }
}
