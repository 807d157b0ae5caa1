//! Media source abstraction
//!
//! A `MediaSource` is the request-scoped handle on upstream bytes. It reads
//! like any `AsyncRead`, reports what it knows about the resource, and can be
//! asked to move its read cursor. Dropping it releases the underlying
//! connection or file handle.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::StreamResult;

/// Seekable-if-possible byte source of a media resource
#[async_trait]
pub trait MediaSource: AsyncRead + Send + Unpin {
    /// Total resource length in bytes, if the transport reported it
    fn total_length(&self) -> Option<u64>;

    /// Declared media type, if any
    fn content_type(&self) -> Option<&str>;

    /// Offset of the next byte `poll_read` will return
    fn position(&self) -> u64;

    /// Move the read cursor to `offset`.
    ///
    /// Fails with `SourceNotSeekable` when the transport cannot reposition.
    async fn seek_to(&mut self, offset: u64) -> StreamResult<()>;

    /// Last byte (inclusive) the current transfer will deliver, when the
    /// transport stops short of the end of the resource
    fn transfer_end(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory sources for planner and body tests

    use super::*;
    use crate::error::StreamError;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Seekable in-memory source that flags when it is dropped
    pub struct MemorySource {
        data: Cursor<Vec<u8>>,
        content_type: Option<String>,
        seekable: bool,
        report_length: bool,
        capped_at: Option<u64>,
        pub released: Arc<AtomicBool>,
    }

    impl MemorySource {
        pub fn new(data: Vec<u8>) -> Self {
            Self {
                data: Cursor::new(data),
                content_type: Some("video/mp4".to_string()),
                seekable: true,
                report_length: true,
                capped_at: None,
                released: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn unseekable(mut self) -> Self {
            self.seekable = false;
            self
        }

        pub fn unknown_length(mut self) -> Self {
            self.report_length = false;
            self
        }

        pub fn without_content_type(mut self) -> Self {
            self.content_type = None;
            self
        }

        /// Report a transfer that stops after byte `last`
        pub fn capped_at(mut self, last: u64) -> Self {
            self.capped_at = Some(last);
            self
        }
    }

    impl Drop for MemorySource {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    impl AsyncRead for MemorySource {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Pin::new(&mut self.data).poll_read(cx, buf)
        }
    }

    #[async_trait]
    impl MediaSource for MemorySource {
        fn total_length(&self) -> Option<u64> {
            self.report_length
                .then(|| self.data.get_ref().len() as u64)
        }

        fn content_type(&self) -> Option<&str> {
            self.content_type.as_deref()
        }

        fn position(&self) -> u64 {
            self.data.position()
        }

        async fn seek_to(&mut self, offset: u64) -> StreamResult<()> {
            if offset == self.data.position() {
                return Ok(());
            }
            if !self.seekable {
                return Err(StreamError::SourceNotSeekable { offset });
            }
            self.data.set_position(offset);
            Ok(())
        }

        fn transfer_end(&self) -> Option<u64> {
            self.capped_at
        }
    }

    /// Deterministic test payload: byte i is `i % 251`
    pub fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }
}
