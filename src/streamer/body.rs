//! Streaming response body
//!
//! Copies bytes from a `MediaSource` to the client through one fixed-size
//! buffer. Never holds more than a buffer's worth of the resource in memory.

use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

use super::source::MediaSource;

/// Body that drains a media source, optionally stopping after `limit` bytes
pub struct MediaBody {
    source: Option<Box<dyn MediaSource>>,
    /// Bytes still owed to the client; None means "until the source ends"
    remaining: Option<u64>,
    buf: Vec<u8>,
    sent: u64,
}

impl MediaBody {
    pub fn new(source: Box<dyn MediaSource>, limit: Option<u64>, buffer_size: usize) -> Self {
        Self {
            source: Some(source),
            remaining: limit,
            buf: vec![0; buffer_size.max(1)],
            sent: 0,
        }
    }

    /// Bytes handed to the transport so far
    pub const fn bytes_sent(&self) -> u64 {
        self.sent
    }

    /// Release the source without it counting as an aborted stream
    pub fn discard(&mut self) {
        self.source = None;
    }
}

impl Body for MediaBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let Some(source) = this.source.as_mut() else {
            return Poll::Ready(None);
        };

        let want = match this.remaining {
            Some(0) => {
                this.source = None;
                return Poll::Ready(None);
            }
            Some(left) => usize::try_from(left).map_or(this.buf.len(), |l| l.min(this.buf.len())),
            None => this.buf.len(),
        };

        let result = {
            let mut read_buf = ReadBuf::new(&mut this.buf[..want]);
            match Pin::new(source).poll_read(cx, &mut read_buf) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(r) => r.map(|()| Bytes::copy_from_slice(read_buf.filled())),
            }
        };

        match result {
            Err(e) => {
                tracing::error!(sent = this.sent, error = %e, "Media source read failed");
                this.source = None;
                Poll::Ready(Some(Err(e)))
            }
            Ok(chunk) if chunk.is_empty() => {
                this.source = None;
                match this.remaining {
                    Some(left) if left > 0 => Poll::Ready(Some(Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("media source ended {left} bytes short"),
                    )))),
                    _ => Poll::Ready(None),
                }
            }
            Ok(chunk) => {
                let n = chunk.len() as u64;
                this.sent += n;
                if let Some(left) = this.remaining.as_mut() {
                    *left -= n;
                    if *left == 0 {
                        this.source = None;
                    }
                }
                Poll::Ready(Some(Ok(Frame::data(chunk))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.source.is_none() || self.remaining == Some(0)
    }

    fn size_hint(&self) -> SizeHint {
        match self.remaining {
            Some(left) if self.source.is_some() => SizeHint::with_exact(left),
            Some(_) => SizeHint::with_exact(0),
            None => SizeHint::default(),
        }
    }
}

impl Drop for MediaBody {
    fn drop(&mut self) {
        // The transport drops an unfinished body when the client goes away
        if self.source.is_some() {
            tracing::debug!(
                sent = self.sent,
                remaining = ?self.remaining,
                "Client disconnected mid-stream, releasing source"
            );
        }
    }
}
