//! Local file media source

use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, ReadBuf};

use super::source::MediaSource;
use crate::error::{StreamError, StreamResult};
use crate::http::mime;

/// Media source backed by a file on local disk
pub struct FileSource {
    file: File,
    total_length: u64,
    content_type: &'static str,
    position: u64,
}

impl FileSource {
    /// Open a file, reading its size and guessing its type from the extension
    pub async fn open(path: &Path) -> StreamResult<Self> {
        let file = File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StreamError::NotFound(path.display().to_string())
            } else {
                StreamError::Io(e)
            }
        })?;
        let total_length = file.metadata().await?.len();
        let content_type =
            mime::get_content_type(path.extension().and_then(|e| e.to_str()));

        Ok(Self {
            file,
            total_length,
            content_type,
            position: 0,
        })
    }
}

impl AsyncRead for FileSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.file).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            self.position += (buf.filled().len() - before) as u64;
        }
        poll
    }
}

#[async_trait]
impl MediaSource for FileSource {
    fn total_length(&self) -> Option<u64> {
        Some(self.total_length)
    }

    fn content_type(&self) -> Option<&str> {
        Some(self.content_type)
    }

    fn position(&self) -> u64 {
        self.position
    }

    async fn seek_to(&mut self, offset: u64) -> StreamResult<()> {
        if offset != self.position {
            self.position = self.file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_open_and_seek() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut source = FileSource::open(&path).await.unwrap();
        assert_eq!(source.total_length(), Some(10));
        assert_eq!(source.content_type(), Some("video/mp4"));

        source.seek_to(4).await.unwrap();
        let mut buf = [0u8; 3];
        source.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"456");
        assert_eq!(source.position(), 7);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSource::open(&dir.path().join("nope.mp4")).await;
        assert!(matches!(result, Err(StreamError::NotFound(_))));
    }
}
