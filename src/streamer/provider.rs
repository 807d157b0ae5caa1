//! Media source provider
//!
//! Opens the right `MediaSource` for a media URL: HTTP(S) upstreams through
//! a shared reqwest client, `file://` URLs from local disk.

use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

use super::file::FileSource;
use super::source::MediaSource;
use super::upstream::HttpSource;
use crate::config::StreamConfig;
use crate::error::{StreamError, StreamResult};

/// Resolves media URLs to open sources
#[derive(Debug, Clone)]
pub struct MediaProvider {
    client: reqwest::Client,
    header_timeout: Duration,
}

impl MediaProvider {
    pub fn new(config: &StreamConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.upstream_connect_timeout))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            header_timeout: Duration::from_secs(config.upstream_header_timeout),
        })
    }

    /// Open `url`, asking the transport to start at `start_hint` when it can.
    ///
    /// The returned source may still sit at offset 0; callers position it
    /// with `seek_to`.
    pub async fn open(&self, url: &str, start_hint: u64) -> StreamResult<Box<dyn MediaSource>> {
        match Location::parse(url)? {
            Location::Remote => {
                let source =
                    HttpSource::open(&self.client, url, start_hint, self.header_timeout).await?;
                Ok(Box::new(source))
            }
            Location::Local(path) => Ok(Box::new(FileSource::open(&path).await?)),
        }
    }

    /// Open `url` for a HEAD response: headers only, no body transfer.
    ///
    /// Remote sources are asked with HEAD. An upstream that refuses HEAD or
    /// leaves out the length gets the regular GET instead.
    pub async fn open_headers(
        &self,
        url: &str,
        start_hint: u64,
    ) -> StreamResult<Box<dyn MediaSource>> {
        match Location::parse(url)? {
            Location::Remote => {
                match HttpSource::inspect(&self.client, url, self.header_timeout).await {
                    Ok(source) if source.total_length().is_some() => return Ok(Box::new(source)),
                    Ok(_) => tracing::debug!(url, "HEAD reply without length, falling back to GET"),
                    Err(StreamError::UpstreamFetchFailed(reason)) => {
                        tracing::debug!(url, %reason, "HEAD refused, falling back to GET");
                    }
                    Err(e) => return Err(e),
                }
                self.open(url, start_hint).await
            }
            Location::Local(path) => Ok(Box::new(FileSource::open(&path).await?)),
        }
    }
}

enum Location {
    Remote,
    Local(PathBuf),
}

impl Location {
    fn parse(url: &str) -> StreamResult<Self> {
        let parsed = Url::parse(url).map_err(|e| {
            StreamError::UpstreamFetchFailed(format!("invalid media URL '{url}': {e}"))
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(Self::Remote),
            "file" => parsed.to_file_path().map(Self::Local).map_err(|()| {
                StreamError::UpstreamFetchFailed(format!("invalid file URL '{url}'"))
            }),
            other => Err(StreamError::UpstreamFetchFailed(format!(
                "unsupported media URL scheme '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MediaProvider {
        MediaProvider::new(&StreamConfig::default(), "kiach-test").unwrap()
    }

    #[tokio::test]
    async fn test_opens_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm");
        std::fs::write(&path, vec![7u8; 64]).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let source = provider().open(url.as_str(), 0).await.unwrap();
        assert_eq!(source.total_length(), Some(64));
        assert_eq!(source.content_type(), Some("video/webm"));
    }

    #[tokio::test]
    async fn test_headers_only_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![1u8; 32]).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let source = provider().open_headers(url.as_str(), 0).await.unwrap();
        assert_eq!(source.total_length(), Some(32));
    }

    #[tokio::test]
    async fn test_rejects_unknown_scheme() {
        let result = provider().open("ftp://example.com/a.mp4", 0).await;
        assert!(matches!(result, Err(StreamError::UpstreamFetchFailed(_))));
    }

    #[tokio::test]
    async fn test_rejects_garbage_url() {
        let result = provider().open("not a url", 0).await;
        assert!(matches!(result, Err(StreamError::UpstreamFetchFailed(_))));
    }
}
