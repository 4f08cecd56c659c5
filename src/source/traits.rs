use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

/// Response body of an asset, yielded piece by piece.
pub type AssetStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Read access to the origin being mirrored. Paths always start with `/`.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Absolute URL for `path`, used for fetching and for log lines.
    fn url_for(&self, path: &str) -> String;

    /// Fetch `path` as text. Non-success statuses are errors.
    async fn fetch_text(&self, path: &str) -> Result<String>;

    /// Fetch `path` as a byte stream. Non-success statuses are errors.
    async fn fetch_stream(&self, path: &str) -> Result<AssetStream>;
}
