use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::{Client, Response, Url};
use tracing::debug;

use super::traits::{AssetSource, AssetStream};
use crate::error::MirrorError;

/// Plain GET access to a single origin over a shared reqwest client.
pub struct HttpSource {
    client: Client,
    origin: String,
}

impl HttpSource {
    pub fn new(origin: &str) -> Result<Self> {
        Self::with_client(origin, Client::new())
    }

    pub fn with_client(origin: &str, client: Client) -> Result<Self> {
        let parsed = Url::parse(origin).map_err(|e| anyhow!("invalid origin {}: {}", origin, e))?;
        if parsed.host_str().is_none() {
            return Err(anyhow!("origin {} has no host", origin));
        }
        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url_for(path);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        debug!("http get status={} url={}", status.as_u16(), url);
        // Reported by the caller.
        if !status.is_success() {
            return Err(MirrorError::Status {
                url,
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            }
            .into());
        }
        Ok(resp)
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let text = self.get(path).await?.text().await?;
        Ok(text)
    }

    async fn fetch_stream(&self, path: &str) -> Result<AssetStream> {
        let resp = self.get(path).await?;
        let stream = resp
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::BrokenPipe, e.without_url()));
        Ok(Box::pin(stream))
    }
}
