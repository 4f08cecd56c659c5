// Single-asset downloader: fetch a remote path into the mirror unless it is already there.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use tracing::{debug, error, info, warn};

use super::stats::StatsCollector;
use crate::config::PART_SUFFIX;
use crate::source::traits::{AssetSource, AssetStream};

/// Result of one [`Downloader::fetch_and_store`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded { bytes: u64 },
    /// The destination already existed; no request was made.
    Skipped,
    /// The fetch or the write failed. Already logged and counted.
    Failed,
}

pub struct Downloader {
    source: Arc<dyn AssetSource>,
    stats: Arc<StatsCollector>,
}

impl Downloader {
    pub fn new(source: Arc<dyn AssetSource>, stats: Arc<StatsCollector>) -> Self {
        Self { source, stats }
    }

    pub fn stats(&self) -> &Arc<StatsCollector> {
        &self.stats
    }

    /// Mirror `path` from the source into `destination`.
    ///
    /// A local file at `destination` always wins: the call returns
    /// [`FetchOutcome::Skipped`] without touching the network. Failures are
    /// logged and recorded, never returned, so one bad asset cannot end a run.
    /// No retries.
    pub async fn fetch_and_store(&self, path: &str, destination: &Path) -> FetchOutcome {
        let url = self.source.url_for(path);
        match self.try_fetch_and_store(path, &url, destination).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("failed to download {}: {:#}", url, e);
                self.stats.record_failed(&url);
                FetchOutcome::Failed
            }
        }
    }

    async fn try_fetch_and_store(
        &self,
        path: &str,
        url: &str,
        destination: &Path,
    ) -> Result<FetchOutcome> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        if fs::try_exists(destination).await? {
            warn!("{} already exists, skipping", destination.display());
            self.stats.record_skipped();
            return Ok(FetchOutcome::Skipped);
        }

        let body = self.source.fetch_stream(path).await?;
        let bytes = write_via_part_file(body, destination).await?;

        self.stats.record_downloaded(bytes);
        info!("downloaded {} ({} bytes)", url, bytes);
        Ok(FetchOutcome::Downloaded { bytes })
    }
}

/// Stream `body` into `<destination>.part`, then rename it into place.
///
/// A transfer cut short leaves no file at `destination`, so the next run
/// fetches it again instead of skipping a truncated copy.
async fn write_via_part_file(body: AssetStream, destination: &Path) -> Result<u64> {
    let part = part_path(destination);
    let mut reader = StreamReader::new(body);
    let mut file = fs::File::create(&part)
        .await
        .with_context(|| format!("failed to create {}", part.display()))?;

    let copied = match tokio::io::copy(&mut reader, &mut file).await {
        Ok(n) => n,
        Err(e) => {
            drop(file);
            if let Err(re) = fs::remove_file(&part).await {
                debug!("could not remove {}: {}", part.display(), re);
            }
            return Err(e).context("response body interrupted");
        }
    };
    file.flush().await?;
    drop(file);

    fs::rename(&part, destination)
        .await
        .with_context(|| format!("failed to move {} into place", part.display()))?;
    Ok(copied)
}

fn part_path(destination: &Path) -> PathBuf {
    let mut part = destination.as_os_str().to_owned();
    part.push(PART_SUFFIX);
    PathBuf::from(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("client/v1/asset/pic.png")),
            Path::new("client/v1/asset/pic.png.part")
        );
    }
}
