// Per-run download accounting: files fetched, skipped and failed.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub downloaded_files: u64,
    pub downloaded_bytes: u64,
    pub skipped_files: u64,
    pub failed_files: u64,
    /// URLs that could not be fetched, in the order they failed.
    pub failed_urls: Vec<String>,
}

impl StatsSnapshot {
    /// Number of assets the downloader was asked for.
    pub fn attempted(&self) -> u64 {
        self.downloaded_files + self.skipped_files + self.failed_files
    }
}

pub struct StatsCollector {
    downloaded_files: AtomicU64,
    downloaded_bytes: AtomicU64,
    skipped_files: AtomicU64,
    failed_files: AtomicU64,
    failed_urls: Mutex<Vec<String>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            downloaded_files: AtomicU64::new(0),
            downloaded_bytes: AtomicU64::new(0),
            skipped_files: AtomicU64::new(0),
            failed_files: AtomicU64::new(0),
            failed_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn record_downloaded(&self, bytes: u64) {
        self.downloaded_files.fetch_add(1, Ordering::Relaxed);
        self.downloaded_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self, url: &str) {
        self.failed_files.fetch_add(1, Ordering::Relaxed);
        self.failed_urls.lock().push(url.to_string());
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            downloaded_files: self.downloaded_files.load(Ordering::Relaxed),
            downloaded_bytes: self.downloaded_bytes.load(Ordering::Relaxed),
            skipped_files: self.skipped_files.load(Ordering::Relaxed),
            failed_files: self.failed_files.load(Ordering::Relaxed),
            failed_urls: self.failed_urls.lock().clone(),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let stats = StatsCollector::new();
        stats.record_downloaded(1000);
        stats.record_downloaded(500);
        stats.record_skipped();
        stats.record_failed("https://example.test/asset/missing.png");

        let snap = stats.snapshot();
        assert_eq!(snap.downloaded_files, 2);
        assert_eq!(snap.downloaded_bytes, 1500);
        assert_eq!(snap.skipped_files, 1);
        assert_eq!(snap.failed_files, 1);
        assert_eq!(snap.attempted(), 4);
        assert_eq!(
            snap.failed_urls,
            vec!["https://example.test/asset/missing.png".to_string()]
        );
    }
}
