// Persisted bundle identifier of the last mirrored deployment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use crate::detect::bundle::BundleId;

/// Single-file store for the last processed bundle id.
///
/// Only the pipeline's final stage calls [`VersionStore::commit`].
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded id, creating an empty state file on first use.
    ///
    /// Whitespace and slashes around the id are ignored, so `"/abc123\n"`
    /// reads back as `"abc123"`.
    pub async fn load(&self) -> Result<String> {
        let exists = fs::try_exists(&self.path)
            .await
            .with_context(|| format!("failed to stat {}", self.path.display()))?;
        if !exists {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&self.path, "")
                .await
                .with_context(|| format!("failed to create {}", self.path.display()))?;
            debug!("created empty state file {}", self.path.display());
        }

        let raw = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        Ok(raw.trim().trim_matches('/').to_string())
    }

    /// Overwrite the state file with `current`.
    pub async fn commit(&self, current: &BundleId) -> Result<()> {
        fs::write(&self.path, current.as_str())
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!("recorded bundle {} in {}", current, self.path.display());
        Ok(())
    }
}

/// Exact comparison of the recorded id against the deployed one.
pub fn is_new_version(previous: &str, current: &str) -> bool {
    previous != current
}
