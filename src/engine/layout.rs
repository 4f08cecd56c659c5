// On-disk mirror layout: where each remote path lands under `client/<bundleId>/`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::config::PART_SUFFIX;
use crate::detect::bundle::{is_safe_relative_path, BundleId};

pub struct MirrorLayout {
    root: PathBuf,
    bundle_id: BundleId,
}

impl MirrorLayout {
    pub fn new(output_root: &Path, bundle_id: &BundleId) -> Self {
        Self {
            root: output_root.join(bundle_id.as_str()),
            bundle_id: bundle_id.clone(),
        }
    }

    /// `client/<bundleId>`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry artifacts (`index.html`, root `bundle.js`) sit directly under the root.
    pub fn entry_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// `client/<bundleId>/<bundleId>`, home of the versioned bundle and its chunks.
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(self.bundle_id.as_str())
    }

    pub fn versioned_bundle_path(&self) -> PathBuf {
        self.scripts_dir().join("bundle.js")
    }

    /// Remote path of a chunk script.
    pub fn chunk_remote_path(&self, chunk: &str) -> String {
        format!("/{}/{}.js", self.bundle_id, chunk)
    }

    /// Local path of a chunk script, or `None` if the name would escape the tree.
    pub fn chunk_path(&self, chunk: &str) -> Option<PathBuf> {
        if !is_safe_relative_path(chunk) {
            return None;
        }
        Some(self.scripts_dir().join(format!("{}.js", chunk)))
    }

    /// Local path mirroring a remote `/asset/...` or `/fonts/...` reference.
    pub fn asset_path(&self, reference: &str) -> Option<PathBuf> {
        if !is_safe_relative_path(reference) {
            return None;
        }
        Some(self.root.join(reference.trim_start_matches('/')))
    }

    pub async fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create {}", self.root.display()))
    }

    /// Read every script under [`Self::scripts_dir`] as text, in path order.
    ///
    /// Subdirectories are walked too, since chunk names may contain `/`.
    /// Files left over from earlier runs are included; unfinished `.part`
    /// downloads are not.
    pub async fn read_scripts(&self) -> Result<Vec<String>> {
        let mut pending = vec![self.scripts_dir()];
        let mut paths = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to list {}", dir.display()))
                }
            };

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() && !path.to_string_lossy().ends_with(PART_SUFFIX) {
                    paths.push(path);
                }
            }
        }
        paths.sort();

        let mut scripts = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            scripts.push(String::from_utf8_lossy(&bytes).into_owned());
        }
        Ok(scripts)
    }
}
