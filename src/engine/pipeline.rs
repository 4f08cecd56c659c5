// Mirror run state machine: root page -> bundle -> chunks -> assets -> version commit.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use super::downloader::Downloader;
use super::layout::MirrorLayout;
use super::stats::{StatsCollector, StatsSnapshot};
use super::version::{is_new_version, VersionStore};
use crate::config::{MirrorConfig, UP_TO_DATE_EXIT_CODE};
use crate::detect::bundle::{locate_bundle, BundleId};
use crate::detect::references::{
    extract_asset_paths, extract_chunk_ids, extract_font_paths, is_directory_placeholder,
};
use crate::source::http_source::HttpSource;
use crate::source::traits::AssetSource;

/// Stages of a run, entered strictly in declaration order (see [`Stage::next`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchRootPage,
    LocateBundle,
    FetchBundleScript,
    CheckVersion,
    PrepareDirectory,
    FetchEntryAssets,
    ExtractChunkMap,
    FetchChunks,
    ReadBackChunks,
    ExtractAssetsAndFonts,
    FetchAssetsAndFonts,
    CommitVersion,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::FetchRootPage => "fetch-root-page",
            Stage::LocateBundle => "locate-bundle",
            Stage::FetchBundleScript => "fetch-bundle-script",
            Stage::CheckVersion => "check-version",
            Stage::PrepareDirectory => "prepare-directory",
            Stage::FetchEntryAssets => "fetch-entry-assets",
            Stage::ExtractChunkMap => "extract-chunk-map",
            Stage::FetchChunks => "fetch-chunks",
            Stage::ReadBackChunks => "read-back-chunks",
            Stage::ExtractAssetsAndFonts => "extract-assets-and-fonts",
            Stage::FetchAssetsAndFonts => "fetch-assets-and-fonts",
            Stage::CommitVersion => "commit-version",
        }
    }

    /// The stage that follows this one, `None` after the commit.
    pub fn next(self) -> Option<Stage> {
        let next = match self {
            Stage::FetchRootPage => Stage::LocateBundle,
            Stage::LocateBundle => Stage::FetchBundleScript,
            Stage::FetchBundleScript => Stage::CheckVersion,
            Stage::CheckVersion => Stage::PrepareDirectory,
            Stage::PrepareDirectory => Stage::FetchEntryAssets,
            Stage::FetchEntryAssets => Stage::ExtractChunkMap,
            Stage::ExtractChunkMap => Stage::FetchChunks,
            Stage::FetchChunks => Stage::ReadBackChunks,
            Stage::ReadBackChunks => Stage::ExtractAssetsAndFonts,
            Stage::ExtractAssetsAndFonts => Stage::FetchAssetsAndFonts,
            Stage::FetchAssetsAndFonts => Stage::CommitVersion,
            Stage::CommitVersion => return None,
        };
        Some(next)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A new bundle was mirrored and recorded.
    Mirrored {
        bundle_id: BundleId,
        summary: StatsSnapshot,
    },
    /// The deployed bundle is the one already recorded; nothing was touched.
    UpToDate { bundle_id: BundleId },
}

impl RunOutcome {
    /// Process exit status for this outcome. Failed runs exit with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Mirrored { .. } => 0,
            RunOutcome::UpToDate { .. } => UP_TO_DATE_EXIT_CODE,
        }
    }
}

/// Position of one run in the [`Stage`] sequence.
#[derive(Debug, Default)]
struct StageCursor {
    current: Option<Stage>,
}

impl StageCursor {
    /// Move to `stage`, which must directly follow the current one.
    fn enter(&mut self, stage: Stage) -> Result<()> {
        let expected = match self.current {
            None => Some(Stage::FetchRootPage),
            Some(current) => current.next(),
        };
        if expected != Some(stage) {
            bail!(
                "stage {} entered out of order, expected {}",
                stage,
                expected.map_or("none", Stage::as_str)
            );
        }
        debug!(stage = stage.as_str(), "entering stage");
        self.current = Some(stage);
        Ok(())
    }
}

pub struct Mirror {
    config: MirrorConfig,
    source: Arc<dyn AssetSource>,
    versions: VersionStore,
}

impl Mirror {
    pub fn new(config: MirrorConfig, source: Arc<dyn AssetSource>) -> Self {
        let versions = VersionStore::new(config.state_file.clone());
        Self {
            config,
            source,
            versions,
        }
    }

    /// Mirror over HTTP from `config.origin`.
    pub fn from_config(config: MirrorConfig) -> Result<Self> {
        let source = Arc::new(HttpSource::new(&config.origin)?);
        Ok(Self::new(config, source))
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Run every stage once.
    ///
    /// Missing bundle or chunk-map markers return an error before the
    /// version is committed, so a later run retries the same bundle.
    /// Individual download failures only show up in the summary.
    pub async fn run(&self) -> Result<RunOutcome> {
        let stats = Arc::new(StatsCollector::new());
        let downloader = Downloader::new(Arc::clone(&self.source), Arc::clone(&stats));
        let mut stages = StageCursor::default();

        stages.enter(Stage::FetchRootPage)?;
        let root_page = self.source.fetch_text("/").await?;

        stages.enter(Stage::LocateBundle)?;
        let bundle = locate_bundle(&root_page)?;
        info!("found bundle {} at {}", bundle.id, bundle.script_path);

        stages.enter(Stage::FetchBundleScript)?;
        let bundle_text = self.source.fetch_text(&bundle.script_path).await?;

        stages.enter(Stage::CheckVersion)?;
        let previous = self.versions.load().await?;
        if !is_new_version(&previous, bundle.id.as_str()) {
            return Ok(RunOutcome::UpToDate {
                bundle_id: bundle.id,
            });
        }
        info!(
            "new bundle {} (previous {:?})",
            bundle.id,
            if previous.is_empty() { "none" } else { previous.as_str() }
        );

        stages.enter(Stage::PrepareDirectory)?;
        let layout = MirrorLayout::new(&self.config.output_root, &bundle.id);
        layout.prepare().await?;

        stages.enter(Stage::FetchEntryAssets)?;
        downloader
            .fetch_and_store("/index.html", &layout.entry_path("index.html"))
            .await;
        downloader
            .fetch_and_store("/bundle.js", &layout.entry_path("bundle.js"))
            .await;
        downloader
            .fetch_and_store(&bundle.script_path, &layout.versioned_bundle_path())
            .await;

        stages.enter(Stage::ExtractChunkMap)?;
        let chunks = extract_chunk_ids(&bundle_text)?;
        info!("chunk map lists {} scripts", chunks.len());

        stages.enter(Stage::FetchChunks)?;
        for chunk in &chunks {
            match layout.chunk_path(chunk) {
                Some(destination) => {
                    downloader
                        .fetch_and_store(&layout.chunk_remote_path(chunk), &destination)
                        .await;
                }
                None => warn!("ignoring chunk with unsafe name {:?}", chunk),
            }
        }

        stages.enter(Stage::ReadBackChunks)?;
        let scripts = layout.read_scripts().await?;
        debug!("read back {} scripts", scripts.len());

        stages.enter(Stage::ExtractAssetsAndFonts)?;
        let assets = extract_asset_paths(&scripts);
        let fonts = extract_font_paths(&scripts);
        info!("found {} assets and {} fonts", assets.len(), fonts.len());

        stages.enter(Stage::FetchAssetsAndFonts)?;
        for reference in assets.iter().chain(fonts.iter()) {
            if is_directory_placeholder(reference) {
                debug!("skipping directory placeholder {}", reference);
                continue;
            }
            match layout.asset_path(reference) {
                Some(destination) => {
                    downloader.fetch_and_store(reference, &destination).await;
                }
                None => warn!("ignoring unsafe reference {:?}", reference),
            }
        }

        stages.enter(Stage::CommitVersion)?;
        self.versions.commit(&bundle.id).await?;

        let summary = stats.snapshot();
        info!(
            "mirrored bundle {}: downloaded={} ({} bytes) skipped={} failed={}",
            bundle.id,
            summary.downloaded_files,
            summary.downloaded_bytes,
            summary.skipped_files,
            summary.failed_files
        );
        Ok(RunOutcome::Mirrored {
            bundle_id: bundle.id,
            summary,
        })
    }
}
