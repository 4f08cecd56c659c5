// Structural failures that abort a run, plus the HTTP status error used by sources.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    /// The root page has no `<script src=".../bundle.js">` tag.
    #[error("could not find bundle script in root page")]
    BundleScriptNotFound,

    /// The bundle script path does not yield a usable directory name.
    #[error("bundle script path {0:?} does not contain a usable bundle id")]
    InvalidBundleId(String),

    /// The bundle source has no webpack chunk-filename map.
    #[error("could not find chunk map in bundle source")]
    ChunkMapNotFound,

    /// The origin answered with a non-success status.
    #[error("HTTP {status} {reason} for {url}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },
}
