//! Mirrors the static assets of a web client's current deployment.
//!
//! A run scrapes the root page for the bundle script, reads the chunk map
//! out of the bundle, pulls every chunk, then every `/asset/` and `/fonts/`
//! path the scripts mention, all into `client/<bundleId>/`. The last mirrored
//! bundle id is kept in `CURRENT_BUNDLE_ID.txt` so unchanged deployments are
//! skipped.

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod source;
pub mod telemetry;

pub use config::MirrorConfig;
pub use engine::pipeline::{Mirror, RunOutcome};
pub use error::MirrorError;
