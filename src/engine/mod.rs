// Mirror engine: download bookkeeping, on-disk layout, version state and the run pipeline.

pub mod downloader;
pub mod layout;
pub mod pipeline;
pub mod stats;
pub mod version;
