use std::path::PathBuf;

use serde::Deserialize;

/// Origin the mirror scrapes when nothing else is configured.
pub const DEFAULT_ORIGIN: &str = "https://www.guilded.gg";

/// File in the working directory holding the last mirrored bundle identifier.
pub const STATE_FILE_NAME: &str = "CURRENT_BUNDLE_ID.txt";

/// Root directory under which each bundle gets its own mirror tree.
pub const CLIENT_DIR: &str = "client";

/// Suffix for in-flight downloads; renamed away once the body is complete.
pub const PART_SUFFIX: &str = ".part";

/// Exit status reported when the deployed bundle matches the recorded one.
pub const UP_TO_DATE_EXIT_CODE: u8 = 3;

/// Top-level configuration for a mirror run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Scheme and host the assets are fetched from, without a trailing slash.
    pub origin: String,
    /// Directory that receives `<bundleId>/...` trees.
    pub output_root: PathBuf,
    /// Location of the persisted bundle identifier.
    pub state_file: PathBuf,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            output_root: PathBuf::from(CLIENT_DIR),
            state_file: PathBuf::from(STATE_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: MirrorConfig =
            serde_json::from_str(r#"{"origin": "http://127.0.0.1:8080"}"#).unwrap();
        assert_eq!(config.origin, "http://127.0.0.1:8080");
        assert_eq!(config.output_root, PathBuf::from("client"));
        assert_eq!(config.state_file, PathBuf::from("CURRENT_BUNDLE_ID.txt"));
    }
}
