use std::fmt;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::error::MirrorError;

const BUNDLE_FILE_SUFFIX: &str = "/bundle.js";

static BUNDLE_SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<script[^>]*?\bsrc="([^"]+/bundle\.js)""#).expect("bundle script pattern")
});

/// Identifier of one deployed build: the path between the origin and `/bundle.js`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleId(String);

impl BundleId {
    /// Derive the id from a bundle script path such as `/abc123/bundle.js`.
    ///
    /// Empty ids and ids with `.` or `..` segments are rejected, since the id
    /// becomes a directory name.
    pub fn from_script_path(script_path: &str) -> Option<Self> {
        let id = script_path
            .strip_suffix(BUNDLE_FILE_SUFFIX)?
            .trim_matches('/');
        if id.is_empty() || !is_safe_relative_path(id) {
            return None;
        }
        Some(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the versioned bundle script on the origin.
    pub fn script_path(&self) -> String {
        format!("/{}{}", self.0, BUNDLE_FILE_SUFFIX)
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The bundle script referenced by the root page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLocation {
    /// Path on the origin, always starting with `/`.
    pub script_path: String,
    pub id: BundleId,
}

/// Find the `<script>` tag whose `src` ends in `/bundle.js`.
///
/// Absolute `src` URLs are reduced to their path. The first matching tag wins.
pub fn locate_bundle(root_page_html: &str) -> Result<BundleLocation> {
    let src = BUNDLE_SCRIPT_RE
        .captures(root_page_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(MirrorError::BundleScriptNotFound)?;

    let script_path = match Url::parse(src) {
        Ok(url) => url.path().to_string(),
        Err(_) if src.starts_with('/') => src.to_string(),
        Err(_) => format!("/{}", src),
    };

    let id = BundleId::from_script_path(&script_path)
        .ok_or_else(|| MirrorError::InvalidBundleId(script_path.clone()))?;

    Ok(BundleLocation { script_path, id })
}

/// True when every `/`-separated segment of `path` is a plain name.
pub(crate) fn is_safe_relative_path(path: &str) -> bool {
    path.trim_start_matches('/')
        .split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_relative_path() {
        assert!(is_safe_relative_path("abc123"));
        assert!(is_safe_relative_path("/asset/img/a.png"));
        assert!(!is_safe_relative_path("../etc/passwd"));
        assert!(!is_safe_relative_path("asset/./a.png"));
        assert!(!is_safe_relative_path("asset//a.png"));
    }

    #[test]
    fn test_script_path_round_trip() {
        let id = BundleId::from_script_path("/abc123/bundle.js").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.script_path(), "/abc123/bundle.js");
    }
}
