use anyhow::Result;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MirrorError;

/// Remote prefix of static assets (images, sounds, etc).
pub const ASSET_PREFIX: &str = "/asset/";

/// Remote prefix of web fonts.
pub const FONT_PREFIX: &str = "/fonts/";

// Webpack's chunk filename lookup: `{return o.p+""+({5:"name",...}`.
static CHUNK_MAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{return [A-Za-z_$][\w$]*\.p\+""\+\(\{.+?\}"#).expect("chunk map pattern")
});

static CHUNK_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b\d+:"([^"]+)""#).expect("chunk entry pattern"));

static ASSET_RE: Lazy<Regex> = Lazy::new(|| prefixed_path_pattern(ASSET_PREFIX));

static FONT_RE: Lazy<Regex> = Lazy::new(|| prefixed_path_pattern(FONT_PREFIX));

// The prefix must open a string, a `url(` value or a list entry, so
// `https://cdn/asset/x` and `/static/asset/x` are not root references.
fn prefixed_path_pattern(prefix: &str) -> Regex {
    Regex::new(&format!(
        r#"(?:^|["'`(\s,])({}[^"'`?)\\]*)"#,
        regex::escape(prefix)
    ))
    .expect("prefixed path pattern")
}

/// Chunk file names from the bundle's chunk map, in map order.
///
/// Fails with [`MirrorError::ChunkMapNotFound`] when the map fragment is
/// missing. A present but empty map yields an empty set.
pub fn extract_chunk_ids(bundle_text: &str) -> Result<IndexSet<String>> {
    let block = CHUNK_MAP_RE
        .find(bundle_text)
        .ok_or(MirrorError::ChunkMapNotFound)?;

    Ok(CHUNK_ENTRY_RE
        .captures_iter(block.as_str())
        .map(|caps| caps[1].to_string())
        .collect())
}

/// Every `/asset/...` path referenced by `texts`, with `srcset` lists split.
pub fn extract_asset_paths<S: AsRef<str>>(texts: &[S]) -> IndexSet<String> {
    extract_prefixed(texts, &ASSET_RE, ASSET_PREFIX)
}

/// Every `/fonts/...` path referenced by `texts`.
pub fn extract_font_paths<S: AsRef<str>>(texts: &[S]) -> IndexSet<String> {
    extract_prefixed(texts, &FONT_RE, FONT_PREFIX)
}

/// A reference ending in `/` is a directory stub built up at runtime, not a file.
pub fn is_directory_placeholder(reference: &str) -> bool {
    reference.ends_with('/')
}

fn extract_prefixed<S: AsRef<str>>(texts: &[S], re: &Regex, prefix: &str) -> IndexSet<String> {
    let mut found = IndexSet::new();
    for text in texts {
        for caps in re.captures_iter(text.as_ref()) {
            // A raw match may be a descriptor list: "/a.png 1x, /a@2x.png 2x".
            let paths = caps[1]
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| token.starts_with(prefix));
            for path in paths {
                if !found.contains(path) {
                    found.insert(path.to_string());
                }
            }
        }
    }
    found
}
