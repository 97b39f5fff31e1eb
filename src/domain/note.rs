use std::path::Path;

use tracing::warn;

use crate::boundary::ScanWarning;

/// A note file as it appears in the scan output: its repository-relative
/// path and the commit that owns the reported content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub path: String,
    pub commit: String,
}

impl NoteEntry {
    pub fn new(path: impl Into<String>, commit: impl Into<String>) -> Self {
        NoteEntry {
            path: path.into(),
            commit: commit.into(),
        }
    }
}

/// Extract the stable unique id embedded in a note filename.
///
/// Two naming conventions exist and both must be supported indefinitely:
/// the modern form puts the 16 hex digits at the end (`slug-<16 hex>.yaml`),
/// the legacy form puts them at the front (`<16 hex>-slug.yaml`). The last
/// 16 characters of the stem are tried first; a `-` in that window means the
/// file uses the legacy form, so the first 16 characters are taken instead.
///
/// # Arguments
/// * `path` - Note file path; only the final component is examined
///
/// # Returns
/// The unique id token. Filenames shorter than 16 characters yield the whole
/// stem, matching how the original naming scheme degrades.
pub fn unique_id(path: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match base.rsplit_once('.') {
        Some((stem, _ext)) => stem.to_string(),
        None => base,
    };

    let chars: Vec<char> = stem.chars().collect();
    let tail_start = chars.len().saturating_sub(16);
    let tail: String = chars[tail_start..].iter().collect();
    if tail.contains('-') {
        // An older file with the unique id at the beginning of the name.
        chars.iter().take(16).collect()
    } else {
        tail
    }
}

/// Return whether the filename looks like a note file.
///
/// Only `*.yaml` files under the notes subdirectory are notes. Anything else
/// is reported once and ignored, rather than silently skipped, so stray files
/// in the notes tree are visible in the logs.
pub fn is_note_file(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    if path.ends_with(".yaml") {
        return true;
    }
    warn!(
        "{}",
        ScanWarning::IgnoredFile {
            path: path.to_string(),
        }
    );
    false
}
