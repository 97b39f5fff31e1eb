//! Pre-release version label handling.
//!
//! Release tags may carry a trailing pre-release component such as
//! `1.0.0.0a1`, `1.0.0.0b2` or `1.0.0.0rc1`. When collapsing is enabled the
//! notes attributed to those labels are folded into the final release they
//! led up to, provided that release was actually tagged.

use std::sync::OnceLock;

use regex::Regex;

/// What does a pre-release version number look like?
fn pre_release_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\.(\d+(?:[ab]|rc)+\d*)$").expect("pre-release pattern is valid")
    })
}

/// Return the trailing pre-release component of a version label, if any.
///
/// The component is the final dot-separated part when it consists of digits
/// around an `a`, `b` or `rc` marker (e.g. `0a1` in `1.0.0.0a1`).
pub fn pre_release_part(version: &str) -> Option<&str> {
    pre_release_re()
        .captures(version)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Strip the trailing pre-release component from a version label.
///
/// Returns the canonical final-release label (`1.0.0.0rc1` -> `1.0.0`), or
/// `None` when the label has no pre-release component.
pub fn strip_pre_release(version: &str) -> Option<String> {
    let part = pre_release_part(version)?;
    let stripped = &version[..version.len() - part.len()];
    Some(stripped.trim_end_matches('.').to_string())
}
