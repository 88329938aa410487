// src/capture/label.rs

use std::sync::LazyLock;

use regex::Regex;

/// Label used when sanitizing leaves nothing.
pub const FALLBACK_LABEL: &str = "audition";

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{Alphabetic}\p{Nd}_-]+").expect("valid regex"));

static HYPHEN_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Turn a target selection into a file-name-safe label.
///
/// Runs of anything other than letters, digits, `_` and `-` become a single
/// hyphen; leading and trailing hyphens are dropped.
pub fn sanitize_capture_label(value: &str) -> String {
    let replaced = DISALLOWED.replace_all(value, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&replaced, "-");
    let label = collapsed.trim_matches('-');
    if label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label.to_string()
    }
}
