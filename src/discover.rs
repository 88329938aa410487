// src/discover.rs

//! Default audition target discovery.
//!
//! Picks the most recently modified artifact in the discovery directory and
//! returns its file stem as the target label. Reads directory metadata only.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use globset::{Glob, GlobMatcher};
use tracing::{debug, trace};

use crate::errors::{AuditionError, Result};
use crate::fs::FileSystem;

#[derive(Debug, Clone)]
pub struct TargetDiscoverer {
    dir: PathBuf,
    matcher: GlobMatcher,
}

impl TargetDiscoverer {
    /// `pattern` is matched against bare file names (e.g. `*.scd`).
    pub fn new(dir: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern).map_err(|e| {
            AuditionError::ConfigError(format!("invalid discovery pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            dir: dir.into(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Label of the newest matching artifact, or `None`.
    ///
    /// A missing or unreadable directory yields `None`. Hidden files
    /// (leading `.`) are never candidates, even when the pattern matches.
    /// Among equal modification times the directory listing order decides.
    pub fn latest(&self, fs: &dyn FileSystem) -> Option<String> {
        if !fs.is_dir(&self.dir) {
            debug!(dir = %self.dir.display(), "discovery directory does not exist");
            return None;
        }

        let entries = match fs.read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "unable to list discovery directory");
                return None;
            }
        };

        let mut candidates: Vec<(SystemTime, PathBuf)> = entries
            .into_iter()
            .filter(|p| self.is_candidate(fs, p))
            .filter_map(|p| match fs.modified(&p) {
                Ok(mtime) => Some((mtime, p)),
                Err(e) => {
                    trace!(path = %p.display(), error = %e, "skipping entry without mtime");
                    None
                }
            })
            .collect();

        // Stable sort keeps listing order for ties.
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        candidates.into_iter().find_map(|(_, path)| label_for(&path))
    }

    fn is_candidate(&self, fs: &dyn FileSystem, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        !name.starts_with('.') && self.matcher.is_match(name) && fs.is_file(path)
    }
}

fn label_for(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let stem = stem.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn discoverer() -> TargetDiscoverer {
        TargetDiscoverer::new("/repo/synths", "*.scd").unwrap()
    }

    #[test]
    fn picks_newest_matching_file() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/synths/old.scd", 100);
        fs.add_file("/repo/synths/newest.scd", 300);
        fs.add_file("/repo/synths/middle.scd", 200);
        fs.add_file("/repo/synths/notes.txt", 999);

        assert_eq!(discoverer().latest(&fs).as_deref(), Some("newest"));
    }

    #[test]
    fn missing_directory_yields_none() {
        let fs = MockFileSystem::new();
        assert_eq!(discoverer().latest(&fs), None);
    }

    #[test]
    fn empty_directory_yields_none() {
        let fs = MockFileSystem::new();
        fs.add_dir("/repo/synths");
        assert_eq!(discoverer().latest(&fs), None);
    }

    #[test]
    fn blank_stems_are_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/synths/  .scd", 500);
        fs.add_file("/repo/synths/lead.scd", 100);

        assert_eq!(discoverer().latest(&fs).as_deref(), Some("lead"));
    }

    #[test]
    fn stems_are_trimmed() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/synths/ pad .scd", 1);
        assert_eq!(discoverer().latest(&fs).as_deref(), Some("pad"));
    }

    #[test]
    fn directories_matching_pattern_are_ignored() {
        let fs = MockFileSystem::new();
        fs.add_dir("/repo/synths/folder.scd");
        fs.add_file("/repo/synths/kick.scd", 1);
        assert_eq!(discoverer().latest(&fs).as_deref(), Some("kick"));
    }

    #[test]
    fn hidden_files_are_not_candidates() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/synths/.wip.scd", 900);
        fs.add_file("/repo/synths/pad.scd", 100);
        assert_eq!(discoverer().latest(&fs).as_deref(), Some("pad"));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        assert!(matches!(
            TargetDiscoverer::new("/x", "[oops"),
            Err(AuditionError::ConfigError(_))
        ));
    }
}
