use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use audition_runner::discover::TargetDiscoverer;
use audition_runner::fs::RealFileSystem;

fn touch(dir: &Path, name: &str, modified: SystemTime) {
    let file = File::create(dir.join(name)).unwrap();
    file.set_modified(modified).unwrap();
}

#[test]
fn newest_matching_file_wins_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();

    touch(dir.path(), "pad.scd", now - Duration::from_secs(300));
    touch(dir.path(), "bass.scd", now - Duration::from_secs(10));
    touch(dir.path(), "readme.md", now);
    touch(dir.path(), ".scratch.scd", now);
    fs::create_dir(dir.path().join("newer.scd")).unwrap();

    let discoverer = TargetDiscoverer::new(dir.path(), "*.scd").unwrap();
    assert_eq!(discoverer.latest(&RealFileSystem).as_deref(), Some("bass"));
}

#[test]
fn touching_an_older_file_changes_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    touch(dir.path(), "pad.scd", now - Duration::from_secs(300));
    touch(dir.path(), "bass.scd", now - Duration::from_secs(10));

    let discoverer = TargetDiscoverer::new(dir.path(), "*.scd").unwrap();
    assert_eq!(discoverer.latest(&RealFileSystem).as_deref(), Some("bass"));

    touch(dir.path(), "pad.scd", now);
    assert_eq!(discoverer.latest(&RealFileSystem).as_deref(), Some("pad"));
}

#[test]
fn missing_directory_has_no_target() {
    let dir = tempfile::tempdir().unwrap();
    let discoverer = TargetDiscoverer::new(dir.path().join("synths"), "*.scd").unwrap();
    assert_eq!(discoverer.latest(&RealFileSystem), None);
}
