use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use audition_runner::cli::CliArgs;
use audition_runner::config::loader::DEFAULT_CONFIG_FILE;
use audition_runner::config::{EnvSnapshot, Settings, load_and_validate, load_or_default};
use audition_runner::errors::AuditionError;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = config_file(
        r#"
[engine]
program = "sclang"
script = "audition.scd"
kill_before_run = []
extra_args = ["-u", "57120"]

[discovery]
dir = "defs"
pattern = "*.scsyndef"

[capture]
enabled = false
device = "BlackHole 2ch"
sample_rate = 44100
channels = 1

[timeouts]
run_secs = 4.5
terminate_wait_secs = 1
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.engine.program, "sclang");
    assert_eq!(cfg.engine.extra_args, vec!["-u", "57120"]);
    assert!(cfg.engine.kill_before_run.is_empty());
    assert_eq!(cfg.discovery.pattern, "*.scsyndef");
    assert_eq!(cfg.capture.device.as_deref(), Some("BlackHole 2ch"));
    assert_eq!(cfg.capture.sample_rate, 44100);
    assert_eq!(cfg.timeouts.run_secs, 4.5);
    assert_eq!(cfg.timeouts.terminate_wait_secs, 1.0);
    // Untouched keys keep their defaults.
    assert_eq!(cfg.timeouts.kill_wait_secs, 2.0);
}

#[test]
fn invalid_toml_is_a_toml_error() {
    let file = config_file("[engine\nprogram = ");
    assert!(matches!(load_and_validate(file.path()), Err(AuditionError::TomlError(_))));
}

#[test]
fn non_positive_timeout_is_rejected() {
    let file = config_file("[timeouts]\nrun_secs = 0\n");
    match load_and_validate(file.path()) {
        Err(AuditionError::ConfigError(msg)) => assert!(msg.contains("run_secs"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn huge_timeout_is_rejected_before_resolving() {
    let file = config_file("[timeouts]\nrun_secs = 1e20\n");
    match load_and_validate(file.path()) {
        Err(AuditionError::ConfigError(msg)) => assert!(msg.contains("run_secs"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn bad_discovery_pattern_is_rejected() {
    let file = config_file("[discovery]\npattern = \"[\"\n");
    assert!(matches!(load_and_validate(file.path()), Err(AuditionError::ConfigError(_))));
}

#[test]
fn missing_explicit_config_is_an_io_error() {
    let result = load_or_default(Some(Path::new("/definitely/missing/Audition.toml")), Path::new("/"));
    assert!(matches!(result, Err(AuditionError::IoError(_))));
}

#[test]
fn defaults_apply_without_a_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let (cfg, root) = load_or_default(None, dir.path()).unwrap();

    assert_eq!(root, dir.path());
    assert_eq!(cfg.timeouts.run_secs, 10.0);
    assert_eq!(cfg.discovery.pattern, "*.scd");
}

#[test]
fn config_in_working_directory_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[timeouts]\nrun_secs = 3\n").unwrap();

    let (cfg, root) = load_or_default(None, dir.path()).unwrap();
    assert_eq!(cfg.timeouts.run_secs, 3.0);

    let settings = Settings::resolve(&cfg, &root, EnvSnapshot::default(), &CliArgs::default());
    assert_eq!(settings.timeout, Duration::from_secs(3));
    assert_eq!(settings.discovery.dir, dir.path().join("synths"));
}

#[test]
fn explicit_config_anchors_paths_at_its_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("runner");
    std::fs::create_dir(&nested).unwrap();
    let path = nested.join("custom.toml");
    std::fs::write(&path, "[engine]\nruntime_dir = \"state\"\n").unwrap();

    let (cfg, root) = load_or_default(Some(&path), dir.path()).unwrap();
    let settings = Settings::resolve(&cfg, &root, EnvSnapshot::default(), &CliArgs::default());
    assert_eq!(settings.engine.runtime_dir, PathBuf::from(nested.join("state")));
}
