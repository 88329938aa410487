#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use audition_runner::cli::CliArgs;
use audition_runner::config::EnvSnapshot;
use audition_runner::config::env::ENV_ONLY;
use audition_runner::run_in;
use audition_runner_test_utils::init_tracing;

const CONFIG: &str = r#"
[engine]
program = "bin/engine"
kill_before_run = []

[capture]
device = "default"
input_format = "pulse"
"#;

/// Config, a synth to discover, and an engine stub that leaves a marker
/// behind if it is ever started.
fn project(root: &Path) -> String {
    let bin = root.join("bin");
    fs::create_dir(&bin).unwrap();
    let engine = bin.join("engine");
    fs::write(&engine, format!("#!/bin/sh\ntouch '{}'\n", root.join("launched").display())).unwrap();
    fs::set_permissions(&engine, fs::Permissions::from_mode(0o755)).unwrap();

    fs::create_dir(root.join("synths")).unwrap();
    fs::write(root.join("synths").join("lead.scd"), "").unwrap();

    let config = root.join("Audition.toml");
    fs::write(&config, CONFIG).unwrap();
    config.to_string_lossy().into_owned()
}

#[tokio::test]
async fn dry_run_prints_resolved_command_without_launching() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let config = project(root);

    let args = CliArgs {
        config: Some(config),
        dry_run: true,
        ..CliArgs::default()
    };
    let mut out = Vec::new();
    let code = run_in(args, EnvSnapshot::default(), root, &mut out).await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(code, 0);
    assert!(out.contains("  target = lead\n"), "{out}");
    let cmd = format!(
        "  cmd: {} -D -d {}",
        root.join("bin/engine").display(),
        root.join("runner/runtime").display()
    );
    assert!(out.contains(&cmd), "missing `{cmd}` in:\n{out}");
    assert!(out.contains("  input format: pulse\n"), "{out}");

    assert!(!root.join("launched").exists(), "engine was started");
    assert!(!root.join("runner/runtime").exists(), "runtime dir was created");
}

#[tokio::test]
async fn dry_run_target_follows_environment_override() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    project(root);

    let args = CliArgs {
        dry_run: true,
        ..CliArgs::default()
    };
    let env = EnvSnapshot::from_pairs([(ENV_ONLY, "pad")]);
    let mut out = Vec::new();
    let code = run_in(args, env, root, &mut out).await.unwrap();
    let out = String::from_utf8(out).unwrap();

    // `Audition.toml` in the working directory is picked up without --config.
    assert_eq!(code, 0);
    assert!(out.contains("  target = pad\n"), "{out}");
    assert!(out.contains("  input format: pulse\n"), "{out}");
    assert!(!root.join("launched").exists());
}
