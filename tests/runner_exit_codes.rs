#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use audition_runner::engine::EngineCommand;
use audition_runner::fs::RealFileSystem;
use audition_runner::runner::Runner;
use audition_runner::types::{EXIT_NOT_FOUND, FinalState};
use audition_runner_test_utils::builders::{SettingsBuilder, sh_command};
use audition_runner_test_utils::recording_sidecar::{RecordingSidecar, SidecarEvent};
use audition_runner_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn engine_exit_code_is_returned() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsBuilder::new(dir.path())
        .timeout(Duration::from_secs(5))
        .build();

    let mut runner = Runner::new(settings, Arc::new(RealFileSystem), RecordingSidecar::new());
    let report = with_timeout(runner.run_with(|s, l| sh_command(s, l, "exit 3")))
        .await
        .unwrap();

    assert_eq!(report.exit_code, 3);
    assert_eq!(report.state, FinalState::ExitedNormally);
    assert!(report.signals_sent.is_empty());
    assert_eq!(report.label, None);

    // No target anywhere: the capture is named after the whole selection.
    let events = runner.sidecar().events();
    assert!(matches!(&events[0], SidecarEvent::Started { selection, .. } if selection == "all"));
    assert_eq!(runner.sidecar().stop_count(), 1);
}

#[tokio::test]
async fn sidecar_brackets_the_engine() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("engine-ran");
    let settings = SettingsBuilder::new(dir.path())
        .timeout(Duration::from_secs(5))
        .build();

    let sidecar = RecordingSidecar::new().with_marker(&marker);
    let mut runner = Runner::new(settings, Arc::new(RealFileSystem), sidecar);
    let script = format!("touch '{}'", marker.display());
    let report = with_timeout(runner.run_with(|s, l| sh_command(s, l, &script)))
        .await
        .unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(
        runner.sidecar().events(),
        vec![
            SidecarEvent::Started {
                selection: "all".to_string(),
                marker_existed: false,
            },
            SidecarEvent::Stopped { marker_existed: true },
        ]
    );
}

#[tokio::test]
async fn explicit_target_reaches_engine_environment() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsBuilder::new(dir.path())
        .timeout(Duration::from_secs(5))
        .only("pad")
        .build();

    let mut runner = Runner::new(settings, Arc::new(RealFileSystem), RecordingSidecar::new());
    let script = r#"[ "$AUDITION_ONLY" = pad ] && [ "$SC_AUDITION" = 1 ] || exit 9"#;
    let report = with_timeout(runner.run_with(|s, l| sh_command(s, l, script)))
        .await
        .unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.label.as_deref(), Some("pad"));
}

#[tokio::test]
async fn newest_artifact_becomes_the_target() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let synths = dir.path().join("synths");
    fs::create_dir(&synths).unwrap();

    let now = SystemTime::now();
    for (name, age) in [("bass.scd", 60), ("lead.scd", 5), ("notes.txt", 0)] {
        let file = fs::File::create(synths.join(name)).unwrap();
        file.set_modified(now - Duration::from_secs(age)).unwrap();
    }

    let settings = SettingsBuilder::new(dir.path())
        .timeout(Duration::from_secs(5))
        .discovery(&synths, "*.scd")
        .build();

    let mut runner = Runner::new(settings, Arc::new(RealFileSystem), RecordingSidecar::new());
    let script = r#"[ "$AUDITION_ONLY" = lead ] || exit 9"#;
    let report = with_timeout(runner.run_with(|s, l| sh_command(s, l, script)))
        .await
        .unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.label.as_deref(), Some("lead"));
    let events = runner.sidecar().events();
    assert!(matches!(&events[0], SidecarEvent::Started { selection, .. } if selection == "lead"));
}

#[tokio::test]
async fn missing_engine_exits_127_without_signals() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsBuilder::new(dir.path())
        .timeout(Duration::from_secs(5))
        .build();

    let mut runner = Runner::new(settings, Arc::new(RealFileSystem), RecordingSidecar::new());
    let report = with_timeout(runner.run_with(|s, l| EngineCommand {
        program: "/definitely/not/an/engine".to_string(),
        args: Vec::new(),
        env: EngineCommand::environment(s, l),
    }))
    .await
    .unwrap();

    assert_eq!(report.exit_code, EXIT_NOT_FOUND);
    assert_eq!(report.state, FinalState::LaunchFailed);
    assert!(report.signals_sent.is_empty());
    assert_eq!(runner.sidecar().stop_count(), 1);
}

#[tokio::test]
async fn non_executable_engine_exits_126() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let engine = dir.path().join("engine");
    fs::write(&engine, "not a program").unwrap();
    fs::set_permissions(&engine, fs::Permissions::from_mode(0o644)).unwrap();

    let settings = SettingsBuilder::new(dir.path())
        .timeout(Duration::from_secs(5))
        .build();

    let mut runner = Runner::new(settings, Arc::new(RealFileSystem), RecordingSidecar::new());
    let program = engine.to_string_lossy().into_owned();
    let report = with_timeout(runner.run_with(|s, l| EngineCommand {
        program,
        args: Vec::new(),
        env: EngineCommand::environment(s, l),
    }))
    .await
    .unwrap();

    assert_eq!(report.exit_code, 126);
    assert_eq!(report.state, FinalState::LaunchFailed);
}

#[tokio::test]
async fn runtime_directory_is_created_before_launch() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let runtime = dir.path().join("state").join("runtime");
    let settings = SettingsBuilder::new(dir.path())
        .timeout(Duration::from_secs(5))
        .runtime_dir(&runtime)
        .build();

    let mut runner = Runner::new(settings, Arc::new(RealFileSystem), RecordingSidecar::new());
    let script = format!("[ -d '{}' ] || exit 9", runtime.display());
    let report = with_timeout(runner.run_with(|s, l| sh_command(s, l, &script)))
        .await
        .unwrap();

    assert_eq!(report.exit_code, 0);
}
