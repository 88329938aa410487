// src/lib.rs

pub mod capture;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod runner;
pub mod supervise;
pub mod types;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::capture::FfmpegSidecar;
use crate::cli::CliArgs;
use crate::config::{EnvSnapshot, Settings, load_or_default};
use crate::discover::TargetDiscoverer;
use crate::engine::EngineCommand;
use crate::fs::{FileSystem, RealFileSystem};
use crate::runner::Runner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + environment/CLI layering
/// - the capture sidecar
/// - the supervised runner
///
/// Returns the exit status the process should end with.
pub async fn run(args: CliArgs, env: EnvSnapshot) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    run_in(args, env, &cwd, &mut io::stdout()).await
}

/// Same as [`run`], with an explicit working directory and a writer for the
/// dry-run output.
pub async fn run_in(
    args: CliArgs,
    env: EnvSnapshot,
    cwd: &Path,
    out: &mut impl Write,
) -> Result<i32> {
    let config_path = args.config.as_deref().map(Path::new);
    let (cfg, root) = load_or_default(config_path, cwd)?;
    let settings = Settings::resolve(&cfg, &root, env, &args);

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.dry_run {
        print_dry_run(&settings, fs.as_ref(), out)?;
        return Ok(0);
    }

    let sidecar = FfmpegSidecar::new(Arc::clone(&fs));
    let mut runner = Runner::new(settings, fs, sidecar);
    let report = runner.run().await?;

    debug!(?report, "run report");
    Ok(report.exit_code)
}

/// Simple dry-run output: resolved settings, target and engine command.
pub fn print_dry_run(
    settings: &Settings,
    fs: &dyn FileSystem,
    out: &mut impl Write,
) -> io::Result<()> {
    let label = settings.only.clone().or_else(|| {
        TargetDiscoverer::new(&settings.discovery.dir, &settings.discovery.pattern)
            .ok()
            .and_then(|d| d.latest(fs))
    });
    let command = EngineCommand::from_settings(settings, label.as_deref());

    writeln!(out, "audition-runner dry-run")?;
    writeln!(out, "  root = {}", settings.root.display())?;
    writeln!(out, "  timeout = {:.1}s", settings.timeout.as_secs_f64())?;
    writeln!(
        out,
        "  escalation = SIGTERM +{:.1}s, SIGKILL +{:.1}s",
        settings.escalation.terminate_wait.as_secs_f64(),
        settings.escalation.kill_wait.as_secs_f64()
    )?;
    writeln!(out, "  debug = {}", settings.debug)?;
    match &label {
        Some(label) => writeln!(out, "  target = {label}")?,
        None => writeln!(out, "  target = (engine default)")?,
    }
    if !settings.engine.kill_before_run.is_empty() {
        writeln!(out, "  kill before run: {:?}", settings.engine.kill_before_run)?;
    }
    writeln!(out)?;

    writeln!(out, "engine:")?;
    writeln!(out, "  cmd: {command}")?;
    writeln!(out, "  runtime dir: {}", settings.engine.runtime_dir.display())?;
    writeln!(out)?;

    let capture = &settings.capture;
    writeln!(out, "capture:")?;
    writeln!(out, "  enabled: {}", capture.enabled)?;
    writeln!(out, "  tool: {}", capture.tool)?;
    writeln!(out, "  device: {:?}", capture.device)?;
    match crate::capture::ffmpeg::effective_input_format(capture) {
        Some(format) => writeln!(out, "  input format: {format}")?,
        None => writeln!(out, "  input format: (none for platform '{}')", capture.platform)?,
    }
    writeln!(out, "  dir: {}", capture.dir.display())?;

    debug!("dry-run complete (no execution)");
    Ok(())
}
