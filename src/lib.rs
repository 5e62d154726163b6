// src/lib.rs

pub mod cli;
pub mod config;
pub mod coord;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod signal;

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_from_path, RunSection, validate_config};
use crate::coord::RunCoordinator;
use crate::signal::AbortSignal;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - CLI / config file resolution
/// - one coordinator for the resolved command
/// - a single abort signal fed by Ctrl-C and the optional deadline
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let coordinator = RunCoordinator::new(settings.id.clone(), settings.cmd.clone());
    let signal = AbortSignal::new();

    // Ctrl-C → abort the run.
    {
        let signal = signal.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            signal.abort();
        });
    }

    if let Some(ms) = settings.abort_after_ms {
        debug!(abort_after_ms = ms, "arming abort deadline");
        signal.abort_after(Duration::from_millis(ms));
    }

    coordinator.run(Some(&signal)).await?;
    info!(id = %settings.id, "run completed successfully");

    Ok(())
}

/// Merge CLI arguments over the config file.
///
/// - A positional COMMAND wins over `[run].cmd`.
/// - `--abort-after-ms` wins over `[run].abort_after_ms`.
/// - A missing config file is only an error when no COMMAND was given.
fn resolve_settings(args: &CliArgs) -> Result<RunSection> {
    let path = Path::new(&args.config);

    let mut run = if path.exists() {
        load_from_path(path)?.run
    } else if args.command.is_some() {
        RunSection::default()
    } else {
        return Err(anyhow!("no COMMAND given and no config file at {:?}", path));
    };

    if let Some(cmd) = &args.command {
        run.cmd = cmd.clone();
    }
    if let Some(ms) = args.abort_after_ms {
        run.abort_after_ms = Some(ms);
    }

    let cfg = ConfigFile { run };
    validate_config(&cfg)?;

    Ok(cfg.run)
}

/// Simple dry-run output: print the resolved run settings.
fn print_dry_run(run: &RunSection) {
    println!("runflight dry-run");
    println!("  id: {}", run.id);
    println!("  cmd: {}", run.cmd);
    match run.abort_after_ms {
        Some(ms) => println!("  abort_after_ms: {ms}"),
        None => println!("  abort_after_ms: (none; Ctrl-C only)"),
    }

    debug!("dry-run complete (no execution)");
}
