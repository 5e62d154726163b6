// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `runflight`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runflight",
    version,
    about = "Run a command as a managed, cancellable child process.",
    long_about = None
)]
pub struct CliArgs {
    /// Command to run. Overrides `[run].cmd` from the config file.
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Runflight.toml` in the current working directory. A
    /// missing file is only an error when no COMMAND was given either.
    #[arg(long, value_name = "PATH", default_value = "Runflight.toml")]
    pub config: String,

    /// Abort the run after this many milliseconds.
    ///
    /// Overrides `[run].abort_after_ms` from the config file.
    #[arg(long, value_name = "MS")]
    pub abort_after_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNFLIGHT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve settings and print them, but don't execute the command.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
