// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::config::model::ConfigFile;

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform
/// semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[run].cmd` is a non-empty command
/// - `[run].abort_after_ms`, when set, is `>= 1`
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.run.cmd.trim().is_empty() {
        return Err(anyhow!("[run].cmd must be a non-empty command"));
    }

    if cfg.run.abort_after_ms == Some(0) {
        return Err(anyhow!("[run].abort_after_ms must be >= 1 (got 0)"));
    }

    Ok(())
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Runflight.toml` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Runflight.toml")
}
