// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [run]
/// cmd = "cargo build"
/// abort_after_ms = 30000
/// id = "build"
/// ```
///
/// All fields except `cmd` are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Run settings from `[run]`.
    #[serde(default)]
    pub run: RunSection,
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// The command to execute.
    #[serde(default)]
    pub cmd: String,

    /// Trigger the run's abort signal after this many milliseconds.
    ///
    /// If unset, the run is only aborted by Ctrl-C.
    #[serde(default)]
    pub abort_after_ms: Option<u64>,

    /// Coordinator id used in logs.
    #[serde(default = "default_run_id")]
    pub id: String,
}

fn default_run_id() -> String {
    "run".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            cmd: String::new(),
            abort_after_ms: None,
            id: default_run_id(),
        }
    }
}
