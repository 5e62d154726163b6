// src/config/mod.rs

//! Configuration loading for `runflight`.
//!
//! - [`model`] holds the raw TOML shape.
//! - [`loader`] reads, deserializes and validates it.

pub mod loader;
pub mod model;

pub use loader::{default_config_path, load_and_validate, load_from_path, validate_config};
pub use model::{ConfigFile, RunSection};
