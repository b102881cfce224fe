//! Configuration loading, env substitution, and validation.
//!
//! Config files: `msgbridge.toml`, `msgbridge.yaml`, or `msgbridge.json`
//! Searched in `./` then `~/.config/msgbridge/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, data_dir, discover_and_load, find_config_file, load_config},
    schema::{BridgeConfig, DestinationConfig, MediaConfig, StoreConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
