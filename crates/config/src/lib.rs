//! Configuration loading, env substitution, environment overrides and
//! validation.
//!
//! Config files: `chatlabs.toml`, `chatlabs.yaml` or `chatlabs.json`,
//! searched in `./` then `~/.config/chatlabs/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, config_dir, data_dir, discover_and_load, find_or_default_config_path,
        load_config, set_config_dir, set_data_dir,
    },
    schema::{
        AuthConfig, ChatLabsConfig, DatabaseConfig, FeaturesConfig, ImageGenerationConfig,
        LimitsConfig, ServerConfig, ShareConfig, StorageConfig,
    },
    validate::{Diagnostic, Severity, validate},
};
