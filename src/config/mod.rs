//! Layered configuration
//!
//! Implements the 3-layer configuration merge:
//! 1. Built-in defaults
//! 2. Config file (`--config`, else `$CLIENTKIT_CONFIG`)
//! 3. CLI flags

mod defaults;
mod effective;

pub use defaults::BuiltinDefaults;
pub use effective::{
    check_max_depth, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig,
    MAX_DEPTH_CEILING, SCHEMA_ID, SCHEMA_VERSION,
};

use std::env;
use std::path::PathBuf;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "CLIENTKIT_CONFIG";

/// Resolve the config file path: explicit path first, then the environment.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}
