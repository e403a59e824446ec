//! Effective configuration with full provenance
//!
//! The effective config captures the merged configuration plus
//! information about where each value came from.

use chrono::{DateTime, Utc};
use clientkit_env::StaticHost;
use clientkit_merge::{merge_layers, ArrayMerge, MergeError, MergeOptions, Value};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::defaults::BuiltinDefaults;

/// Schema version for effective config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "clientkit/effective_config@1";

/// Upper bound accepted for `merge.max_depth`
pub const MAX_DEPTH_CEILING: u64 = 4096;

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers
    pub fn build(
        config_path: Option<&Path>,
        cli_overrides: Option<serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Config file
        if let Some(path) = config_path {
            if path.exists() {
                let (value, digest) = Self::load_toml_file(path)?;
                debug!(path = %path.display(), digest = %digest, "Loaded config file");
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            } else {
                warn!(path = %path.display(), "Config file not found, skipping");
            }
        }

        // Layer 3: CLI overrides
        if let Some(cli) = cli_overrides {
            layers.push(Value::from(cli));
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        // Config layers replace arrays rather than merging them by index
        let options = MergeOptions::deep().with_arrays(ArrayMerge::Replace);
        let merged = merge_layers(options, &layers)?;

        Self::validate_config(&merged)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
        })
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let table: toml::Table = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_value(toml::Value::Table(table)), digest))
    }

    /// Convert a TOML value into a mergeable Value
    fn toml_to_value(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::from(i),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Sequence(arr.into_iter().map(Self::toml_to_value).collect())
            }
            toml::Value::Table(table) => Value::Record(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_value(v)))
                    .collect(),
            ),
        }
    }

    /// Validate configuration values
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        let merge = config.get("merge");

        if let Some(depth) = merge.and_then(|m| m.get("max_depth")) {
            let valid = depth.as_u64().map(check_max_depth);
            if !matches!(valid, Some(Ok(_))) {
                return Err(ConfigError::ValidationError(format!(
                    "merge.max_depth must be an integer in [1, {}]",
                    MAX_DEPTH_CEILING
                )));
            }
        }

        if let Some(arrays) = merge.and_then(|m| m.get("arrays")) {
            let parsed = arrays
                .as_str()
                .ok_or_else(|| "merge.arrays must be a string".to_string())
                .and_then(|s| s.parse::<ArrayMerge>());
            if let Err(e) = parsed {
                return Err(ConfigError::ValidationError(format!("merge.arrays: {}", e)));
            }
        }

        if let Some(deep) = merge.and_then(|m| m.get("deep")) {
            if deep.as_bool().is_none() {
                return Err(ConfigError::ValidationError(
                    "merge.deep must be a boolean".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as u64
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Get a config value as bool
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Merge options described by the `merge` table
    pub fn merge_options(&self) -> MergeOptions {
        let defaults = MergeOptions::default();
        MergeOptions {
            deep: self.get_bool("merge.deep").unwrap_or(defaults.deep),
            arrays: self
                .get_str("merge.arrays")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.arrays),
            max_depth: self
                .get_u64("merge.max_depth")
                .map(|d| d as usize)
                .unwrap_or(defaults.max_depth),
        }
    }

    /// Host strings described by the `probe` table
    pub fn probe_host(&self) -> StaticHost {
        StaticHost::new(
            self.get_str("probe.platform").unwrap_or_default(),
            self.get_str("probe.user_agent").unwrap_or_default(),
        )
    }
}

/// Check a merge depth limit against `[1, MAX_DEPTH_CEILING]`
pub fn check_max_depth(depth: u64) -> Result<usize, ConfigError> {
    if (1..=MAX_DEPTH_CEILING).contains(&depth) {
        Ok(depth as usize)
    } else {
        Err(ConfigError::ValidationError(format!(
            "max_depth {} is outside [1, {}]",
            depth, MAX_DEPTH_CEILING
        )))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Merge error: {0}")]
    MergeError(#[from] MergeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_build_with_defaults_only() {
        let config = EffectiveConfig::build(None, None).unwrap();

        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.get_u64("merge.max_depth"), Some(128));
        assert_eq!(config.get_str("merge.arrays"), Some("index"));
        assert_eq!(config.get_bool("merge.deep"), Some(false));
    }

    #[test]
    fn test_build_with_cli_override() {
        let cli = serde_json::json!({
            "merge": { "deep": true }
        });

        let config = EffectiveConfig::build(None, Some(cli)).unwrap();

        assert_eq!(config.get_bool("merge.deep"), Some(true));
        // Sibling keys survive the deep merge
        assert_eq!(config.get_u64("merge.max_depth"), Some(128));
    }

    #[test]
    fn test_validation_max_depth() {
        let cli = serde_json::json!({
            "merge": { "max_depth": 0 }
        });

        let result = EffectiveConfig::build(None, Some(cli));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("merge.max_depth"));
    }

    #[test]
    fn test_check_max_depth_bounds() {
        assert_eq!(check_max_depth(1).unwrap(), 1);
        assert_eq!(check_max_depth(MAX_DEPTH_CEILING).unwrap(), 4096);
        assert!(matches!(check_max_depth(0), Err(ConfigError::ValidationError(_))));
        assert!(matches!(
            check_max_depth(MAX_DEPTH_CEILING + 1),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_arrays() {
        let cli = serde_json::json!({
            "merge": { "arrays": "concat" }
        });

        let result = EffectiveConfig::build(None, Some(cli));
        assert!(result.unwrap_err().to_string().contains("merge.arrays"));
    }

    #[test]
    fn test_validation_deep_type() {
        let cli = serde_json::json!({
            "merge": { "deep": "yes" }
        });

        assert!(EffectiveConfig::build(None, Some(cli)).is_err());
    }

    #[test]
    fn test_load_toml_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[merge]").unwrap();
        writeln!(temp, "arrays = \"replace\"").unwrap();
        writeln!(temp, "[probe]").unwrap();
        writeln!(temp, "platform = \"Win32\"").unwrap();

        let config = EffectiveConfig::build(Some(temp.path()), None).unwrap();

        assert_eq!(config.get_str("merge.arrays"), Some("replace"));
        assert_eq!(config.get_str("probe.platform"), Some("Win32"));
        assert_eq!(config.get_u64("merge.max_depth"), Some(128));
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].origin, ConfigOrigin::File);
        assert_eq!(config.sources[1].digest.as_ref().map(|d| d.len()), Some(64));
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let config =
            EffectiveConfig::build(Some(Path::new("/nonexistent/clientkit.toml")), None).unwrap();

        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_invalid_toml() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[merge").unwrap();

        let result = EffectiveConfig::build(Some(temp.path()), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_sources_tracked() {
        let config = EffectiveConfig::build(None, Some(serde_json::json!({}))).unwrap();

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].origin, ConfigOrigin::Builtin);
        assert_eq!(config.sources[1].origin, ConfigOrigin::Cli);
    }

    #[test]
    fn test_merge_options() {
        let cli = serde_json::json!({
            "merge": { "deep": true, "arrays": "replace", "max_depth": 16 }
        });
        let config = EffectiveConfig::build(None, Some(cli)).unwrap();

        let options = config.merge_options();
        assert!(options.deep);
        assert_eq!(options.arrays, ArrayMerge::Replace);
        assert_eq!(options.max_depth, 16);
    }

    #[test]
    fn test_probe_host() {
        let cli = serde_json::json!({
            "probe": { "platform": "MacIntel", "user_agent": "MicroMessenger" }
        });
        let config = EffectiveConfig::build(None, Some(cli)).unwrap();

        let host = config.probe_host();
        assert_eq!(host.platform, "MacIntel");
        assert_eq!(host.user_agent, "MicroMessenger");
    }

    #[test]
    fn test_non_record_cli_override_rejected() {
        let result = EffectiveConfig::build(None, Some(serde_json::json!([1, 2])));
        assert!(matches!(result, Err(ConfigError::MergeError(_))));
    }
}
