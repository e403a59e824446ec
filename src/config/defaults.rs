//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for all configuration values.

use clientkit_merge::{ArrayMerge, Value, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Recurse into nested records (default: false)
    pub merge_deep: bool,

    /// Sequence strategy for deep merges (default: "index")
    pub merge_arrays: ArrayMerge,

    /// Deep merge nesting limit (default: 128)
    pub merge_max_depth: usize,

    /// Platform string used when none is supplied (default: "")
    pub probe_platform: String,

    /// User-agent string used when none is supplied (default: "")
    pub probe_user_agent: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            merge_deep: false,
            merge_arrays: ArrayMerge::Index,
            merge_max_depth: DEFAULT_MAX_DEPTH,
            probe_platform: String::new(),
            probe_user_agent: String::new(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a Value for merging
    pub fn to_value(&self) -> Value {
        Value::from(serde_json::json!({
            "merge": {
                "deep": self.merge_deep,
                "arrays": self.merge_arrays.to_string(),
                "max_depth": self.merge_max_depth
            },
            "probe": {
                "platform": self.probe_platform,
                "user_agent": self.probe_user_agent
            }
        }))
    }
}
