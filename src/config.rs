use crate::error::SchemaError;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Runtime settings for the navigation engine and callback dispatcher.
///
/// Every field has a default, so a configuration file only needs to name
/// the values it overrides:
///
/// ```json
/// { "delimiter": "#", "callback_timeout_ms": 1500 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Separator between accumulated inputs in the request `text`.
    pub delimiter: char,
    /// Flow used when the caller does not name one.
    pub default_flow: String,
    /// Upper bound on zero-width `go_to` hops taken after a single input.
    pub max_goto_hops: usize,
    /// Timeout applied to every HTTP callback.
    pub callback_timeout_ms: u64,
    /// Maximum number of async-mode callbacks in flight at once.
    pub max_concurrent_callbacks: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiter: '*',
            default_flow: "main".to_string(),
            max_goto_hops: 32,
            callback_timeout_ms: 3000,
            max_concurrent_callbacks: 64,
        }
    }
}

impl EngineConfig {
    /// Loads a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &str) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::DocumentParse(e.to_string()))
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_millis(self.callback_timeout_ms)
    }
}
