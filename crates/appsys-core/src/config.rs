//! # Bridge Configuration
//!
//! Tunable policies of the boundary layer, loaded from JSON. Every field has
//! a default, so `{}` is a valid configuration.

use crate::dispatch::DispatchErrorPolicy;
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default capacity of one `(object, event)` key.
pub const DEFAULT_MAX_CALLBACKS_PER_KEY: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: i32,
    pub height: i32,
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub max_callbacks_per_key: usize,
    pub dispatch_errors: DispatchErrorPolicy,
    pub display: DisplaySize,
    /// Upper bound on pump rounds per `pump_until_idle` call.
    pub max_pump_rounds: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_callbacks_per_key: DEFAULT_MAX_CALLBACKS_PER_KEY,
            dispatch_errors: DispatchErrorPolicy::Continue,
            display: DisplaySize::default(),
            max_pump_rounds: 64,
        }
    }
}

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
