//! Dispatcher configuration.

use serde::{Deserialize, Serialize};

use crate::error::HookResult;
use crate::registry::DEFAULT_PRIORITY;
use crate::strategy::BuiltinStrategy;

/// Tunables for a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Priority for callbacks registered without one.
    pub default_priority: i64,
    /// Strategy used by `emit`.
    pub default_strategy: BuiltinStrategy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            default_strategy: BuiltinStrategy::Each,
        }
    }
}

impl DispatcherConfig {
    /// Parses a JSON object. Missing fields take their defaults; unknown
    /// fields and unknown strategy names are rejected.
    pub fn from_json(input: &str) -> HookResult<Self> {
        Ok(serde_json::from_str(input)?)
    }
}
