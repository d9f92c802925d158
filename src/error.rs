//! Error types for hookbus.
//!
//! Only programmer errors and callback failures are reported. Registering a
//! callback without a function, or triggering/removing an event that matches
//! nothing, is not an error and never reaches this module.

use thiserror::Error;

/// Top-level error type for hookbus.
#[derive(Debug, Error)]
pub enum HookError {
    /// A strategy name outside the built-in table was requested.
    #[error("Unknown dispatch strategy '{name}'")]
    UnknownStrategy {
        /// The name that failed to resolve.
        name: String,
    },

    /// A callback failed during dispatch. Remaining callbacks were not run.
    #[error("Callback failed: {message}")]
    Callback {
        /// Failure description supplied by the callback.
        message: String,
    },

    /// Configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {message}")]
    Config {
        /// What went wrong.
        message: String,
    },

    /// A property key would not survive the event-string grammar.
    #[error("Invalid property key '{key}': keys cannot contain whitespace or '.'")]
    InvalidKey {
        #[allow(missing_docs)]
        key: String,
    },
}

impl HookError {
    /// Creates a callback failure, for use inside callbacks.
    #[must_use]
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback {
            message: message.into(),
        }
    }

    /// Returns true if this is an unknown strategy error.
    #[must_use]
    pub const fn is_unknown_strategy(&self) -> bool {
        matches!(self, Self::UnknownStrategy { .. })
    }

    /// Returns true if this error was raised by a callback.
    #[must_use]
    pub const fn is_callback(&self) -> bool {
        matches!(self, Self::Callback { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this is an invalid property key error.
    #[must_use]
    pub const fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey { .. })
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

/// Result type alias for hookbus operations.
pub type HookResult<T> = Result<T, HookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_strategy_message() {
        let err = HookError::UnknownStrategy {
            name: "evry".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("evry"));
        assert!(msg.contains("Unknown dispatch strategy"));
        assert!(err.is_unknown_strategy());
        assert!(!err.is_callback());
    }

    #[test]
    fn test_callback_error() {
        let err = HookError::callback("boom");
        assert!(err.is_callback());
        assert_eq!(format!("{err}"), "Callback failed: boom");
    }

    #[test]
    fn test_config_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: HookError = parse_err.into();
        assert!(err.is_config());
        assert!(format!("{err}").starts_with("Invalid configuration"));
    }

    #[test]
    fn test_invalid_key_message() {
        let err = HookError::InvalidKey { key: "a b".to_string() };
        assert!(err.is_invalid_key());
        assert!(!err.is_config());
        assert!(format!("{err}").contains("'a b'"));
    }
}
