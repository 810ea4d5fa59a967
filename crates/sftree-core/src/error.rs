//! Error types for tree configuration.
//!
//! Engine operations themselves never return errors: malformed batches are
//! contract violations and panic.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::TreeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Separator character cannot split paths.
    #[error("invalid path separator")]
    InvalidSeparator {
        /// Offending separator.
        value: char,
    },
    /// Configuration document could not be parsed.
    #[error("failed to parse tree configuration")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
