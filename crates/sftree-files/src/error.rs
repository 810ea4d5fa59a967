//! Error types for view settings.

use thiserror::Error;

/// Errors raised while loading or validating [`crate::ViewSettings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Sort column name is not recognised.
    #[error("unknown sort column")]
    UnknownSortColumn {
        /// Rejected column name.
        value: String,
    },
    /// Sort order is neither ascending nor descending.
    #[error("invalid sort order")]
    InvalidSortOrder {
        /// Rejected order string.
        value: String,
    },
    /// Settings document could not be parsed.
    #[error("failed to parse view settings")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// Embedded tree configuration is invalid.
    #[error("invalid tree configuration")]
    Tree {
        /// Underlying configuration error.
        #[source]
        source: sftree_core::ConfigError,
    },
}

impl From<sftree_core::ConfigError> for SettingsError {
    fn from(source: sftree_core::ConfigError) -> Self {
        Self::Tree { source }
    }
}

/// Convenience alias for settings results.
pub type SettingsResult<T> = Result<T, SettingsError>;
