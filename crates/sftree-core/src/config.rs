//! Engine configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::segment::PathSegmenter;

/// Default path separator.
pub const DEFAULT_SEPARATOR: char = '/';

/// Tunables for an [`crate::SfTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    /// Character splitting record paths into segments.
    pub separator: char,
    /// Take the cheap refilter path when a filter reports a narrowing change.
    pub incremental_refilter: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            incremental_refilter: true,
        }
    }
}

impl TreeConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::InvalidSeparator`] when validation fails.
    pub fn from_json(input: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(input).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Build from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::from_json`].
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_value(value).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeparator`] for whitespace or control
    /// separators.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.separator.is_whitespace() || self.separator.is_control() {
            return Err(ConfigError::InvalidSeparator {
                value: self.separator,
            });
        }
        Ok(())
    }

    pub(crate) const fn segmenter(&self) -> PathSegmenter {
        PathSegmenter::new(self.separator)
    }
}
