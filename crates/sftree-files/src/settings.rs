//! Persisted view settings.
//!
//! # Design
//! - Sort column and order are stored as strings so older documents with
//!   renamed columns surface a typed error instead of a serde failure.
//! - Tree tunables live in a nested `tree` object and are validated with the
//!   rest of the document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sftree_core::{Observer, TreeConfig};
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};
use crate::filter::FileFilter;
use crate::sort::{FileSort, SortColumn, SortOrder};
use crate::tree::FileView;

/// Everything needed to rebuild a file view the way the user left it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewSettings {
    /// Engine tunables.
    pub tree: TreeConfig,
    /// Sorted column name.
    pub sort_column: String,
    /// `ascending` or `descending`.
    pub sort_order: String,
    /// Case-sensitive name comparison and matching.
    pub case_sensitive: bool,
    /// Name filter pattern.
    pub filter: String,
    /// Hide files not selected for download.
    pub selected_only: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            tree: TreeConfig::default(),
            sort_column: SortColumn::Name.as_str().to_string(),
            sort_order: "ascending".to_string(),
            case_sensitive: false,
            filter: String::new(),
            selected_only: false,
        }
    }
}

impl ViewSettings {
    /// Parse and validate a JSON settings document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for malformed JSON and the
    /// validation errors of [`Self::validate`].
    pub fn from_json(input: &str) -> SettingsResult<Self> {
        let settings: Self =
            serde_json::from_str(input).map_err(|source| SettingsError::Parse { source })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::from_json`].
    pub fn from_value(value: Value) -> SettingsResult<Self> {
        let settings: Self =
            serde_json::from_value(value).map_err(|source| SettingsError::Parse { source })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check fields serde accepts but the view cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownSortColumn`],
    /// [`SettingsError::InvalidSortOrder`] or [`SettingsError::Tree`].
    pub fn validate(&self) -> SettingsResult<()> {
        self.tree.validate()?;
        self.sort().map(|_| ())
    }

    /// Sort predicate described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownSortColumn`] or
    /// [`SettingsError::InvalidSortOrder`].
    pub fn sort(&self) -> SettingsResult<FileSort> {
        let column: SortColumn = self.sort_column.parse()?;
        let order: SortOrder = self.sort_order.parse()?;
        Ok(FileSort {
            case_sensitive: self.case_sensitive,
            ..FileSort::new(column, order)
        })
    }

    /// Filter predicate described by these settings.
    #[must_use]
    pub fn filter(&self) -> FileFilter {
        FileFilter {
            pattern: self.filter.clone(),
            selected_only: self.selected_only,
            case_sensitive: self.case_sensitive,
        }
    }

    /// Empty view configured from these settings.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`Self::validate`].
    pub fn build_view<O: Observer>(&self, observer: O) -> SettingsResult<FileView<O>> {
        let sort = self.sort()?;
        debug!(
            column = %sort.column,
            filter = %self.filter,
            selected_only = self.selected_only,
            "building file view"
        );
        Ok(FileView::from_parts(self.tree, sort, self.filter(), observer)?)
    }
}
