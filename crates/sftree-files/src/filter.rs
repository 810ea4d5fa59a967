//! Name and selection filtering.

use sftree_core::{FilterPredicate, LeafRef, RefilterType};

use crate::tree::FileTree;

/// Shows files whose name contains `pattern`, optionally only selected ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    /// Substring the file name must contain; empty matches everything.
    pub pattern: String,
    /// Hide files not selected for download.
    pub selected_only: bool,
    /// Match the pattern case-sensitively.
    pub case_sensitive: bool,
}

impl FileFilter {
    /// Case-insensitive name filter.
    #[must_use]
    pub fn named(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    fn folded_pattern(&self) -> String {
        if self.case_sensitive {
            self.pattern.clone()
        } else {
            self.pattern.to_lowercase()
        }
    }
}

impl FilterPredicate<FileTree> for FileFilter {
    fn is_active(&self) -> bool {
        !self.pattern.is_empty() || self.selected_only
    }

    fn matches(&self, file: &LeafRef<'_, FileTree>) -> bool {
        if self.selected_only && !file.leaf.selected {
            return false;
        }
        if self.pattern.is_empty() {
            return true;
        }
        if self.case_sensitive {
            file.name.contains(&self.pattern)
        } else {
            file.name
                .to_lowercase()
                .contains(&self.pattern.to_lowercase())
        }
    }

    /// A longer pattern containing the previous one, with the selection
    /// constraint kept or added, can only hide more files.
    fn refilter_type(&self, previous: &Self) -> RefilterType {
        if self == previous {
            return RefilterType::Same;
        }
        if self.case_sensitive != previous.case_sensitive
            || (previous.selected_only && !self.selected_only)
        {
            return RefilterType::Full;
        }
        if self.folded_pattern().contains(&previous.folded_pattern()) {
            RefilterType::Incremental
        } else {
            RefilterType::Full
        }
    }
}
