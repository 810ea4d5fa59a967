//! Column sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sftree_core::{LeafRef, PageRef, SortPredicate};

use crate::error::SettingsError;
use crate::tree::{DirStats, FileTree};

/// Column the view is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Insertion order.
    None,
    /// Entry name.
    #[default]
    Name,
    /// Size in bytes.
    Size,
    /// Completed fraction.
    Progress,
    /// File priority; mixed directories sort first.
    Priority,
}

impl SortColumn {
    /// Lowercase identifier used in settings documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Name => "name",
            Self::Size => "size",
            Self::Progress => "progress",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "name" => Ok(Self::Name),
            "size" => Ok(Self::Size),
            "progress" => Ok(Self::Progress),
            "priority" => Ok(Self::Priority),
            _ => Err(SettingsError::UnknownSortColumn {
                value: value.to_string(),
            }),
        }
    }
}

/// Direction of the sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl FromStr for SortOrder {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            _ => Err(SettingsError::InvalidSortOrder {
                value: value.to_string(),
            }),
        }
    }
}

/// Sort predicate over one column.
///
/// Directories always precede files. Equal keys fall back to the name, so
/// the order is total within a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSort {
    /// Sorted column.
    pub column: SortColumn,
    /// Sort direction.
    pub order: SortOrder,
    /// Compare names case-sensitively.
    pub case_sensitive: bool,
}

impl FileSort {
    /// Sort by `column` in `order`, names compared case-insensitively.
    #[must_use]
    pub const fn new(column: SortColumn, order: SortOrder) -> Self {
        Self {
            column,
            order,
            case_sensitive: false,
        }
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    fn names(&self, left: &str, right: &str) -> Ordering {
        if self.case_sensitive {
            left.cmp(right)
        } else {
            left.chars()
                .flat_map(char::to_lowercase)
                .cmp(right.chars().flat_map(char::to_lowercase))
                .then_with(|| left.cmp(right))
        }
    }
}

/// `done / total` compared without floating point; empty entries count as
/// zero progress.
fn progress_cmp(done_left: u64, total_left: u64, done_right: u64, total_right: u64) -> Ordering {
    match (total_left, total_right) {
        (0, 0) => Ordering::Equal,
        (0, _) => 0.cmp(&done_right),
        (_, 0) => done_left.cmp(&0),
        _ => (u128::from(done_left) * u128::from(total_right))
            .cmp(&(u128::from(done_right) * u128::from(total_left))),
    }
}

fn dir_priority_cmp(left: &DirStats, right: &DirStats) -> Ordering {
    left.priority.cmp(&right.priority)
}

impl SortPredicate<FileTree> for FileSort {
    fn is_active(&self) -> bool {
        self.column != SortColumn::None
    }

    fn compare_leaves(
        &self,
        left: &LeafRef<'_, FileTree>,
        right: &LeafRef<'_, FileTree>,
    ) -> Ordering {
        let (name_left, name_right) = (left.name, right.name);
        let (left, right) = (left.leaf, right.leaf);
        let key = match self.column {
            SortColumn::None | SortColumn::Name => Ordering::Equal,
            SortColumn::Size => left.size_bytes.cmp(&right.size_bytes),
            SortColumn::Progress => progress_cmp(
                left.bytes_completed,
                left.size_bytes,
                right.bytes_completed,
                right.size_bytes,
            ),
            SortColumn::Priority => left.priority.cmp(&right.priority),
        };
        self.directed(key.then_with(|| self.names(name_left, name_right)))
    }

    fn compare_pages(
        &self,
        left: &PageRef<'_, FileTree>,
        right: &PageRef<'_, FileTree>,
    ) -> Ordering {
        let key = match self.column {
            SortColumn::None | SortColumn::Name => Ordering::Equal,
            SortColumn::Size => left.data.size_bytes.cmp(&right.data.size_bytes),
            SortColumn::Progress => progress_cmp(
                left.data.bytes_completed,
                left.data.size_bytes,
                right.data.bytes_completed,
                right.data.size_bytes,
            ),
            SortColumn::Priority => dir_priority_cmp(left.data, right.data),
        };
        self.directed(key.then_with(|| self.names(left.name, right.name)))
    }
}
