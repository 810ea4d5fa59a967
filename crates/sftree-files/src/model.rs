//! File records shown by the view.

use serde::{Deserialize, Serialize};

/// Priority level of a file.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FilePriority {
    /// Do not download the file.
    Skip,
    /// Throttle the download priority.
    Low,
    /// Default priority level.
    #[default]
    Normal,
    /// Highest available priority.
    High,
}

/// Individual file of a torrent payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentFile {
    /// Index of the file within the torrent metainfo.
    pub index: u32,
    /// Relative path of the file within the torrent payload.
    pub path: String,
    /// Total size of the file in bytes.
    pub size_bytes: u64,
    /// Bytes downloaded so far for this file.
    #[serde(default)]
    pub bytes_completed: u64,
    /// Current priority level.
    #[serde(default)]
    pub priority: FilePriority,
    /// Whether the file is selected for download.
    #[serde(default = "default_selected")]
    pub selected: bool,
}

const fn default_selected() -> bool {
    true
}

impl TorrentFile {
    /// Selected, normal-priority file with nothing downloaded yet.
    #[must_use]
    pub fn new(index: u32, path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            index,
            path: path.into(),
            size_bytes,
            bytes_completed: 0,
            priority: FilePriority::Normal,
            selected: true,
        }
    }

    /// Completion percentage (0-100).
    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        percent(self.bytes_completed, self.size_bytes)
    }
}

/// Completion percentage of `done` out of `total` bytes.
pub(crate) fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (to_f64(done) / to_f64(total)) * 100.0
    }
}

const fn to_f64(value: u64) -> f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "u64 to f64 conversion is required for user-facing percentage reporting"
    )]
    {
        value as f64
    }
}
