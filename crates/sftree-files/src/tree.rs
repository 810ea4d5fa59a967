//! Binding of [`TorrentFile`] records to the tree engine.

use sftree_core::{ChildIter, Node, NoopObserver, SfTree, TreeTraits};

use crate::filter::FileFilter;
use crate::model::{FilePriority, TorrentFile, percent};
use crate::sort::FileSort;

/// Tree of torrent files.
#[derive(Debug)]
pub enum FileTree {}

/// File view with the given observer.
pub type FileView<O = NoopObserver> = SfTree<FileTree, O>;

/// Roll-up of everything below a directory, hidden files included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirStats {
    /// Total size in bytes.
    pub size_bytes: u64,
    /// Bytes downloaded so far.
    pub bytes_completed: u64,
    /// Number of files.
    pub files: usize,
    /// Number of files selected for download.
    pub selected_files: usize,
    /// Shared priority of every file, `None` when they differ or the
    /// directory is empty.
    pub priority: Option<FilePriority>,
    /// Number of direct children currently visible.
    pub visible_entries: usize,
}

impl DirStats {
    /// Completion percentage (0-100).
    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        percent(self.bytes_completed, self.size_bytes)
    }

    /// Whether every file is selected, none is, or the selection is mixed.
    #[must_use]
    pub const fn selection(&self) -> Option<bool> {
        if self.selected_files == 0 {
            Some(false)
        } else if self.selected_files == self.files {
            Some(true)
        } else {
            None
        }
    }

    fn absorb(&mut self, other: Self) {
        let first = self.files == 0;
        self.size_bytes += other.size_bytes;
        self.bytes_completed += other.bytes_completed;
        self.files += other.files;
        self.selected_files += other.selected_files;
        self.priority = match (first, self.priority, other.priority) {
            (true, _, priority) => priority,
            (false, Some(current), Some(next)) if current == next => Some(current),
            _ => None,
        };
    }
}

impl From<&TorrentFile> for DirStats {
    fn from(file: &TorrentFile) -> Self {
        Self {
            size_bytes: file.size_bytes,
            bytes_completed: file.bytes_completed,
            files: 1,
            selected_files: usize::from(file.selected),
            priority: Some(file.priority),
            visible_entries: 0,
        }
    }
}

impl TreeTraits for FileTree {
    type Leaf = TorrentFile;
    type PageData = DirStats;
    type Sort = FileSort;
    type Filter = FileFilter;

    fn leaf_path(leaf: &TorrentFile) -> &str {
        &leaf.path
    }

    fn recalculate(children: ChildIter<'_, Self>) -> DirStats {
        let mut stats = DirStats::default();
        for child in children {
            let part = match child.node {
                Node::Leaf(file) => DirStats::from(file.leaf),
                Node::Page(dir) => {
                    if dir.data.files == 0 {
                        continue;
                    }
                    *dir.data
                }
            };
            stats.absorb(part);
            if child.visible {
                stats.visible_entries += 1;
            }
        }
        stats
    }
}
