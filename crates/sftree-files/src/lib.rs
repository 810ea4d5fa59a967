#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Torrent file-list view built on [`sftree_core`].
//!
//! # Design
//! - Files are leaves keyed by their payload-relative path; directories are
//!   pages carrying size, progress and selection roll-ups.
//! - Column sorting keeps directories ahead of files and breaks ties by name.
//! - The name filter knows when a change only narrows the visible set, which
//!   lets the engine skip rows that are already hidden.

pub mod error;
pub mod filter;
pub mod model;
pub mod settings;
pub mod sort;
pub mod tree;

pub use error::{SettingsError, SettingsResult};
pub use filter::FileFilter;
pub use model::{FilePriority, TorrentFile};
pub use settings::ViewSettings;
pub use sort::{FileSort, SortColumn, SortOrder};
pub use tree::{DirStats, FileTree, FileView};
