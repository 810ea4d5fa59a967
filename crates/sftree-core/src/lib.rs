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
#![allow(
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::redundant_pub_crate,
    clippy::too_many_arguments
)]

//! Hierarchical, sorted and filtered view over a flat set of path-keyed
//! records.
//!
//! # Design
//! - Records are leaves; every distinct path prefix becomes a page whose
//!   children are kept in display order, visible ones first.
//! - Pages are visible while any child is visible, so filtering a leaf can
//!   ripple up to its ancestors.
//! - [`SfTree::assign`] rebuilds wholesale; [`SfTree::apply_delta`] applies
//!   erase/update/insert batches and touches each affected page once,
//!   bottom-up.
//! - Predicate swaps ([`SfTree::sort_by`], [`SfTree::filter_by`]) rearrange in
//!   place and report row moves through an [`Observer`].

mod builder;
pub mod config;
pub mod error;
mod notify;
mod order;
mod page;
mod persistent;
mod refilter;
pub mod segment;
mod storage;
#[cfg(test)]
mod testing;
mod traits;
mod tree;
mod updater;

pub use config::{DEFAULT_SEPARATOR, TreeConfig};
pub use error::{ConfigError, ConfigResult};
pub use notify::{ChangeRecorder, NoopObserver, Notification, Observer, RowRemap};
pub use page::PageId;
pub use persistent::{PersistentIndex, PersistentIndexes};
pub use segment::{PathSegmenter, Segment};
pub use traits::{
    Child, ChildIter, FilterPredicate, LeafRef, Node, PageRef, PassAll, RefilterType,
    SortPredicate,
    TreeTraits, Unsorted,
};
pub use tree::{SfTree, VisibleLeaves};
