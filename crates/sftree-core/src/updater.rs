//! Incremental updates: erase, update and insert leaves in one pass.
//!
//! The three batches are sorted by path and walked together, page by page.
//! Every page touched by the batch is rearranged exactly once, bottom-up, so a
//! parent always ranks its child pages by their final aggregates and
//! visibility.

use std::iter::{self, Peekable};
use std::vec;

use tracing::{debug, warn};

use crate::notify::{Observer, Pending};
use crate::order::Ranker;
use crate::page::PageId;
use crate::segment::{PathSegmenter, Segment};
use crate::storage::{Children, Slot, Value};
use crate::traits::TreeTraits;
use crate::tree::SfTree;

/// Sorted input cursors of one delta.
struct Batch<T: TreeTraits> {
    erased: Peekable<vec::IntoIter<String>>,
    updated: Peekable<vec::IntoIter<T::Leaf>>,
    inserted: Peekable<vec::IntoIter<T::Leaf>>,
}

/// Child page addressed by at least one pending path.
struct Group {
    name: Box<str>,
    prefix: String,
}

impl<T: TreeTraits> Batch<T> {
    /// Leftmost page below `prefix` still referenced by any cursor.
    ///
    /// Groups are compared by their full prefix (closing separator included),
    /// which is the order the cursors were sorted in.
    fn next_group(&mut self, segmenter: PathSegmenter, prefix: &str) -> Option<Group> {
        let heads = [
            self.erased.peek().map(String::as_str),
            self.updated.peek().map(T::leaf_path),
            self.inserted.peek().map(T::leaf_path),
        ];
        let mut best: Option<(&str, &str)> = None;
        for path in heads.into_iter().flatten() {
            if !PathSegmenter::is_subelement(prefix, path) {
                continue;
            }
            if let Segment::Page { name, prefix_end } = segmenter.analyze(prefix.len(), path) {
                let group = &path[..prefix_end];
                if best.is_none_or(|(current, _)| group < current) {
                    best = Some((group, name));
                }
            }
        }
        best.map(|(group, name)| Group {
            name: name.into(),
            prefix: group.to_owned(),
        })
    }

    /// Whether an update or insert still targets something below `prefix`.
    fn feeds(&mut self, prefix: &str) -> bool {
        let below = |leaf: &T::Leaf| T::leaf_path(leaf).starts_with(prefix);
        self.updated.peek().is_some_and(below) || self.inserted.peek().is_some_and(below)
    }

    /// Drop erase requests below a page that does not exist.
    fn skip_erased(&mut self, prefix: &str) {
        while let Some(path) = self.erased.next_if(|path| path.starts_with(prefix)) {
            warn!(path = %path, "erase of unknown path ignored");
        }
    }
}

/// How a child slot was touched by the current delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Untouched,
    Changed,
    Inserted,
    Removed,
    Placed,
}

/// Slots of one page touched by a delta.
#[derive(Debug, Default)]
struct PageDelta {
    removed: Vec<Slot>,
    changed: Vec<Slot>,
    inserted: Vec<Slot>,
}

impl PageDelta {
    fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.changed.is_empty() && self.inserted.is_empty()
    }
}

fn is_leaf_level(segmenter: PathSegmenter, prefix: &str, path: &str) -> bool {
    PathSegmenter::is_subelement(prefix, path) && segmenter.analyze(prefix.len(), path).is_leaf()
}

fn sorted_by_path<T: TreeTraits>(leaves: impl IntoIterator<Item = T::Leaf>) -> Vec<T::Leaf> {
    let mut leaves: Vec<T::Leaf> = leaves.into_iter().collect();
    leaves.sort_by(|left, right| T::leaf_path(left).cmp(T::leaf_path(right)));
    if let Some(pair) = leaves
        .windows(2)
        .find(|pair| T::leaf_path(&pair[0]) == T::leaf_path(&pair[1]))
    {
        panic!("path {:?} appears twice in one batch", T::leaf_path(&pair[0]));
    }
    leaves
}

impl<T: TreeTraits, O: Observer> SfTree<T, O> {
    /// Apply one delta: erase `erased` paths, replace the `updated` leaves and
    /// add the `inserted` ones.
    ///
    /// Erasing a path that does not exist is ignored with a warning.
    ///
    /// # Panics
    ///
    /// Panics when an updated path does not exist, when an inserted path
    /// already exists, when a path shows up twice in one batch and on
    /// malformed paths.
    pub fn apply_delta<E, U, I>(&mut self, erased: E, updated: U, inserted: I)
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        U: IntoIterator<Item = T::Leaf>,
        I: IntoIterator<Item = T::Leaf>,
    {
        let mut erased: Vec<String> = erased
            .into_iter()
            .map(|path| path.as_ref().to_owned())
            .collect();
        erased.sort_unstable();
        erased.dedup();
        let updated = sorted_by_path::<T>(updated);
        let inserted = sorted_by_path::<T>(inserted);
        if erased.is_empty() && updated.is_empty() && inserted.is_empty() {
            return;
        }
        debug!(
            erased = erased.len(),
            updated = updated.len(),
            inserted = inserted.len(),
            "applying delta"
        );

        let mut batch = Batch::<T> {
            erased: erased.into_iter().peekable(),
            updated: updated.into_iter().peekable(),
            inserted: inserted.into_iter().peekable(),
        };
        let mut pending = Pending::default();
        self.update_page(PageId::ROOT, "", &mut batch, &mut pending);
        pending.dispatch(&mut self.observer);
    }

    /// Insert new records and replace existing ones with the same path.
    pub fn upsert<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = T::Leaf>,
    {
        let (updated, inserted): (Vec<T::Leaf>, Vec<T::Leaf>) = records
            .into_iter()
            .partition(|leaf| self.find_leaf(T::leaf_path(leaf)).is_some());
        self.apply_delta(iter::empty::<&str>(), updated, inserted);
    }

    /// Remove the leaves at `paths`, pruning pages left empty.
    pub fn erase<E>(&mut self, paths: E)
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        self.apply_delta(paths, Vec::new(), Vec::new());
    }

    /// Apply the part of `batch` below `prefix`; returns whether `page` was
    /// touched at all.
    fn update_page(
        &mut self,
        page: PageId,
        prefix: &str,
        batch: &mut Batch<T>,
        pending: &mut Pending,
    ) -> bool {
        let mut delta = PageDelta::default();
        loop {
            self.apply_leaf_level(page, prefix, batch, &mut delta);
            let Some(group) = batch.next_group(self.segmenter, prefix) else {
                break;
            };
            let children = &self.pages.page(page).children;
            let existing = children
                .slot_of(&group.name)
                .map(|slot| (slot, children.entry(slot).value.as_page()));
            match existing {
                Some((slot, Some(child))) => {
                    if self.update_page(child, &group.prefix, batch, pending) {
                        delta.changed.push(slot);
                    }
                }
                Some((_, None)) => panic!("{:?} is a leaf, not a page", group.prefix),
                None if batch.feeds(&group.prefix) => {
                    let child = self.pages.alloc(page, group.name.clone());
                    self.update_page(child, &group.prefix, batch, pending);
                    if self.pages.page(child).children.is_empty() {
                        self.pages.release(child);
                        continue;
                    }
                    let slot = self
                        .pages
                        .page_mut(page)
                        .children
                        .insert_unique(group.name, Value::Page(child));
                    delta.inserted.extend(slot);
                }
                None => batch.skip_erased(&group.prefix),
            }
        }
        if delta.is_empty() {
            return false;
        }
        self.rearrange_children_and_notify(page, delta, pending);
        self.recalculate_page(page);
        true
    }

    /// Consume every request that names a direct child of `page`.
    fn apply_leaf_level(
        &mut self,
        page: PageId,
        prefix: &str,
        batch: &mut Batch<T>,
        delta: &mut PageDelta,
    ) {
        let segmenter = self.segmenter;
        let children = &mut self.pages.page_mut(page).children;

        while let Some(path) = batch
            .erased
            .next_if(|path| is_leaf_level(segmenter, prefix, path))
        {
            match children.slot_of(&path[prefix.len()..]) {
                Some(slot) if children.entry(slot).value.as_page().is_none() => {
                    delta.removed.push(slot);
                    self.leaves -= 1;
                }
                Some(_) => panic!("cannot erase page {path:?} as a leaf"),
                None => warn!(path = %path, "erase of unknown path ignored"),
            }
        }

        while let Some(leaf) = batch
            .updated
            .next_if(|leaf| is_leaf_level(segmenter, prefix, T::leaf_path(leaf)))
        {
            let Some(slot) = children.slot_of(&T::leaf_path(&leaf)[prefix.len()..]) else {
                panic!("update of unknown path {:?}", T::leaf_path(&leaf));
            };
            match &mut children.entry_mut(slot).value {
                Value::Leaf(current) => *current = leaf,
                Value::Page(_) => panic!("update of page {:?} as a leaf", T::leaf_path(&leaf)),
            }
            delta.changed.push(slot);
        }

        while let Some(leaf) = batch
            .inserted
            .next_if(|leaf| is_leaf_level(segmenter, prefix, T::leaf_path(leaf)))
        {
            let key: Box<str> = T::leaf_path(&leaf)[prefix.len()..].into();
            assert!(
                children.slot_of(&key).is_none(),
                "insert of existing path {:?}",
                T::leaf_path(&leaf)
            );
            delta.inserted.extend(children.insert_unique(key, Value::Leaf(leaf)));
            self.leaves += 1;
        }
    }

    /// Fold a page's delta into its sequence and queue the notifications.
    ///
    /// Untouched entries keep their relative order. Touched entries are
    /// re-tested by the filter and merged back into the visible run; with
    /// sorting off, changed entries that stay visible keep their row and the
    /// rest fall back into insertion order.
    fn rearrange_children_and_notify(
        &mut self,
        page: PageId,
        delta: PageDelta,
        pending: &mut Pending,
    ) {
        let mut children = self.detach(page);
        let old_visible = children.visible().to_vec();

        let mut marks = vec![Mark::Untouched; children.slot_capacity()];
        for &slot in &delta.changed {
            marks[slot] = Mark::Changed;
        }
        for &slot in &delta.inserted {
            marks[slot] = Mark::Inserted;
        }
        let mut removed = delta.removed;
        for &slot in &delta.changed {
            let emptied = children
                .entry(slot)
                .value
                .as_page()
                .is_some_and(|child| self.pages.page(child).children.is_empty());
            if emptied {
                removed.push(slot);
            }
        }
        for &slot in &removed {
            marks[slot] = Mark::Removed;
        }

        let (visible, hidden) = {
            let ranker = Ranker {
                sort: &self.sort,
                filter: &self.filter,
                children: &children,
                pages: &self.pages,
            };
            let mut kept = Vec::with_capacity(old_visible.len());
            let mut fresh = Vec::new();
            let mut hidden = Vec::new();
            for &slot in children.visible() {
                match marks[slot] {
                    Mark::Untouched => kept.push(slot),
                    Mark::Changed if !ranker.sorting() => {
                        marks[slot] = Mark::Placed;
                        if ranker.passes(slot) {
                            kept.push(slot);
                        } else {
                            hidden.push(slot);
                        }
                    }
                    _ => {}
                }
            }
            hidden.extend(
                children
                    .hidden()
                    .iter()
                    .copied()
                    .filter(|slot| marks[*slot] == Mark::Untouched),
            );
            for &slot in children.order() {
                if matches!(marks[slot], Mark::Changed | Mark::Inserted) {
                    marks[slot] = Mark::Placed;
                    if ranker.passes(slot) {
                        fresh.push(slot);
                    } else {
                        hidden.push(slot);
                    }
                }
            }
            (ranker.merge(kept, fresh), hidden)
        };

        let mut lost_pages = Vec::new();
        for slot in removed {
            if children.position_of(slot).is_none() {
                continue;
            }
            if let Value::Page(child) = children.take(slot).value {
                self.pages.release(child);
                lost_pages.push(child);
            }
        }
        self.commit(page, children, &old_visible, visible, hidden, lost_pages, pending);

        let children: &Children<T::Leaf> = &self.pages.page(page).children;
        let rows: Vec<usize> = delta
            .changed
            .iter()
            .filter_map(|slot| children.visible_row(*slot))
            .collect();
        pending.changed(page, dedup(rows));
    }
}

fn dedup(mut rows: Vec<usize>) -> Vec<usize> {
    rows.sort_unstable();
    rows.dedup();
    rows
}
