//! Stable ordering primitives shared by the builder, updater and refilters.

use std::cmp::Ordering;

use crate::page::{PageId, Pages};
use crate::storage::{Children, Slot, Value};
use crate::traits::{FilterPredicate, LeafRef, PageRef, SortPredicate, TreeTraits};

/// Whether `slots` is already non-decreasing under `cmp`.
pub(crate) fn is_sorted_by<F>(slots: &[Slot], mut cmp: F) -> bool
where
    F: FnMut(Slot, Slot) -> Ordering,
{
    slots
        .windows(2)
        .all(|pair| cmp(pair[0], pair[1]) != Ordering::Greater)
}

/// Merge `fresh` into the already sorted `sorted`.
///
/// `fresh` is stable-sorted first unless it is already in order. On ties the
/// entries of `sorted` come first, so existing rows never jump over equal
/// newcomers.
pub(crate) fn merge_newdata<F>(sorted: Vec<Slot>, mut fresh: Vec<Slot>, mut cmp: F) -> Vec<Slot>
where
    F: FnMut(Slot, Slot) -> Ordering,
{
    if !is_sorted_by(&fresh, &mut cmp) {
        fresh.sort_by(|left, right| cmp(*left, *right));
    }
    if sorted.is_empty() {
        return fresh;
    }
    if fresh.is_empty() {
        return sorted;
    }

    let mut merged = Vec::with_capacity(sorted.len() + fresh.len());
    let mut old = sorted.into_iter().peekable();
    let mut new = fresh.into_iter().peekable();
    while let (Some(&left), Some(&right)) = (old.peek(), new.peek()) {
        if cmp(left, right) == Ordering::Greater {
            merged.push(right);
            new.next();
        } else {
            merged.push(left);
            old.next();
        }
    }
    merged.extend(old);
    merged.extend(new);
    merged
}

/// Split `slots` into passing and failing entries, keeping relative order.
pub(crate) fn stable_partition<P>(slots: &[Slot], mut passes: P) -> (Vec<Slot>, Vec<Slot>)
where
    P: FnMut(Slot) -> bool,
{
    let mut pass = Vec::with_capacity(slots.len());
    let mut fail = Vec::new();
    for &slot in slots {
        if passes(slot) {
            pass.push(slot);
        } else {
            fail.push(slot);
        }
    }
    (pass, fail)
}

/// Sort and filter view over one page's children.
///
/// The page's own children are detached from the arena while it is being
/// rearranged, so `children` and `pages` never alias.
pub(crate) struct Ranker<'a, T: TreeTraits> {
    pub(crate) sort: &'a T::Sort,
    pub(crate) filter: &'a T::Filter,
    pub(crate) children: &'a Children<T::Leaf>,
    pub(crate) pages: &'a Pages<T>,
}

impl<T: TreeTraits> Ranker<'_, T> {
    pub(crate) fn sorting(&self) -> bool {
        self.sort.is_active()
    }

    /// Display order: the sort predicate, or insertion order when it is off.
    pub(crate) fn compare(&self, left: Slot, right: Slot) -> Ordering {
        let left = self.children.entry(left);
        let right = self.children.entry(right);
        if !self.sorting() {
            return left.inserted.cmp(&right.inserted);
        }
        match (&left.value, &right.value) {
            (Value::Leaf(leaf), Value::Leaf(other)) => self.sort.compare_leaves(
                &Self::leaf_ref(&left.key, leaf),
                &Self::leaf_ref(&right.key, other),
            ),
            (Value::Page(page), Value::Page(other)) => self
                .sort
                .compare_pages(&self.page_ref(*page), &self.page_ref(*other)),
            (Value::Page(page), Value::Leaf(leaf)) => self
                .sort
                .compare_mixed(&self.page_ref(*page), &Self::leaf_ref(&right.key, leaf)),
            (Value::Leaf(leaf), Value::Page(page)) => self
                .sort
                .compare_mixed(&self.page_ref(*page), &Self::leaf_ref(&left.key, leaf))
                .reverse(),
        }
    }

    /// Leaves pass by the filter; pages pass while any child is visible.
    pub(crate) fn passes(&self, slot: Slot) -> bool {
        let entry = self.children.entry(slot);
        match &entry.value {
            Value::Leaf(leaf) => {
                !self.filter.is_active() || self.filter.matches(&Self::leaf_ref(&entry.key, leaf))
            }
            Value::Page(id) => self.pages.page(*id).children.upassed() > 0,
        }
    }

    /// Stable-sort `slots` in place.
    pub(crate) fn sort(&self, slots: &mut [Slot]) {
        if !is_sorted_by(slots, |left, right| self.compare(left, right)) {
            slots.sort_by(|left, right| self.compare(*left, *right));
        }
    }

    /// Merge `fresh` into the already ordered `sorted`.
    pub(crate) fn merge(&self, sorted: Vec<Slot>, fresh: Vec<Slot>) -> Vec<Slot> {
        merge_newdata(sorted, fresh, |left, right| self.compare(left, right))
    }

    const fn leaf_ref<'k>(key: &'k str, leaf: &'k T::Leaf) -> LeafRef<'k, T> {
        LeafRef { name: key, leaf }
    }

    fn page_ref(&self, id: PageId) -> PageRef<'_, T> {
        self.pages.page_ref(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_value(values: &[i32]) -> impl FnMut(Slot, Slot) -> Ordering + '_ {
        move |left, right| values[left].cmp(&values[right])
    }

    #[test]
    fn merge_prefers_existing_entries_on_ties() {
        let values = [1, 3, 5, 3, 0, 6];
        let merged = merge_newdata(vec![0, 1, 2], vec![3, 4, 5], by_value(&values));
        assert_eq!(merged, vec![4, 0, 1, 3, 2, 5]);
    }

    #[test]
    fn merge_sorts_unsorted_fresh_entries_stably() {
        let values = [2, 9, 4, 4, 1];
        let merged = merge_newdata(vec![0], vec![1, 2, 3, 4], by_value(&values));
        assert_eq!(merged, vec![4, 0, 2, 3, 1]);
    }

    #[test]
    fn merge_with_empty_sides() {
        let values = [2, 1];
        assert_eq!(merge_newdata(Vec::new(), vec![0, 1], by_value(&values)), vec![1, 0]);
        assert_eq!(merge_newdata(vec![1, 0], Vec::new(), by_value(&values)), vec![1, 0]);
    }

    #[test]
    fn partition_keeps_relative_order() {
        let (pass, fail) = stable_partition(&[5, 2, 8, 1, 4], |slot| slot % 2 == 0);
        assert_eq!(pass, vec![2, 8, 4]);
        assert_eq!(fail, vec![5, 1]);
    }

    #[test]
    fn sortedness_check() {
        let values = [1, 1, 2, 0];
        assert!(is_sorted_by(&[0, 1, 2], by_value(&values)));
        assert!(!is_sorted_by(&[0, 1, 2, 3], by_value(&values)));
        assert!(is_sorted_by(&[], by_value(&values)));
    }
}
