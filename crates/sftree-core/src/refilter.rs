//! Predicate changes: resorting and refiltering in place.

use tracing::debug;

use crate::notify::{Observer, Pending};
use crate::order::{Ranker, stable_partition};
use crate::page::PageId;
use crate::traits::{FilterPredicate, RefilterType, SortPredicate, TreeTraits};
use crate::tree::SfTree;

impl<T: TreeTraits, O: Observer> SfTree<T, O> {
    /// Install a new sort predicate and reorder every visible page.
    ///
    /// An equal predicate is a no-op. Switching sorting off restores
    /// insertion order.
    pub fn sort_by(&mut self, sort: T::Sort) {
        if sort == self.sort {
            return;
        }
        self.sort = sort;
        debug!(active = self.sort.is_active(), "resorting tree");
        let mut pending = Pending::default();
        self.resort_page(PageId::ROOT, &mut pending);
        pending.dispatch(&mut self.observer);
    }

    /// Install a new filter predicate and recompute visibility.
    ///
    /// The predicate decides how much work is needed through
    /// [`FilterPredicate::refilter_type`]. Narrowing changes only revisit
    /// visible entries when incremental refiltering is enabled.
    pub fn filter_by(&mut self, filter: T::Filter) {
        let requested = filter.refilter_type(&self.filter);
        self.filter = filter;
        let kind = match requested {
            RefilterType::Incremental if !self.config.incremental_refilter => RefilterType::Full,
            kind => kind,
        };
        debug!(?requested, ?kind, "refiltering tree");

        let mut pending = Pending::default();
        match kind {
            RefilterType::Same => return,
            RefilterType::Incremental => self.refilter_visible(PageId::ROOT, &mut pending),
            RefilterType::Full => self.refilter_all(PageId::ROOT, &mut pending),
        }
        pending.dispatch(&mut self.observer);
    }

    /// Re-run the full filter with the current predicate, e.g. after leaf
    /// content changed behind the tree's back.
    pub fn refilter(&mut self) {
        debug!("forced full refilter");
        let mut pending = Pending::default();
        self.refilter_all(PageId::ROOT, &mut pending);
        pending.dispatch(&mut self.observer);
    }

    fn visible_child_pages(&self, page: PageId) -> Vec<PageId> {
        let children = &self.pages.page(page).children;
        children
            .visible()
            .iter()
            .filter_map(|slot| children.entry(*slot).value.as_page())
            .collect()
    }

    fn resort_page(&mut self, page: PageId, pending: &mut Pending) {
        for child in self.visible_child_pages(page) {
            self.resort_page(child, pending);
        }
        let children = self.detach(page);
        let old_visible = children.visible().to_vec();
        let hidden = children.hidden().to_vec();
        let mut visible = old_visible.clone();
        Ranker {
            sort: &self.sort,
            filter: &self.filter,
            children: &children,
            pages: &self.pages,
        }
        .sort(&mut visible);
        self.commit(page, children, &old_visible, visible, hidden, Vec::new(), pending);
    }

    /// Narrowing pass: only visible entries can change state, and they can
    /// only disappear.
    fn refilter_visible(&mut self, page: PageId, pending: &mut Pending) {
        for child in self.visible_child_pages(page) {
            self.refilter_visible(child, pending);
        }
        let children = self.detach(page);
        let old_visible = children.visible().to_vec();
        let (visible, hidden) = {
            let ranker = Ranker {
                sort: &self.sort,
                filter: &self.filter,
                children: &children,
                pages: &self.pages,
            };
            let (mut visible, mut dropped) =
                stable_partition(&old_visible, |slot| ranker.passes(slot));
            ranker.sort(&mut visible);
            dropped.extend_from_slice(children.hidden());
            (visible, dropped)
        };
        self.commit(page, children, &old_visible, visible, hidden, Vec::new(), pending);
        self.recalculate_page(page);
    }

    /// Re-test every entry of every page.
    fn refilter_all(&mut self, page: PageId, pending: &mut Pending) {
        let child_pages: Vec<PageId> = {
            let children = &self.pages.page(page).children;
            children
                .order()
                .iter()
                .filter_map(|slot| children.entry(*slot).value.as_page())
                .collect()
        };
        for child in child_pages {
            self.refilter_all(child, pending);
        }
        let children = self.detach(page);
        let old_visible = children.visible().to_vec();
        let (visible, hidden) = {
            let ranker = Ranker {
                sort: &self.sort,
                filter: &self.filter,
                children: &children,
                pages: &self.pages,
            };
            let (mut visible, hidden) =
                stable_partition(children.order(), |slot| ranker.passes(slot));
            ranker.sort(&mut visible);
            (visible, hidden)
        };
        self.commit(page, children, &old_visible, visible, hidden, Vec::new(), pending);
        self.recalculate_page(page);
    }
}
