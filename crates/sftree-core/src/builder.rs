//! Wholesale construction from a flat record set.

use std::iter::Peekable;
use std::vec;

use tracing::debug;

use crate::notify::Observer;
use crate::order::{Ranker, stable_partition};
use crate::page::PageId;
use crate::segment::{PathSegmenter, Segment};
use crate::storage::Value;
use crate::traits::TreeTraits;
use crate::tree::SfTree;

type Records<L> = Peekable<vec::IntoIter<L>>;

impl<T: TreeTraits, O: Observer> SfTree<T, O> {
    /// Replace the whole content with `records`.
    ///
    /// Every previously handed-out page id becomes stale. The observer sees a
    /// reset bracket and nothing else.
    ///
    /// # Panics
    ///
    /// Panics on malformed paths, on two records sharing a path and when a leaf
    /// path collides with a page of the same name.
    pub fn assign<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = T::Leaf>,
    {
        let mut records: Vec<T::Leaf> = records.into_iter().collect();
        records.sort_by(|left, right| T::leaf_path(left).cmp(T::leaf_path(right)));
        debug!(leaves = records.len(), "assigning tree content");

        self.observer.reset_begin();
        self.pages.reset();
        self.leaves = records.len();
        let mut records = records.into_iter().peekable();
        self.build_page(PageId::ROOT, "", &mut records);
        debug_assert!(records.peek().is_none(), "records left after build");
        self.observer.reset_end();
    }

    /// Drop every record and page below the root.
    pub fn clear(&mut self) {
        self.assign(Vec::new());
    }

    fn build_page(&mut self, page: PageId, prefix: &str, records: &mut Records<T::Leaf>) {
        let segmenter = self.segmenter;
        while let Some(next) = records.peek() {
            let path = T::leaf_path(next);
            if !PathSegmenter::is_subelement(prefix, path) {
                break;
            }
            match segmenter.analyze(prefix.len(), path) {
                Segment::Leaf(name) => {
                    let key: Box<str> = name.into();
                    let Some(leaf) = records.next() else {
                        break;
                    };
                    let children = &mut self.pages.page_mut(page).children;
                    assert!(
                        children.slot_of(&key).is_none(),
                        "duplicate entry {key:?} below {prefix:?}"
                    );
                    children.insert_unique(key, Value::Leaf(leaf));
                }
                Segment::Page { name, prefix_end } => {
                    let key: Box<str> = name.into();
                    let child_prefix = path[..prefix_end].to_owned();
                    assert!(
                        self.pages.page(page).children.slot_of(&key).is_none(),
                        "page {child_prefix:?} collides with an existing entry"
                    );
                    let child = self.pages.alloc(page, key.clone());
                    self.build_page(child, &child_prefix, records);
                    self.pages
                        .page_mut(page)
                        .children
                        .insert_unique(key, Value::Page(child));
                }
            }
        }
        self.settle_built_page(page);
    }

    /// Filter, sort and aggregate a page whose children are all in place.
    fn settle_built_page(&mut self, page: PageId) {
        let mut children = self.detach(page);
        let (mut order, upassed) = {
            let ranker = Ranker {
                sort: &self.sort,
                filter: &self.filter,
                children: &children,
                pages: &self.pages,
            };
            let (mut visible, hidden) =
                stable_partition(children.order(), |slot| ranker.passes(slot));
            ranker.sort(&mut visible);
            let upassed = visible.len();
            visible.extend(hidden);
            (visible, upassed)
        };
        order.shrink_to_fit();
        children.rearrange(order, upassed);
        self.pages.page_mut(page).children = children;
        self.recalculate_page(page);
    }
}
