//! The `SfTree` facade: ownership, navigation and shared page plumbing.

use std::mem;

use tracing::trace;

use crate::config::TreeConfig;
use crate::error::ConfigResult;
use crate::notify::{NoopObserver, Observer, Pending, RowRemap};
use crate::page::{PageId, Pages};
use crate::segment::PathSegmenter;
use crate::storage::{Children, Entry, Slot, Value};
use crate::traits::{Child, ChildIter, LeafRef, Node, PageRef, TreeTraits};

/// Sorted, filtered tree projection over path-keyed leaves.
///
/// The root page exists for the lifetime of the tree and is addressed by
/// [`SfTree::root`]. Every other page is created when a leaf path first
/// needs it and pruned when its last child goes away.
pub struct SfTree<T: TreeTraits, O: Observer = NoopObserver> {
    pub(crate) pages: Pages<T>,
    pub(crate) sort: T::Sort,
    pub(crate) filter: T::Filter,
    pub(crate) segmenter: PathSegmenter,
    pub(crate) config: TreeConfig,
    pub(crate) observer: O,
    pub(crate) leaves: usize,
}

impl<T, O> Default for SfTree<T, O>
where
    T: TreeTraits,
    T::Sort: Default,
    T::Filter: Default,
    O: Observer + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O> SfTree<T, O>
where
    T: TreeTraits,
    T::Sort: Default,
    T::Filter: Default,
    O: Observer + Default,
{
    /// Empty tree with default configuration, predicates and observer.
    #[must_use]
    pub fn new() -> Self {
        Self::build(
            TreeConfig::default(),
            T::Sort::default(),
            T::Filter::default(),
            O::default(),
        )
    }
}

impl<T: TreeTraits, O: Observer> SfTree<T, O> {
    /// Empty tree from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`.
    pub fn from_parts(
        config: TreeConfig,
        sort: T::Sort,
        filter: T::Filter,
        observer: O,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config, sort, filter, observer))
    }

    fn build(config: TreeConfig, sort: T::Sort, filter: T::Filter, observer: O) -> Self {
        Self {
            pages: Pages::new(),
            sort,
            filter,
            segmenter: config.segmenter(),
            config,
            observer,
            leaves: 0,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Active sort predicate.
    pub const fn sort_predicate(&self) -> &T::Sort {
        &self.sort
    }

    /// Active filter predicate.
    pub const fn filter_predicate(&self) -> &T::Filter {
        &self.filter
    }

    /// Observer receiving change notifications.
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer, e.g. to drain recorded events.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consume the tree and keep the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// The root page.
    #[must_use]
    pub const fn root(&self) -> PageId {
        PageId::ROOT
    }

    /// Number of leaves stored, visible or not.
    #[must_use]
    pub const fn leaf_count(&self) -> usize {
        self.leaves
    }

    /// Number of live pages, root included.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.live()
    }

    /// Whether `page` still refers to a live page.
    #[must_use]
    pub fn contains_page(&self, page: PageId) -> bool {
        self.pages.get(page).is_some()
    }

    /// Number of visible children; zero for stale ids.
    #[must_use]
    pub fn child_count(&self, page: PageId) -> usize {
        self.pages.get(page).map_or(0, |page| page.children.upassed())
    }

    /// Number of children including filtered-out ones; zero for stale ids.
    #[must_use]
    pub fn total_children(&self, page: PageId) -> usize {
        self.pages.get(page).map_or(0, |page| page.children.len())
    }

    /// Visible child at `row`.
    #[must_use]
    pub fn child_at(&self, page: PageId, row: usize) -> Option<Node<'_, T>> {
        let children = &self.pages.get(page)?.children;
        if row >= children.upassed() {
            return None;
        }
        let slot = children.slot_at(row)?;
        Some(self.node(children.entry(slot)))
    }

    /// Child named `name` and its position, visible or not.
    ///
    /// The position is a visible row when it is below
    /// [`Self::child_count`].
    #[must_use]
    pub fn child_by_name(&self, page: PageId, name: &str) -> Option<(usize, Node<'_, T>)> {
        let children = &self.pages.get(page)?.children;
        let slot = children.slot_of(name)?;
        let position = children.position_of(slot)?;
        Some((position, self.node(children.entry(slot))))
    }

    /// Parent page and the position of `page` inside it. `None` for the root
    /// and for stale ids.
    #[must_use]
    pub fn parent(&self, page: PageId) -> Option<(PageId, usize)> {
        let current = self.pages.get(page)?;
        let parent = current.parent?;
        let siblings = &self.pages.page(parent).children;
        let position = siblings
            .slot_of(&current.name)
            .and_then(|slot| siblings.position_of(slot))?;
        Some((parent, position))
    }

    /// Read-only view of a page.
    #[must_use]
    pub fn page(&self, page: PageId) -> Option<PageRef<'_, T>> {
        self.pages.get(page).map(|_| self.pages.page_ref(page))
    }

    /// Segment name of a page; empty for the root.
    #[must_use]
    pub fn page_name(&self, page: PageId) -> Option<&str> {
        self.pages.get(page).map(|page| &*page.name)
    }

    /// Aggregate data of a page.
    #[must_use]
    pub fn page_data(&self, page: PageId) -> Option<&T::PageData> {
        self.pages.get(page).map(|page| &page.data)
    }

    /// Ancestors of `page`, root first, ending with `page` itself.
    #[must_use]
    pub fn page_chain(&self, page: PageId) -> Vec<PageId> {
        let mut chain = Vec::new();
        let mut current = Some(page);
        while let Some(id) = current {
            let Some(entry) = self.pages.get(id) else {
                return Vec::new();
            };
            chain.push(id);
            current = entry.parent;
        }
        chain.reverse();
        chain
    }

    /// Whether every page on the way from the root to `page` is visible.
    #[must_use]
    pub fn is_reachable(&self, page: PageId) -> bool {
        let mut current = page;
        loop {
            let Some(entry) = self.pages.get(current) else {
                return false;
            };
            let Some(parent) = entry.parent else {
                return true;
            };
            let siblings = &self.pages.page(parent).children;
            let visible = siblings
                .slot_of(&entry.name)
                .and_then(|slot| siblings.visible_row(slot))
                .is_some();
            if !visible {
                return false;
            }
            current = parent;
        }
    }

    /// Page at `path` (segments without a trailing separator, `""` for the
    /// root).
    #[must_use]
    pub fn find_page(&self, path: &str) -> Option<PageId> {
        if path.is_empty() {
            return Some(PageId::ROOT);
        }
        self.segmenter
            .segments(path)
            .try_fold(PageId::ROOT, |page, name| self.child_page(page, name))
    }

    /// Leaf stored at `path`, visible or not.
    #[must_use]
    pub fn find_leaf(&self, path: &str) -> Option<&T::Leaf> {
        let (dir, name) = match path.rfind(self.segmenter.separator()) {
            Some(split) => (
                &path[..split],
                &path[split + self.segmenter.separator().len_utf8()..],
            ),
            None => ("", path),
        };
        let children = &self.pages.get(self.find_page(dir)?)?.children;
        match &children.entry(children.slot_of(name)?).value {
            Value::Leaf(leaf) => Some(leaf),
            Value::Page(_) => None,
        }
    }

    /// Visible leaves in depth-first display order.
    #[must_use]
    pub fn visible_leaves(&self) -> VisibleLeaves<'_, T> {
        VisibleLeaves {
            pages: &self.pages,
            stack: vec![(PageId::ROOT, 0)],
        }
    }

    fn child_page(&self, page: PageId, name: &str) -> Option<PageId> {
        let children = &self.pages.get(page)?.children;
        children.entry(children.slot_of(name)?).value.as_page()
    }

    fn node<'a>(&'a self, entry: &'a Entry<T::Leaf>) -> Node<'a, T> {
        node_of(&self.pages, entry)
    }

    /// Take a page's children out of the arena so they can be reordered while
    /// sibling pages are read.
    pub(crate) fn detach(&mut self, page: PageId) -> Children<T::Leaf> {
        mem::take(&mut self.pages.page_mut(page).children)
    }

    /// Install a new sequence for a detached page and queue the remap of its
    /// previously visible rows.
    pub(crate) fn commit(
        &mut self,
        page: PageId,
        mut children: Children<T::Leaf>,
        old_visible: &[Slot],
        mut visible: Vec<Slot>,
        hidden: Vec<Slot>,
        mut lost_pages: Vec<PageId>,
        pending: &mut Pending,
    ) {
        let upassed = visible.len();
        visible.extend(hidden);
        children.rearrange(visible, upassed);

        let rows: Vec<Option<usize>> = old_visible
            .iter()
            .map(|slot| children.visible_row(*slot))
            .collect();
        for (slot, row) in old_visible.iter().zip(&rows) {
            if row.is_none() && children.position_of(*slot).is_some() {
                lost_pages.extend(children.entry(*slot).value.as_page());
            }
        }
        self.pages.page_mut(page).children = children;

        let identity = rows.len() == upassed
            && rows
                .iter()
                .enumerate()
                .all(|(old, new)| *new == Some(old));
        if identity && lost_pages.is_empty() {
            return;
        }
        trace!(
            ?page,
            before = old_visible.len(),
            after = upassed,
            lost = lost_pages.len(),
            "page rows remapped"
        );
        pending.remap(RowRemap {
            page,
            rows,
            lost_pages,
        });
    }

    /// Refresh a page's aggregate from its children.
    pub(crate) fn recalculate_page(&mut self, page: PageId) {
        let data = {
            let pages = &self.pages;
            let children = &pages.page(page).children;
            let upassed = children.upassed();
            let iter = children
                .order()
                .iter()
                .enumerate()
                .map(move |(position, slot)| Child {
                    node: node_of(pages, children.entry(*slot)),
                    visible: position < upassed,
                });
            T::recalculate(ChildIter {
                inner: Box::new(iter),
            })
        };
        self.pages.page_mut(page).data = data;
    }
}

fn node_of<'a, T: TreeTraits>(pages: &'a Pages<T>, entry: &'a Entry<T::Leaf>) -> Node<'a, T> {
    match &entry.value {
        Value::Leaf(leaf) => Node::Leaf(LeafRef {
            name: &entry.key,
            leaf,
        }),
        Value::Page(id) => Node::Page(pages.page_ref(*id)),
    }
}

/// Depth-first iterator over visible leaves.
pub struct VisibleLeaves<'a, T: TreeTraits> {
    pages: &'a Pages<T>,
    stack: Vec<(PageId, usize)>,
}

impl<'a, T: TreeTraits> Iterator for VisibleLeaves<'a, T> {
    type Item = &'a T::Leaf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let (page, row) = *top;
            let children = &self.pages.page(page).children;
            if row >= children.upassed() {
                self.stack.pop();
                continue;
            }
            top.1 += 1;
            match &children.entry(children.visible()[row]).value {
                Value::Leaf(leaf) => return Some(leaf),
                Value::Page(id) => self.stack.push((*id, 0)),
            }
        }
    }
}
