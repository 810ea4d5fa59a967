//! Owner-supplied behaviour: record access, aggregates, sort and filter.

use std::cmp::Ordering;
use std::fmt;

use crate::page::PageId;

/// Bundle of types and hooks an owner plugs into [`crate::SfTree`].
///
/// Implementors are usually zero-sized marker types.
pub trait TreeTraits: Sized {
    /// Record stored at the end of every path.
    type Leaf;
    /// Rolled-up data kept on every page.
    type PageData: Default;
    /// Ordering of visible siblings.
    type Sort: SortPredicate<Self>;
    /// Visibility test for leaves.
    type Filter: FilterPredicate<Self>;

    /// Full path of a leaf, segments joined by the configured separator.
    fn leaf_path(leaf: &Self::Leaf) -> &str;

    /// Recompute a page's aggregate from all of its children.
    ///
    /// Called bottom-up after every structural change, so child pages already
    /// carry fresh data.
    fn recalculate(children: ChildIter<'_, Self>) -> Self::PageData {
        let _ = children;
        Self::PageData::default()
    }
}

/// Outcome of comparing a new filter with the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefilterType {
    /// Nothing to do.
    Same,
    /// Everything hidden stays hidden; only visible entries are re-tested.
    Incremental,
    /// Every entry must be re-tested.
    Full,
}

/// Ordering of siblings.
///
/// Page/page and leaf/leaf comparisons must each be a total preorder. Ties
/// keep their existing relative order.
pub trait SortPredicate<T: TreeTraits>: PartialEq {
    /// `false` means "no sort": siblings are kept in insertion order.
    fn is_active(&self) -> bool;

    /// Compare two leaves.
    fn compare_leaves(&self, left: &LeafRef<'_, T>, right: &LeafRef<'_, T>) -> Ordering;

    /// Compare two pages.
    fn compare_pages(&self, left: &PageRef<'_, T>, right: &PageRef<'_, T>) -> Ordering;

    /// Place a page relative to a leaf. Pages come first by default.
    fn compare_mixed(&self, page: &PageRef<'_, T>, leaf: &LeafRef<'_, T>) -> Ordering {
        let _ = (page, leaf);
        Ordering::Less
    }
}

/// Visibility test for leaves. Pages are visible when any child is.
pub trait FilterPredicate<T: TreeTraits> {
    /// `false` means every leaf passes and [`Self::matches`] is not consulted.
    fn is_active(&self) -> bool;

    /// Whether a leaf passes.
    fn matches(&self, leaf: &LeafRef<'_, T>) -> bool;

    /// Classify the switch from `previous` to `self`.
    fn refilter_type(&self, previous: &Self) -> RefilterType;
}

/// Read-only view of a leaf.
pub struct LeafRef<'a, T: TreeTraits> {
    /// Last path segment, as split by the tree's separator.
    pub name: &'a str,
    /// The record.
    pub leaf: &'a T::Leaf,
}

impl<T: TreeTraits> Clone for LeafRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: TreeTraits> Copy for LeafRef<'_, T> {}

impl<T: TreeTraits> fmt::Debug for LeafRef<'_, T>
where
    T::Leaf: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LeafRef")
            .field("name", &self.name)
            .field("leaf", self.leaf)
            .finish()
    }
}

/// Read-only view of a page.
pub struct PageRef<'a, T: TreeTraits> {
    /// Page identity.
    pub id: PageId,
    /// Segment name of the page.
    pub name: &'a str,
    /// Aggregate data.
    pub data: &'a T::PageData,
    /// Number of visible children.
    pub visible_children: usize,
}

impl<T: TreeTraits> Clone for PageRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: TreeTraits> Copy for PageRef<'_, T> {}

impl<T: TreeTraits> fmt::Debug for PageRef<'_, T>
where
    T::PageData: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PageRef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("data", self.data)
            .field("visible_children", &self.visible_children)
            .finish()
    }
}

/// A child of a page: a leaf or a nested page.
pub enum Node<'a, T: TreeTraits> {
    /// Leaf record.
    Leaf(LeafRef<'a, T>),
    /// Nested page.
    Page(PageRef<'a, T>),
}

impl<'a, T: TreeTraits> Node<'a, T> {
    /// The leaf, if this node is one.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&'a T::Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf.leaf),
            Self::Page(_) => None,
        }
    }

    /// Segment name of the child.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        match self {
            Self::Leaf(leaf) => leaf.name,
            Self::Page(page) => page.name,
        }
    }

    /// The page, if this node is one.
    #[must_use]
    pub const fn as_page(&self) -> Option<PageRef<'a, T>> {
        match self {
            Self::Page(page) => Some(*page),
            Self::Leaf(_) => None,
        }
    }
}

impl<T: TreeTraits> Clone for Node<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: TreeTraits> Copy for Node<'_, T> {}

impl<T: TreeTraits> fmt::Debug for Node<'_, T>
where
    T::Leaf: fmt::Debug,
    T::PageData: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => formatter.debug_tuple("Leaf").field(leaf).finish(),
            Self::Page(page) => formatter.debug_tuple("Page").field(page).finish(),
        }
    }
}

/// Child handed to [`TreeTraits::recalculate`].
pub struct Child<'a, T: TreeTraits> {
    /// The child itself.
    pub node: Node<'a, T>,
    /// Whether the child currently passes the filter.
    pub visible: bool,
}

/// Iterator over every child of a page, visible ones first.
pub struct ChildIter<'a, T: TreeTraits> {
    pub(crate) inner: Box<dyn Iterator<Item = Child<'a, T>> + 'a>,
}

impl<'a, T: TreeTraits> Iterator for ChildIter<'a, T> {
    type Item = Child<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Sort predicate that never reorders anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unsorted;

impl<T: TreeTraits> SortPredicate<T> for Unsorted {
    fn is_active(&self) -> bool {
        false
    }

    fn compare_leaves(&self, _: &LeafRef<'_, T>, _: &LeafRef<'_, T>) -> Ordering {
        Ordering::Equal
    }

    fn compare_pages(&self, _: &PageRef<'_, T>, _: &PageRef<'_, T>) -> Ordering {
        Ordering::Equal
    }

    fn compare_mixed(&self, _: &PageRef<'_, T>, _: &LeafRef<'_, T>) -> Ordering {
        Ordering::Equal
    }
}

/// Filter that lets everything through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassAll;

impl<T: TreeTraits> FilterPredicate<T> for PassAll {
    fn is_active(&self) -> bool {
        false
    }

    fn matches(&self, _: &LeafRef<'_, T>) -> bool {
        true
    }

    fn refilter_type(&self, _: &Self) -> RefilterType {
        RefilterType::Same
    }
}
