//! Minimal tree binding used by the unit tests.

use std::cmp::Ordering;

use crate::notify::Observer;
use crate::page::PageId;
use crate::traits::{
    FilterPredicate, LeafRef, Node, PageRef, RefilterType, SortPredicate, TreeTraits,
};
use crate::tree::SfTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Item {
    pub(crate) path: String,
    pub(crate) value: u32,
}

pub(crate) fn item(path: &str, value: u32) -> Item {
    Item {
        path: path.to_owned(),
        value,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Total {
    pub(crate) sum: u64,
    pub(crate) visible: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum DemoSort {
    #[default]
    Off,
    Name,
    Value,
}

impl SortPredicate<Demo> for DemoSort {
    fn is_active(&self) -> bool {
        *self != Self::Off
    }

    fn compare_leaves(&self, left: &LeafRef<'_, Demo>, right: &LeafRef<'_, Demo>) -> Ordering {
        match self {
            Self::Off => Ordering::Equal,
            Self::Name => left.name.cmp(right.name),
            Self::Value => left
                .leaf
                .value
                .cmp(&right.leaf.value)
                .then_with(|| left.name.cmp(right.name)),
        }
    }

    fn compare_pages(&self, left: &PageRef<'_, Demo>, right: &PageRef<'_, Demo>) -> Ordering {
        match self {
            Self::Off => Ordering::Equal,
            Self::Name => left.name.cmp(right.name),
            Self::Value => left
                .data
                .sum
                .cmp(&right.data.sum)
                .then_with(|| left.name.cmp(right.name)),
        }
    }
}

/// Hides leaves whose value is below the threshold; zero shows everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MinValue(pub(crate) u32);

impl FilterPredicate<Demo> for MinValue {
    fn is_active(&self) -> bool {
        self.0 > 0
    }

    fn matches(&self, leaf: &LeafRef<'_, Demo>) -> bool {
        leaf.leaf.value >= self.0
    }

    fn refilter_type(&self, previous: &Self) -> RefilterType {
        match self.0.cmp(&previous.0) {
            Ordering::Equal => RefilterType::Same,
            Ordering::Greater => RefilterType::Incremental,
            Ordering::Less => RefilterType::Full,
        }
    }
}

pub(crate) struct Demo;

impl TreeTraits for Demo {
    type Leaf = Item;
    type PageData = Total;
    type Sort = DemoSort;
    type Filter = MinValue;

    fn leaf_path(leaf: &Item) -> &str {
        &leaf.path
    }

    fn recalculate(children: crate::traits::ChildIter<'_, Self>) -> Total {
        children.fold(Total::default(), |mut total, child| {
            total.sum += match child.node {
                Node::Leaf(leaf) => u64::from(leaf.leaf.value),
                Node::Page(page) => page.data.sum,
            };
            if child.visible {
                total.visible += 1;
            }
            total
        })
    }
}

/// Visible child names of `page`, in row order.
pub(crate) fn rows<O: Observer>(tree: &SfTree<Demo, O>, page: PageId) -> Vec<String> {
    (0..tree.child_count(page))
        .filter_map(|row| tree.child_at(page, row))
        .map(|node| match node {
            Node::Leaf(leaf) => leaf.name.to_owned(),
            Node::Page(page) => format!("{}/", page.name),
        })
        .collect()
}

/// Visible leaf paths in display order.
pub(crate) fn visible_paths<O: Observer>(tree: &SfTree<Demo, O>) -> Vec<String> {
    tree.visible_leaves().map(|leaf| leaf.path.clone()).collect()
}
