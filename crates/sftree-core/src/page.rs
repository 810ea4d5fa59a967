//! Generational arena holding every page of a tree.

use std::fmt;

use crate::storage::Children;
use crate::traits::{PageRef, TreeTraits};

/// Identity of a page.
///
/// Ids carry a generation, so an id kept after its page was pruned never
/// resolves to a page created later in the same slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    index: u32,
    generation: u32,
}

impl PageId {
    pub(crate) const ROOT: Self = Self {
        index: 0,
        generation: 0,
    };

    #[cfg(test)]
    pub(crate) const fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for PageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "PageId({}v{})", self.index, self.generation)
    }
}

pub(crate) struct Page<T: TreeTraits> {
    pub(crate) parent: Option<PageId>,
    pub(crate) name: Box<str>,
    pub(crate) data: T::PageData,
    pub(crate) children: Children<T::Leaf>,
}

impl<T: TreeTraits> Page<T> {
    fn new(parent: Option<PageId>, name: Box<str>) -> Self {
        Self {
            parent,
            name,
            data: T::PageData::default(),
            children: Children::default(),
        }
    }
}

struct PageSlot<T: TreeTraits> {
    generation: u32,
    page: Option<Page<T>>,
}

pub(crate) struct Pages<T: TreeTraits> {
    slots: Vec<PageSlot<T>>,
    free: Vec<u32>,
}

impl<T: TreeTraits> Pages<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![PageSlot {
                generation: 0,
                page: Some(Page::new(None, "".into())),
            }],
            free: Vec::new(),
        }
    }

    pub(crate) fn get(&self, id: PageId) -> Option<&Page<T>> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.page.as_ref())
    }

    fn get_mut(&mut self, id: PageId) -> Option<&mut Page<T>> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.page.as_mut())
    }

    /// Borrow a page the engine knows to be alive.
    pub(crate) fn page(&self, id: PageId) -> &Page<T> {
        self.get(id)
            .unwrap_or_else(|| panic!("{id:?} is not a live page"))
    }

    pub(crate) fn page_mut(&mut self, id: PageId) -> &mut Page<T> {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("{id:?} is not a live page"))
    }

    pub(crate) fn page_ref(&self, id: PageId) -> PageRef<'_, T> {
        let page = self.page(id);
        PageRef {
            id,
            name: &page.name,
            data: &page.data,
            visible_children: page.children.upassed(),
        }
    }

    pub(crate) fn alloc(&mut self, parent: PageId, name: Box<str>) -> PageId {
        let page = Page::new(Some(parent), name);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.page = Some(page);
            PageId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or_else(|_| {
                panic!("page arena exhausted");
            });
            self.slots.push(PageSlot {
                generation: 0,
                page: Some(page),
            });
            PageId {
                index,
                generation: 0,
            }
        }
    }

    /// Free a page and every page below it.
    pub(crate) fn release(&mut self, id: PageId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            assert!(id != PageId::ROOT, "the root page is never released");
            let slot = &mut self.slots[id.slot()];
            let Some(page) = slot.page.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            stack.extend(page.children.iter().filter_map(|entry| entry.value.as_page()));
        }
    }

    /// Drop every page except the root, whose children are cleared.
    pub(crate) fn reset(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate().skip(1) {
            if slot.page.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(u32::try_from(index).unwrap_or(u32::MAX));
            }
        }
        let root = self.page_mut(PageId::ROOT);
        root.children = Children::default();
        root.data = T::PageData::default();
    }

    /// Number of live pages, root included.
    pub(crate) fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.page.is_some()).count()
    }
}
