//! Row handles that follow their entry across changes.

use crate::notify::{Observer, RowRemap};
use crate::page::PageId;
use crate::traits::TreeTraits;
use crate::tree::SfTree;

/// Handle issued by [`PersistentIndexes::track`].
///
/// Handles carry a generation, so one kept after its slot was reused never
/// resolves to somebody else's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersistentIndex {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Tracked {
    chain: Vec<PageId>,
    row: usize,
}

#[derive(Debug, Clone)]
struct TrackSlot {
    generation: u32,
    tracked: Option<Tracked>,
}

/// Observer keeping tracked rows up to date.
///
/// A handle is invalidated when its row disappears from view, when any page
/// on its ancestor chain stops being visible and on every reset. Invalidated
/// and forgotten slots are reused by later handles.
#[derive(Debug, Clone, Default)]
pub struct PersistentIndexes {
    slots: Vec<TrackSlot>,
    free: Vec<u32>,
}

impl PersistentIndexes {
    /// Track visible `row` of the last page in `chain` (root first).
    ///
    /// # Panics
    ///
    /// Panics when `chain` is empty.
    pub fn track(&mut self, chain: Vec<PageId>, row: usize) -> PersistentIndex {
        assert!(!chain.is_empty(), "a tracked row needs its page chain");
        let tracked = Some(Tracked { chain, row });
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.tracked = tracked;
            return PersistentIndex {
                slot,
                generation: entry.generation,
            };
        }
        let slot = u32::try_from(self.slots.len()).unwrap_or_else(|_| {
            panic!("persistent index table exhausted");
        });
        self.slots.push(TrackSlot {
            generation: 0,
            tracked,
        });
        PersistentIndex {
            slot,
            generation: 0,
        }
    }

    /// Current page and row of a handle, `None` once invalidated.
    #[must_use]
    pub fn resolve(&self, index: PersistentIndex) -> Option<(PageId, usize)> {
        let tracked = self
            .slots
            .get(index.slot as usize)
            .filter(|entry| entry.generation == index.generation)?
            .tracked
            .as_ref()?;
        Some((*tracked.chain.last()?, tracked.row))
    }

    /// Stop tracking a handle and free its slot.
    pub fn forget(&mut self, index: PersistentIndex) {
        let live = self
            .slots
            .get(index.slot as usize)
            .is_some_and(|entry| entry.generation == index.generation && entry.tracked.is_some());
        if live {
            self.release(index.slot);
        }
    }

    /// Number of handles that still resolve.
    #[must_use]
    pub fn live(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.tracked.is_some())
            .count()
    }

    /// Slots ever allocated, live or free.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn release(&mut self, slot: u32) {
        let entry = &mut self.slots[slot as usize];
        entry.tracked = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(slot);
    }

    fn occupied(&self) -> Vec<u32> {
        (0..self.slots.len())
            .filter(|slot| self.slots[*slot].tracked.is_some())
            .filter_map(|slot| u32::try_from(slot).ok())
            .collect()
    }
}

impl Observer for PersistentIndexes {
    fn reset_end(&mut self) {
        for slot in self.occupied() {
            self.release(slot);
        }
    }

    fn rows_remapped(&mut self, remap: &RowRemap) {
        for slot in self.occupied() {
            let Some(tracked) = self.slots[slot as usize].tracked.as_mut() else {
                continue;
            };
            let next = if tracked
                .chain
                .iter()
                .any(|page| remap.lost_pages.contains(page))
            {
                None
            } else if tracked.chain.last() == Some(&remap.page) {
                remap.new_row(tracked.row)
            } else {
                Some(tracked.row)
            };
            match next {
                Some(row) => tracked.row = row,
                None => self.release(slot),
            }
        }
    }
}

impl<T: TreeTraits> SfTree<T, PersistentIndexes> {
    /// Track the visible child at `row` of `page`.
    ///
    /// Returns `None` when the row is not currently on screen.
    pub fn persist(&mut self, page: PageId, row: usize) -> Option<PersistentIndex> {
        if row >= self.child_count(page) || !self.is_reachable(page) {
            return None;
        }
        let chain = self.page_chain(page);
        Some(self.observer.track(chain, row))
    }

    /// Resolve a handle issued by [`Self::persist`].
    #[must_use]
    pub fn resolve(&self, index: PersistentIndex) -> Option<(PageId, usize)> {
        self.observer.resolve(index)
    }
}
