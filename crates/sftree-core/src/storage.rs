//! Per-page children storage.
//!
//! Entries live in a slot arena whose indices never change while the entry
//! is alive. A hash index maps a segment name to its slot, and a separate
//! order vector defines the positional (display) sequence. Rearranging a page
//! only rewrites the order vector.
//!
//! Every entry also records when it was inserted, which is the sequence used
//! while no sort is active.

use std::collections::HashMap;

use ahash::RandomState;

use crate::page::PageId;

/// Stable handle of an entry inside one page's children.
pub(crate) type Slot = usize;

const NO_POSITION: usize = usize::MAX;

/// Payload of a child entry.
#[derive(Debug)]
pub(crate) enum Value<L> {
    Leaf(L),
    Page(PageId),
}

impl<L> Value<L> {
    pub(crate) const fn as_page(&self) -> Option<PageId> {
        match self {
            Self::Page(id) => Some(*id),
            Self::Leaf(_) => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Entry<L> {
    pub(crate) key: Box<str>,
    pub(crate) value: Value<L>,
    pub(crate) inserted: u64,
}

/// Dual-indexed children of a page: unique by key, sequenced by position.
///
/// The first `upassed` entries of the sequence are the visible ones.
#[derive(Debug)]
pub(crate) struct Children<L> {
    entries: Vec<Option<Entry<L>>>,
    vacant: Vec<Slot>,
    by_key: HashMap<Box<str>, Slot, RandomState>,
    order: Vec<Slot>,
    position: Vec<usize>,
    upassed: usize,
    inserts: u64,
}

impl<L> Default for Children<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
            by_key: HashMap::with_hasher(RandomState::new()),
            order: Vec::new(),
            position: Vec::new(),
            upassed: 0,
            inserts: 0,
        }
    }
}

impl<L> Children<L> {
    /// Number of live entries, visible or not.
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Length of the visible prefix of the sequence.
    pub(crate) const fn upassed(&self) -> usize {
        self.upassed
    }

    /// Upper bound (exclusive) of slot indices ever handed out.
    pub(crate) fn slot_capacity(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn order(&self) -> &[Slot] {
        &self.order
    }

    pub(crate) fn visible(&self) -> &[Slot] {
        &self.order[..self.upassed]
    }

    pub(crate) fn hidden(&self) -> &[Slot] {
        &self.order[self.upassed..]
    }

    pub(crate) fn slot_of(&self, key: &str) -> Option<Slot> {
        self.by_key.get(key).copied()
    }

    pub(crate) fn slot_at(&self, position: usize) -> Option<Slot> {
        self.order.get(position).copied()
    }

    /// Current sequence position of a live slot.
    pub(crate) fn position_of(&self, slot: Slot) -> Option<usize> {
        self.position
            .get(slot)
            .copied()
            .filter(|position| *position != NO_POSITION)
    }

    /// Visible row of a live slot, `None` when hidden or vacant.
    pub(crate) fn visible_row(&self, slot: Slot) -> Option<usize> {
        self.position_of(slot)
            .filter(|position| *position < self.upassed)
    }

    pub(crate) fn entry(&self, slot: Slot) -> &Entry<L> {
        match self.entries.get(slot) {
            Some(Some(entry)) => entry,
            _ => panic!("slot {slot} is vacant"),
        }
    }

    pub(crate) fn entry_mut(&mut self, slot: Slot) -> &mut Entry<L> {
        match self.entries.get_mut(slot) {
            Some(Some(entry)) => entry,
            _ => panic!("slot {slot} is vacant"),
        }
    }

    /// Insert a new entry at the end of the hidden region.
    ///
    /// Returns `None` and leaves the container untouched when the key is
    /// already present.
    pub(crate) fn insert_unique(&mut self, key: Box<str>, value: Value<L>) -> Option<Slot> {
        if self.by_key.contains_key(&key) {
            return None;
        }
        let entry = Entry {
            key: key.clone(),
            value,
            inserted: self.inserts,
        };
        self.inserts += 1;
        let slot = if let Some(slot) = self.vacant.pop() {
            self.entries[slot] = Some(entry);
            slot
        } else {
            self.entries.push(Some(entry));
            self.position.push(NO_POSITION);
            self.entries.len() - 1
        };
        self.by_key.insert(key, slot);
        self.position[slot] = self.order.len();
        self.order.push(slot);
        Some(slot)
    }

    /// Free a slot. The caller must follow up with [`Self::rearrange`] using
    /// an order that no longer mentions it.
    pub(crate) fn take(&mut self, slot: Slot) -> Entry<L> {
        let Some(entry) = self.entries.get_mut(slot).and_then(Option::take) else {
            panic!("slot {slot} is vacant");
        };
        self.by_key.remove(&entry.key);
        self.position[slot] = NO_POSITION;
        self.vacant.push(slot);
        entry
    }

    /// Replace the sequence with `order`, whose first `upassed` slots are
    /// visible. Slots are never moved in memory.
    pub(crate) fn rearrange(&mut self, order: Vec<Slot>, upassed: usize) {
        assert!(upassed <= order.len(), "visible prefix exceeds sequence");
        debug_assert_eq!(order.len(), self.by_key.len(), "order must cover every live slot");
        for (position, slot) in order.iter().enumerate() {
            self.position[*slot] = position;
        }
        self.order = order;
        self.upassed = upassed;
    }

    /// Iterate live entries in sequence order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entry<L>> + '_ {
        self.order.iter().map(|slot| self.entry(*slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(children: &mut Children<u32>, key: &str, value: u32) -> Slot {
        children
            .insert_unique(key.into(), Value::Leaf(value))
            .expect("unique key")
    }

    #[test]
    fn insert_unique_rejects_duplicates() {
        let mut children = Children::default();
        let slot = leaf(&mut children, "a", 1);
        assert!(children.insert_unique("a".into(), Value::Leaf(2)).is_none());
        assert_eq!(children.len(), 1);
        assert_eq!(children.slot_of("a"), Some(slot));
        assert!(matches!(children.entry(slot).value, Value::Leaf(1)));
    }

    #[test]
    fn rearrange_keeps_slots_stable() {
        let mut children = Children::default();
        let a = leaf(&mut children, "a", 1);
        let b = leaf(&mut children, "b", 2);
        let c = leaf(&mut children, "c", 3);

        children.rearrange(vec![c, a, b], 2);

        assert_eq!(children.order(), &[c, a, b]);
        assert_eq!(children.visible(), &[c, a]);
        assert_eq!(children.hidden(), &[b]);
        assert_eq!(children.slot_of("a"), Some(a));
        assert_eq!(children.visible_row(a), Some(1));
        assert_eq!(children.visible_row(b), None);
        assert_eq!(children.position_of(b), Some(2));
        assert_eq!(children.slot_at(0), Some(c));
    }

    #[test]
    fn reused_slots_rank_after_older_entries() {
        let mut children = Children::default();
        let a = leaf(&mut children, "a", 1);
        let b = leaf(&mut children, "b", 2);
        children.take(a);
        children.rearrange(vec![b], 1);

        let c = leaf(&mut children, "c", 3);
        assert_eq!(c, a);
        assert!(children.entry(b).inserted < children.entry(c).inserted);
    }

    #[test]
    fn take_then_reuse_vacant_slot() {
        let mut children = Children::default();
        let a = leaf(&mut children, "a", 1);
        let b = leaf(&mut children, "b", 2);
        children.rearrange(vec![a, b], 2);

        let entry = children.take(a);
        assert_eq!(&*entry.key, "a");
        children.rearrange(vec![b], 1);
        assert_eq!(children.slot_of("a"), None);
        assert_eq!(children.position_of(a), None);

        let again = leaf(&mut children, "z", 9);
        assert_eq!(again, a);
        assert_eq!(children.slot_capacity(), 2);
        assert_eq!(children.order(), &[b, again]);
        assert_eq!(children.upassed(), 1);
        let keys: Vec<_> = children.iter().map(|entry| &*entry.key).collect();
        assert_eq!(keys, ["b", "z"]);
    }
}
