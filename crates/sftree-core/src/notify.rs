//! Change notifications.
//!
//! Mutating calls finish their work first and then report it. Structural
//! changes are bracketed by [`Observer::layout_about_to_change`] and
//! [`Observer::layout_changed`]; in between, every page whose visible rows
//! moved gets one [`RowRemap`]. Content updates that did not move anything are
//! reported through [`Observer::rows_changed`] after the bracket closes.

use crate::page::PageId;

/// Translation of one page's visible rows across a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRemap {
    /// Page whose rows moved.
    pub page: PageId,
    /// `rows[old]` is the new visible row, `None` when the entry disappeared
    /// from view (erased, pruned or filtered out).
    pub rows: Vec<Option<usize>>,
    /// Child pages that were visible before and are not anymore.
    pub lost_pages: Vec<PageId>,
}

impl RowRemap {
    /// New row of `old`, if it is still visible.
    #[must_use]
    pub fn new_row(&self, old: usize) -> Option<usize> {
        self.rows.get(old).copied().flatten()
    }

    /// Number of rows that survived.
    #[must_use]
    pub fn surviving(&self) -> usize {
        self.rows.iter().filter(|row| row.is_some()).count()
    }
}

/// Receiver of change notifications. Every method defaults to a no-op.
pub trait Observer {
    /// The whole tree is about to be rebuilt.
    fn reset_begin(&mut self) {}

    /// The rebuild finished; every previously handed-out row is stale.
    fn reset_end(&mut self) {}

    /// Rows are about to move.
    fn layout_about_to_change(&mut self) {}

    /// Visible rows of one page moved.
    fn rows_remapped(&mut self, remap: &RowRemap) {
        let _ = remap;
    }

    /// All row moves have been reported.
    fn layout_changed(&mut self) {}

    /// Content of visible rows changed in place (rows are post-change).
    fn rows_changed(&mut self, page: PageId, rows: &[usize]) {
        let _ = (page, rows);
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Fan notifications out to two observers, first to `.0`.
impl<A: Observer, B: Observer> Observer for (A, B) {
    fn reset_begin(&mut self) {
        self.0.reset_begin();
        self.1.reset_begin();
    }

    fn reset_end(&mut self) {
        self.0.reset_end();
        self.1.reset_end();
    }

    fn layout_about_to_change(&mut self) {
        self.0.layout_about_to_change();
        self.1.layout_about_to_change();
    }

    fn rows_remapped(&mut self, remap: &RowRemap) {
        self.0.rows_remapped(remap);
        self.1.rows_remapped(remap);
    }

    fn layout_changed(&mut self) {
        self.0.layout_changed();
        self.1.layout_changed();
    }

    fn rows_changed(&mut self, page: PageId, rows: &[usize]) {
        self.0.rows_changed(page, rows);
        self.1.rows_changed(page, rows);
    }
}

/// Notification captured by [`ChangeRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// See [`Observer::reset_begin`].
    ResetBegin,
    /// See [`Observer::reset_end`].
    ResetEnd,
    /// See [`Observer::layout_about_to_change`].
    LayoutAboutToChange,
    /// See [`Observer::rows_remapped`].
    RowsRemapped(RowRemap),
    /// See [`Observer::layout_changed`].
    LayoutChanged,
    /// See [`Observer::rows_changed`].
    RowsChanged {
        /// Page owning the rows.
        page: PageId,
        /// Changed rows.
        rows: Vec<usize>,
    },
}

/// Observer that records notifications as values.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecorder {
    events: Vec<Notification>,
}

impl ChangeRecorder {
    /// Notifications received so far.
    #[must_use]
    pub fn events(&self) -> &[Notification] {
        &self.events
    }

    /// Drain the recorded notifications.
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.events)
    }

    /// Remaps recorded so far.
    pub fn remaps(&self) -> impl Iterator<Item = &RowRemap> {
        self.events.iter().filter_map(|event| match event {
            Notification::RowsRemapped(remap) => Some(remap),
            _ => None,
        })
    }
}

impl Observer for ChangeRecorder {
    fn reset_begin(&mut self) {
        self.events.push(Notification::ResetBegin);
    }

    fn reset_end(&mut self) {
        self.events.push(Notification::ResetEnd);
    }

    fn layout_about_to_change(&mut self) {
        self.events.push(Notification::LayoutAboutToChange);
    }

    fn rows_remapped(&mut self, remap: &RowRemap) {
        self.events.push(Notification::RowsRemapped(remap.clone()));
    }

    fn layout_changed(&mut self) {
        self.events.push(Notification::LayoutChanged);
    }

    fn rows_changed(&mut self, page: PageId, rows: &[usize]) {
        self.events.push(Notification::RowsChanged {
            page,
            rows: rows.to_vec(),
        });
    }
}

/// Work collected during a mutating call, reported once it completes.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    remaps: Vec<RowRemap>,
    changed: Vec<(PageId, Vec<usize>)>,
}

impl Pending {
    pub(crate) fn remap(&mut self, remap: RowRemap) {
        self.remaps.push(remap);
    }

    pub(crate) fn changed(&mut self, page: PageId, mut rows: Vec<usize>) {
        if rows.is_empty() {
            return;
        }
        rows.sort_unstable();
        self.changed.push((page, rows));
    }

    pub(crate) fn dispatch<O: Observer>(self, observer: &mut O) {
        if !self.remaps.is_empty() {
            observer.layout_about_to_change();
            for remap in &self.remaps {
                observer.rows_remapped(remap);
            }
            observer.layout_changed();
        }
        for (page, rows) in &self.changed {
            observer.rows_changed(*page, rows);
        }
    }
}
