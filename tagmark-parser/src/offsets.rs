use std::collections::BTreeSet;

use serde::Serialize;

/// A single `(position, amount)` record: `amount` characters of structural markup start
/// at source `position`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OffsetEntry {
    pub position: usize,
    pub amount: isize,
}

/// Ordered set of offset entries recording where markup was removed.
///
/// Renderers that strip markup (or escape text) use it to translate positions between
/// their output and the original source. Entries are ordered by position then amount;
/// adding an entry that is already present is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OffsetLedger {
    entries: BTreeSet<OffsetEntry>,
}

impl OffsetLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, position: usize, amount: isize) {
        self.entries.insert(OffsetEntry { position, amount });
    }

    /// Sum of the amounts of every entry whose position is at or before `index`.
    #[must_use]
    pub fn compute_offset_from_index(&self, index: usize) -> isize {
        self.entries
            .iter()
            .take_while(|entry| entry.position <= index)
            .map(|entry| entry.amount)
            .sum()
    }

    /// Sum of all amounts.
    #[must_use]
    pub fn total(&self) -> isize {
        self.entries.iter().map(|entry| entry.amount).sum()
    }

    /// Map an index in markup-free output back onto the source.
    ///
    /// Every entry at or before the running source index pushes it past the removed
    /// span, so the result points at the same character in the original buffer.
    #[must_use]
    pub fn map_to_source(&self, output_index: usize) -> usize {
        let mut index = output_index;
        for entry in &self.entries {
            if entry.position > index {
                break;
            }
            index = index.saturating_add_signed(entry.amount);
        }
        index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OffsetEntry> {
        self.entries.iter()
    }

    /// Drop every entry positioned at or after `position`.
    pub(crate) fn discard_from(&mut self, position: usize) {
        let _discarded = self.entries.split_off(&OffsetEntry {
            position,
            amount: isize::MIN,
        });
    }

    /// Drop every entry positioned in `begin..end`.
    pub(crate) fn discard_range(&mut self, begin: usize, end: usize) {
        self.entries
            .retain(|entry| entry.position < begin || entry.position >= end);
    }
}

impl<'a> IntoIterator for &'a OffsetLedger {
    type Item = &'a OffsetEntry;
    type IntoIter = std::collections::btree_set::Iter<'a, OffsetEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
