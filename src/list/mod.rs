//! The unit list: an ordered index of addressable units plus a cached
//! current position.
//!
//! Units are appended in document order during a build pass and replaced
//! wholesale on rebuild. Callers never get mutable access to the backing
//! sequence; every mutation goes through an operation that keeps the
//! ordering invariant and the neighbour cache consistent.
//!
//! - [`search`]: offset → index resolution for both views
//! - [`navigate`]: next/previous stops, whitespace and boundary-line pairing
//! - [`range`]: selection and page-range queries
//! - [`locate`]: document node → index

mod locate;
mod navigate;
mod range;
mod search;

use tracing::debug;

use crate::error::{Result, SyncError};
use crate::unit::resolve;
use crate::unit::{Span, Unit, UnitId};

/// Which edge of a unit an offset adjustment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Offsets of the units surrounding the current one.
///
/// Recomputed whenever the current unit is assigned; `None` means there is no
/// such neighbour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub prev_text_end: Option<usize>,
    pub next_text_start: Option<usize>,
    /// End of the nearest earlier unit with braille presence
    pub prev_braille_end: Option<usize>,
    /// Start of the nearest later unit with braille presence
    pub next_braille_start: Option<usize>,
}

impl Neighbors {
    fn around(units: &[Unit], index: usize) -> Self {
        let later = units.get(index + 1..).unwrap_or_default();
        let earlier = units.get(..index).unwrap_or_default();
        Self {
            prev_text_end: index.checked_sub(1).map(|p| resolve::text_end(units, p)),
            next_text_start: (index + 1 < units.len()).then(|| resolve::text_start(units, index + 1)),
            prev_braille_end: earlier
                .iter()
                .rev()
                .find_map(Unit::braille_span)
                .map(|s| s.end),
            next_braille_start: later.iter().find_map(Unit::braille_span).map(|s| s.start),
        }
    }
}

/// Ordered index of addressable units.
#[derive(Debug, Clone, Default)]
pub struct UnitList {
    units: Vec<Unit>,
    current: Option<usize>,
    neighbors: Neighbors,
    next_id: u32,
}

impl UnitList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit at the end of the list and return its id.
    ///
    /// Units must arrive in ascending document order.
    pub fn push(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        unit.set_id(id);
        self.units.push(unit);
        id
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// Index of the unit with the given id.
    pub fn index_of(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id() == id)
    }

    /// Resolved text start of the unit at `index`.
    pub fn start(&self, index: usize) -> usize {
        resolve::text_start(&self.units, index)
    }

    /// Resolved text end of the unit at `index`.
    pub fn end(&self, index: usize) -> usize {
        resolve::text_end(&self.units, index)
    }

    pub fn text_span(&self, index: usize) -> Span {
        resolve::text_span(&self.units, index)
    }

    /// Index of the first unit whose resolved text start is at or after
    /// `offset`, or `len()` if there is none.
    pub fn first_starting_at(&self, offset: usize) -> usize {
        self.partition_point(|i| self.start(i) < offset)
    }

    /// Index of the first unit whose resolved text end is at or after
    /// `offset`, or `len()` if there is none.
    pub fn first_ending_at(&self, offset: usize) -> usize {
        self.partition_point(|i| self.end(i) < offset)
    }

    /// Binary search over an ordered list; `pred` must hold for a prefix.
    fn partition_point(&self, pred: impl Fn(usize) -> bool) -> usize {
        let (mut lo, mut hi) = (0, self.units.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(mid) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    // --- Current position ---

    /// Make `index` the current unit and recompute the neighbour cache.
    ///
    /// # Errors
    /// Returns [`SyncError::IndexOutOfRange`] if `index` is not in the list.
    pub fn set_current(&mut self, index: usize) -> Result<()> {
        if index >= self.units.len() {
            return Err(SyncError::IndexOutOfRange {
                index,
                len: self.units.len(),
            });
        }
        self.current = Some(index);
        self.neighbors = Neighbors::around(&self.units, index);
        Ok(())
    }

    /// The current unit, defaulting to the first one.
    ///
    /// # Errors
    /// Returns [`SyncError::EmptyList`] if the list has no units; the document
    /// and the index have diverged and the caller must resync.
    pub fn current(&mut self) -> Result<&Unit> {
        if self.units.is_empty() {
            return Err(SyncError::EmptyList);
        }
        let index = match self.current {
            Some(index) => index,
            None => {
                self.set_current(0)?;
                0
            }
        };
        self.units.get(index).ok_or(SyncError::EmptyList)
    }

    pub const fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Id of the current unit, if one has been assigned. Used as a search hint.
    pub fn current_id(&self) -> Option<UnitId> {
        self.current
            .and_then(|i| self.units.get(i))
            .map(Unit::id)
    }

    pub const fn neighbors(&self) -> Neighbors {
        self.neighbors
    }

    fn refresh_neighbors(&mut self) {
        if let Some(index) = self.current {
            self.neighbors = Neighbors::around(&self.units, index);
        }
    }

    // --- Mutation ---

    /// Shift one edge of the unit at `index` by `delta`, along with the
    /// matching edge of its braille extent.
    ///
    /// # Errors
    /// Returns [`SyncError::IndexOutOfRange`] if `index` is not in the list.
    pub fn adjust_offsets(&mut self, edge: Edge, index: usize, delta: isize) -> Result<()> {
        if index >= self.units.len() {
            return Err(SyncError::IndexOutOfRange {
                index,
                len: self.units.len(),
            });
        }
        match edge {
            Edge::Start => {
                let value = self.start(index).saturating_add_signed(delta);
                let unit = &mut self.units[index];
                unit.set_start(value);
                unit.shift_braille_start(delta);
            }
            Edge::End => {
                let value = self.end(index).saturating_add_signed(delta);
                let unit = &mut self.units[index];
                unit.set_end(value);
                unit.shift_braille_end(delta);
            }
        }
        self.refresh_neighbors();
        Ok(())
    }

    /// Shift every unit from `index` to the end of the list.
    pub fn shift_offsets_from_index(&mut self, index: usize, text_delta: isize, braille_delta: isize) {
        for unit in self.units.iter_mut().skip(index) {
            unit.shift_all(text_delta, braille_delta);
        }
        self.refresh_neighbors();
    }

    /// Zero every text and braille offset ahead of a full recompute.
    pub fn reset_list(&mut self) {
        for unit in &mut self.units {
            unit.zero();
        }
        self.refresh_neighbors();
    }

    /// Remove every unit and forget the current position.
    pub fn clear_list(&mut self) {
        debug!(units = self.units.len(), "clearing unit list");
        self.units.clear();
        self.current = None;
        self.neighbors = Neighbors::default();
        self.next_id = 0;
    }

    /// Verify that no unit starts before its predecessor ends.
    ///
    /// # Errors
    /// Returns [`SyncError::OutOfOrder`] with the first offending index.
    pub fn check_order(&self) -> Result<()> {
        for index in 1..self.units.len() {
            if self.start(index) < self.end(index - 1) {
                return Err(SyncError::OutOfOrder { index });
            }
        }
        Ok(())
    }

    pub fn is_ordered(&self) -> bool {
        self.check_order().is_ok()
    }

    fn is_hint(&self, index: usize, hint: Option<UnitId>) -> bool {
        hint.is_some_and(|h| self.units.get(index).is_some_and(|u| u.id() == h))
    }
}

impl FromIterator<Unit> for UnitList {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        let mut list = Self::new();
        for unit in iter {
            list.push(unit);
        }
        list
    }
}

impl<'a> IntoIterator for &'a UnitList {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}
