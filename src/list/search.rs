//! Offset → unit index resolution.
//!
//! Both searches share one tie-break policy. An offset on a shared boundary
//! between two units goes to the unit named by the hint when the hint is one
//! of the two candidates, otherwise to the unit the search probed first. An
//! offset exactly halfway across a gap goes to the hinted neighbour, otherwise
//! to the earlier one. Offsets outside the list clamp to the first or last
//! unit.

use std::cmp::Ordering;

use tracing::trace;

use super::UnitList;
use crate::error::{Result, SyncError};
use crate::unit::{Span, UnitId};

impl UnitList {
    /// Index of the unit closest to text-view `offset`.
    ///
    /// # Errors
    /// Returns [`SyncError::EmptyList`] for an empty list and
    /// [`SyncError::Unterminated`] if the binary search exhausts its range,
    /// which only happens when units are out of order.
    pub fn find_closest_by_text(&self, offset: usize, hint: Option<UnitId>) -> Result<usize> {
        let last = self.units.len().checked_sub(1).ok_or(SyncError::EmptyList)?;
        let index = if offset <= self.start(0) {
            0
        } else if offset >= self.end(last) {
            last
        } else {
            self.search_text(offset, hint, 0, last)?
        };
        let index = self.skip_end_of_line(index);
        let index = self.pass_through_whitespace(index, hint);
        trace!(offset, index, "resolved text offset");
        Ok(index)
    }

    fn search_text(
        &self,
        offset: usize,
        hint: Option<UnitId>,
        mut low: usize,
        mut high: usize,
    ) -> Result<usize> {
        let last = self.units.len() - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let span = self.text_span(mid);

            if span.contains(offset) {
                return Ok(self.break_boundary_tie(offset, mid, span, hint));
            }

            if mid < last {
                let next_start = self.start(mid + 1);
                if offset > span.end && offset < next_start {
                    return Ok(self.break_gap_tie(offset, mid, span.end, next_start, hint));
                }
            }

            if offset < span.start {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }
        Err(SyncError::Unterminated { offset })
    }

    fn break_boundary_tie(&self, offset: usize, mid: usize, span: Span, hint: Option<UnitId>) -> usize {
        if offset == span.end && mid + 1 < self.units.len() && self.start(mid + 1) == offset {
            return if self.is_hint(mid + 1, hint) { mid + 1 } else { mid };
        }
        if offset == span.start && mid > 0 && self.end(mid - 1) == offset {
            return if self.is_hint(mid - 1, hint) { mid - 1 } else { mid };
        }
        mid
    }

    fn break_gap_tie(
        &self,
        offset: usize,
        mid: usize,
        gap_start: usize,
        gap_end: usize,
        hint: Option<UnitId>,
    ) -> usize {
        match (offset - gap_start).cmp(&(gap_end - offset)) {
            Ordering::Less => mid,
            Ordering::Greater => mid + 1,
            Ordering::Equal if self.is_hint(mid + 1, hint) => mid + 1,
            Ordering::Equal => mid,
        }
    }

    /// An end-of-line marker is never selectable when the unit before it
    /// ends exactly where the marker starts.
    fn skip_end_of_line(&self, index: usize) -> usize {
        if index > 0
            && self.units[index].is_end_of_line()
            && self.end(index - 1) == self.start(index)
        {
            index - 1
        } else {
            index
        }
    }

    /// A whitespace result steps onto the hinted unit when that unit sits
    /// directly next to it.
    fn pass_through_whitespace(&self, index: usize, hint: Option<UnitId>) -> usize {
        if !self.units[index].is_whitespace() || hint.is_none() {
            return index;
        }
        if self.is_hint(index + 1, hint) {
            index + 1
        } else if index > 0 && self.is_hint(index - 1, hint) {
            index - 1
        } else {
            index
        }
    }

    /// Index of the unit closest to braille-view `offset`.
    ///
    /// Scans linearly because aggregate spans are not guaranteed to increase
    /// monotonically relative to the units around them. Units without braille
    /// presence are skipped. Returns `Ok(None)` when no unit has any.
    ///
    /// # Errors
    /// Returns [`SyncError::EmptyList`] for an empty list and
    /// [`SyncError::Unterminated`] if no candidate covers the offset.
    pub fn find_closest_by_braille(&self, offset: usize, hint: Option<UnitId>) -> Result<Option<usize>> {
        if self.units.is_empty() {
            return Err(SyncError::EmptyList);
        }
        let candidates: Vec<(usize, Span)> = self
            .units
            .iter()
            .enumerate()
            .filter_map(|(i, u)| u.braille_span().map(|s| (i, s)))
            .collect();
        let (Some(&(first, first_span)), Some(&(last, last_span))) =
            (candidates.first(), candidates.last())
        else {
            return Ok(None);
        };
        if offset <= first_span.start {
            return Ok(Some(first));
        }
        if offset >= last_span.end {
            return Ok(Some(last));
        }

        for (pos, &(index, span)) in candidates.iter().enumerate() {
            let prev = pos.checked_sub(1).and_then(|p| candidates.get(p));
            let next = candidates.get(pos + 1);

            if span.contains(offset) {
                if let Some(&(next_index, next_span)) = next
                    && offset == span.end
                    && next_span.start == offset
                {
                    let chosen = if self.is_hint(next_index, hint) { next_index } else { index };
                    return Ok(Some(chosen));
                }
                if let Some(&(prev_index, prev_span)) = prev
                    && offset == span.start
                    && prev_span.end == offset
                {
                    let chosen = if self.is_hint(prev_index, hint) { prev_index } else { index };
                    return Ok(Some(chosen));
                }
                return Ok(Some(index));
            }

            if let Some(&(next_index, next_span)) = next
                && offset > span.end
                && offset < next_span.start
            {
                let chosen = match (offset - span.end).cmp(&(next_span.start - offset)) {
                    Ordering::Less => index,
                    Ordering::Greater => next_index,
                    Ordering::Equal if self.is_hint(next_index, hint) => next_index,
                    Ordering::Equal => index,
                };
                return Ok(Some(chosen));
            }
        }
        Err(SyncError::Unterminated { offset })
    }
}
