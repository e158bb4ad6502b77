use std::collections::HashSet;

use super::UnitList;
use crate::document::NodeId;
use crate::error::Result;
use crate::unit::PageKind;

impl UnitList {
    /// Units touched by the text selection `start..end`, in document order.
    ///
    /// Walks a cursor through the selection. Whitespace advances the cursor by
    /// one; any other unit is recorded and the cursor jumps past its end.
    /// Units are de-duplicated by parent node (the unit's own node when it
    /// has none), so only the first unit of each parent is returned.
    ///
    /// # Errors
    /// Propagates [`crate::error::SyncError`] from the text search.
    pub fn units_in_selected_range(&self, start: usize, end: usize) -> Result<Vec<usize>> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut out = Vec::new();
        let mut j = start;
        while j < end {
            let index = self.find_closest_by_text(j, None)?;
            let unit = &self.units[index];
            if unit.is_whitespace() {
                j += 1;
                continue;
            }
            let key = unit.parent_node().unwrap_or_else(|| unit.node());
            if seen.insert(key) {
                out.push(index);
            }
            j = (self.end(index) + 1).max(j + 1);
        }
        Ok(out)
    }

    /// Units touched by `start..end`, resolving every offset individually.
    ///
    /// Needed where one unit stands for several adjacent logical positions.
    /// Whitespace is not recorded; each unit appears once.
    ///
    /// # Errors
    /// Propagates [`crate::error::SyncError`] from the text search.
    pub fn units_one_by_one(&self, start: usize, end: usize) -> Result<Vec<usize>> {
        let mut seen: HashSet<usize> = HashSet::new();
        let mut out = Vec::new();
        for j in start..end {
            let index = self.find_closest_by_text(j, None)?;
            if self.units[index].is_whitespace() {
                continue;
            }
            if seen.insert(index) {
                out.push(index);
            }
        }
        Ok(out)
    }

    /// True iff text `offset` resolves to a print page boundary covering it.
    ///
    /// # Errors
    /// Propagates [`crate::error::SyncError`] from the text search.
    pub fn in_print_page_range(&self, offset: usize) -> Result<bool> {
        let index = self.find_closest_by_text(offset, None)?;
        Ok(self.units[index].page_kind() == Some(PageKind::Print)
            && self.text_span(index).contains(offset))
    }

    /// True iff braille `offset` resolves to a braille page boundary covering it.
    ///
    /// # Errors
    /// Propagates [`crate::error::SyncError`] from the braille search.
    pub fn in_braille_page_range(&self, offset: usize) -> Result<bool> {
        let Some(index) = self.find_closest_by_braille(offset, None)? else {
            return Ok(false);
        };
        let unit = &self.units[index];
        Ok(unit.page_kind() == Some(PageKind::Braille)
            && unit.braille_span().is_some_and(|s| s.contains(offset)))
    }
}
