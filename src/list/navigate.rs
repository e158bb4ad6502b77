use std::cmp::Ordering;

use super::UnitList;
use crate::document::{DocumentTree, NodeId};
use crate::error::Result;
use crate::unit::{PageKind, Unit};

impl UnitList {
    /// Next stop position after `index`.
    ///
    /// With `ignore_whitespace` only whitespace units are skipped; otherwise
    /// the full ignorable set (whitespace and end-of-line markers) is.
    pub fn next(&self, index: usize, ignore_whitespace: bool) -> Option<usize> {
        self.units
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, u)| !is_skipped(u, ignore_whitespace))
            .map(|(i, _)| i)
    }

    /// Previous stop position before `index`. See [`UnitList::next`].
    pub fn previous(&self, index: usize, ignore_whitespace: bool) -> Option<usize> {
        let end = index.min(self.units.len());
        self.units[..end]
            .iter()
            .rposition(|u| !is_skipped(u, ignore_whitespace))
    }

    /// Nearest non-whitespace unit around the whitespace unit at `index`.
    ///
    /// The neighbour with the smaller text distance wins. On a tie a page
    /// boundary is preferred, then the earlier neighbour. A non-whitespace
    /// unit resolves to itself.
    pub fn find_closest_non_whitespace(&self, index: usize) -> Option<usize> {
        let unit = self.units.get(index)?;
        if !unit.is_whitespace() {
            return Some(index);
        }
        let before = self.units[..index].iter().rposition(|u| !u.is_whitespace());
        let after = self.units[index + 1..]
            .iter()
            .position(|u| !u.is_whitespace())
            .map(|p| p + index + 1);

        match (before, after) {
            (Some(b), Some(a)) => {
                let span = self.text_span(index);
                let to_before = span.start.saturating_sub(self.end(b));
                let to_after = self.start(a).saturating_sub(span.end);
                match to_before.cmp(&to_after) {
                    Ordering::Less => Some(b),
                    Ordering::Greater => Some(a),
                    Ordering::Equal => {
                        let page_after = self.units[a].is_page_boundary();
                        let page_before = self.units[b].is_page_boundary();
                        if page_after && !page_before {
                            Some(a)
                        } else {
                            Some(b)
                        }
                    }
                }
            }
            (b, a) => b.or(a),
        }
    }

    /// The boundary line paired with the one at `index`.
    ///
    /// A boundary line that opens its parent pairs with the next boundary
    /// line under the same parent; one that closes its parent pairs with the
    /// previous one.
    pub fn find_paired_boundary_line<T: DocumentTree + ?Sized>(
        &self,
        tree: &T,
        index: usize,
    ) -> Option<usize> {
        let unit = self.units.get(index)?;
        if !unit.is_boundary_line() {
            return None;
        }
        let parent = parent_of(tree, unit)?;
        let pairs = |u: &Unit| u.is_boundary_line() && parent_of(tree, u) == Some(parent);

        if tree.is_first_child(unit.node()) {
            self.units
                .iter()
                .enumerate()
                .skip(index + 1)
                .find(|(_, u)| pairs(u))
                .map(|(i, _)| i)
        } else if tree.is_last_child(unit.node()) {
            self.units[..index].iter().rposition(pairs)
        } else {
            None
        }
    }

    /// Next page boundary of `kind` after `index`.
    pub fn next_page(&self, index: usize, kind: PageKind) -> Option<usize> {
        self.units
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, u)| u.page_kind() == Some(kind))
            .map(|(i, _)| i)
    }

    /// Previous page boundary of `kind` before `index`.
    pub fn previous_page(&self, index: usize, kind: PageKind) -> Option<usize> {
        let end = index.min(self.units.len());
        self.units[..end]
            .iter()
            .rposition(|u| u.page_kind() == Some(kind))
    }

    /// The print page a text offset falls on: the last print page boundary
    /// at or before the unit resolved for `offset`.
    ///
    /// # Errors
    /// Propagates [`crate::error::SyncError`] from the text search.
    pub fn current_print_page(&self, offset: usize) -> Result<Option<usize>> {
        let index = self.find_closest_by_text(offset, None)?;
        if self.units[index].page_kind() == Some(PageKind::Print) {
            return Ok(Some(index));
        }
        Ok(self.previous_page(index, PageKind::Print))
    }
}

fn is_skipped(unit: &Unit, ignore_whitespace: bool) -> bool {
    if ignore_whitespace {
        unit.is_whitespace()
    } else {
        unit.is_ignorable()
    }
}

fn parent_of<T: DocumentTree + ?Sized>(tree: &T, unit: &Unit) -> Option<NodeId> {
    unit.parent_node().or_else(|| tree.parent(unit.node()))
}
