use ropey::Rope;
use tracing::{debug, debug_span, trace, warn};

use crate::document::{DocumentTree, NodeId};
use crate::error::{Result, SyncError};
use crate::list::{Edge, UnitList};
use crate::unit::Unit;

/// A document together with its unit index and both rendered views.
///
/// The session is the only owner of the [`UnitList`]. Cursor placement in
/// either view goes through the list with the current unit as the search
/// hint, so repeated placements on a shared boundary stay put.
pub struct Session<D: DocumentTree> {
    document: D,
    list: UnitList,
    text: Rope,
    braille: Rope,
    dirty: bool,
}

impl<D: DocumentTree> Session<D> {
    /// Create a session with an empty unit list.
    pub fn new(document: D, text: &str, braille: &str) -> Self {
        Self {
            document,
            list: UnitList::new(),
            text: Rope::from_str(text),
            braille: Rope::from_str(braille),
            dirty: false,
        }
    }

    /// Create a session and index it with `units`.
    ///
    /// # Errors
    /// Returns [`SyncError::OutOfOrder`] if the units are not in document order.
    pub fn with_units(
        document: D,
        text: &str,
        braille: &str,
        units: impl IntoIterator<Item = Unit>,
    ) -> Result<Self> {
        let mut session = Self::new(document, text, braille);
        session.rebuild(units)?;
        Ok(session)
    }

    pub const fn document(&self) -> &D {
        &self.document
    }

    pub const fn list(&self) -> &UnitList {
        &self.list
    }

    /// The full text view.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The full braille view.
    pub fn braille(&self) -> String {
        self.braille.to_string()
    }

    /// Length of the text view in chars.
    pub fn text_len(&self) -> usize {
        self.text.len_chars()
    }

    /// Length of the braille view in chars.
    pub fn braille_len(&self) -> usize {
        self.braille.len_chars()
    }

    /// Whether the text view was edited since the last rebuild or save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Replace the unit list with a freshly built one.
    ///
    /// The replacement is atomic: on error the previous list is kept. On
    /// success the current position is reset.
    ///
    /// # Errors
    /// Returns [`SyncError::OutOfOrder`] if the units are not in document order.
    pub fn rebuild(&mut self, units: impl IntoIterator<Item = Unit>) -> Result<()> {
        let _span = debug_span!("session.rebuild").entered();
        let list: UnitList = units.into_iter().collect();
        if let Err(err) = list.check_order() {
            warn!(%err, "rejected unit list");
            return Err(err);
        }
        debug!(units = list.len(), "rebuilt unit list");
        self.list = list;
        Ok(())
    }

    /// Move the cursor to the unit at `index`.
    ///
    /// # Errors
    /// Returns [`SyncError::IndexOutOfRange`] if `index` is not in the list.
    pub fn select_unit(&mut self, index: usize) -> Result<()> {
        self.list.set_current(index)
    }

    /// Move the cursor to the unit at text-view `offset`.
    ///
    /// # Errors
    /// Returns [`SyncError::EmptyList`] if nothing has been indexed.
    pub fn place_cursor_text(&mut self, offset: usize) -> Result<usize> {
        let hint = self.list.current_id();
        let index = self.list.find_closest_by_text(offset, hint)?;
        self.list.set_current(index)?;
        trace!(offset, index, "placed text cursor");
        Ok(index)
    }

    /// Move the cursor to the unit at braille-view `offset`.
    ///
    /// Returns `Ok(None)` and leaves the cursor alone when no unit has braille
    /// presence.
    ///
    /// # Errors
    /// Returns [`SyncError::EmptyList`] if nothing has been indexed.
    pub fn place_cursor_braille(&mut self, offset: usize) -> Result<Option<usize>> {
        let hint = self.list.current_id();
        let Some(index) = self.list.find_closest_by_braille(offset, hint)? else {
            return Ok(None);
        };
        self.list.set_current(index)?;
        trace!(offset, index, "placed braille cursor");
        Ok(Some(index))
    }

    /// Move the cursor to the first unit backed by `node`.
    ///
    /// # Errors
    /// Returns [`SyncError::StaleNode`] if no unit is backed by the node.
    pub fn select_node(&mut self, node: NodeId) -> Result<usize> {
        let Some(index) = self.list.find_index_of_node(&self.document, node, 0) else {
            warn!(%node, "node has no unit; index is stale");
            return Err(SyncError::StaleNode { node });
        };
        self.list.set_current(index)?;
        Ok(index)
    }

    /// Insert `text` into the text view at `offset`.
    ///
    /// The unit the offset resolves to grows to cover the insertion and every
    /// later unit moves along with it. When that unit does not cover the
    /// offset (the hint pulled the cursor across a whitespace unit), the first
    /// unit that does cover it grows instead. Braille offsets move by the same
    /// amount until the next rebuild. Returns the index of the unit that grew,
    /// or of the first unit shifted when the insertion lands outside every
    /// unit.
    ///
    /// # Errors
    /// Returns [`SyncError::EmptyList`] if nothing has been indexed.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> Result<usize> {
        let offset = offset.min(self.text.len_chars());
        let resolved = self.list.find_closest_by_text(offset, self.list.current_id())?;
        if text.is_empty() {
            return Ok(resolved);
        }
        let delta = isize::try_from(text.chars().count()).unwrap_or(isize::MAX);

        self.text.insert(offset, text);
        let index = if self.list.text_span(resolved).contains(offset) {
            self.list.adjust_offsets(Edge::End, resolved, delta)?;
            self.list.shift_offsets_from_index(resolved + 1, delta, delta);
            resolved
        } else {
            let covering = self.list.first_ending_at(offset);
            if covering < self.list.len() && self.list.text_span(covering).contains(offset) {
                self.list.adjust_offsets(Edge::End, covering, delta)?;
                self.list.shift_offsets_from_index(covering + 1, delta, delta);
                covering
            } else {
                let first = self.list.first_starting_at(offset);
                self.list.shift_offsets_from_index(first, delta, delta);
                first.min(self.list.len() - 1)
            }
        };
        self.dirty = true;
        debug!(offset, resolved, index, delta, "inserted text");
        Ok(index)
    }

    /// Delete `start..end` from the text view.
    ///
    /// Only deletions inside a single unit are applied in place; anything
    /// crossing a unit boundary needs a rebuild. Returns the index of the unit
    /// that shrank.
    ///
    /// # Errors
    /// Returns [`SyncError::SpansUnits`] if no single unit covers the range and
    /// [`SyncError::EmptyList`] if nothing has been indexed.
    pub fn delete_text(&mut self, start: usize, end: usize) -> Result<usize> {
        let len = self.text.len_chars();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));
        let first = self.list.find_closest_by_text(start, self.list.current_id())?;

        let covers = |i: usize| {
            let span = self.list.text_span(i);
            span.contains(start) && span.contains(end)
        };
        let covering = self.list.first_ending_at(start);
        let index = [first, first + 1, covering, covering + 1]
            .into_iter()
            .filter(|&i| i < self.list.len())
            .find(|&i| covers(i))
            .ok_or(SyncError::SpansUnits { start, end })?;
        if start == end {
            return Ok(index);
        }

        let delta = isize::try_from(end - start).unwrap_or(isize::MAX);
        self.text.remove(start..end);
        self.list.adjust_offsets(Edge::End, index, -delta)?;
        self.list.shift_offsets_from_index(index + 1, -delta, -delta);
        self.dirty = true;
        debug!(start, end, index, "deleted text");
        Ok(index)
    }

    /// Text-view content of the unit at `index`.
    ///
    /// # Errors
    /// Returns [`SyncError::IndexOutOfRange`] if `index` is not in the list.
    pub fn unit_text(&self, index: usize) -> Result<String> {
        self.check_index(index)?;
        let span = self.list.text_span(index);
        Ok(slice(&self.text, span.start, span.end))
    }

    /// Braille-view content of the unit at `index`, or `None` when it has no
    /// braille presence.
    ///
    /// # Errors
    /// Returns [`SyncError::IndexOutOfRange`] if `index` is not in the list.
    pub fn unit_braille(&self, index: usize) -> Result<Option<String>> {
        let unit = self.check_index(index)?;
        Ok(unit
            .braille_span()
            .map(|span| slice(&self.braille, span.start, span.end)))
    }

    fn check_index(&self, index: usize) -> Result<&Unit> {
        self.list.get(index).ok_or(SyncError::IndexOutOfRange {
            index,
            len: self.list.len(),
        })
    }
}

fn slice(rope: &Rope, start: usize, end: usize) -> String {
    let end = end.min(rope.len_chars());
    let start = start.min(end);
    rope.slice(start..end).to_string()
}

impl<D: DocumentTree> std::fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("units", &self.list.len())
            .field("current", &self.list.current_index())
            .field("text", &format_args!("Rope({} chars)", self.text.len_chars()))
            .field(
                "braille",
                &format_args!("Rope({} chars)", self.braille.len_chars()),
            )
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
