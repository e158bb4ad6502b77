//! Addressable units: typed spans bridging the text view, the braille view
//! and one backing document node.
//!
//! The set of unit kinds is closed. Every predicate the list relies on
//! (whitespace skipping, braille participation, page ranges) is an exhaustive
//! match over [`UnitKind`].

pub mod resolve;

use std::fmt;

use serde::Serialize;

use crate::document::NodeId;

/// Identity of a unit within one build of a [`crate::list::UnitList`].
///
/// Used as the search hint: two units are "the same" for tie-breaking purposes
/// iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Id carried by units that have not been appended to a list.
    pub const DETACHED: Self = Self(u32::MAX);
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// A closed `(start, end)` offset pair in one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True if `offset` lies within the span, both ends included.
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Kind of page marker a [`UnitKind::PageBoundary`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    Print,
    Braille,
}

/// Kind-specific payload of a unit.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    /// Ordinary text content.
    Content,
    /// Whitespace between content; never a stop position for navigation.
    Whitespace,
    /// A line break. End-of-line markers are ignorable.
    LineBreak { end_of_line: bool },
    /// A print or braille page marker.
    PageBoundary { kind: PageKind },
    /// A table indexed as one unit; its span is the union of its cells.
    TableAggregate { cells: Vec<Unit> },
    /// A boundary line that pairs with a sibling under the same parent.
    BoundaryLine,
}

impl UnitKind {
    /// Short label used in logs and CLI output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Whitespace => "whitespace",
            Self::LineBreak { end_of_line: true } => "line-break(eol)",
            Self::LineBreak { end_of_line: false } => "line-break",
            Self::PageBoundary {
                kind: PageKind::Print,
            } => "print-page",
            Self::PageBoundary {
                kind: PageKind::Braille,
            } => "braille-page",
            Self::TableAggregate { .. } => "table",
            Self::BoundaryLine => "boundary-line",
        }
    }
}

/// A leaf span in the unit list.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: UnitId,
    kind: UnitKind,
    /// Text-view start; `None` until resolved from neighbours
    start: Option<usize>,
    /// Text-view end; `None` until resolved from neighbours
    end: Option<usize>,
    braille: Vec<Span>,
    node: NodeId,
    parent_node: Option<NodeId>,
}

impl Unit {
    /// Create a detached unit with unresolved offsets and no braille presence.
    pub const fn new(kind: UnitKind, node: NodeId) -> Self {
        Self {
            id: UnitId::DETACHED,
            kind,
            start: None,
            end: None,
            braille: Vec::new(),
            node,
            parent_node: None,
        }
    }

    /// Set explicit text-view offsets.
    #[must_use]
    pub const fn with_text(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_braille(mut self, spans: impl IntoIterator<Item = Span>) -> Self {
        self.braille = spans.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_parent(mut self, parent: Option<NodeId>) -> Self {
        self.parent_node = parent;
        self
    }

    pub const fn id(&self) -> UnitId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: UnitId) {
        self.id = id;
    }

    pub const fn kind(&self) -> &UnitKind {
        &self.kind
    }

    pub const fn node(&self) -> NodeId {
        self.node
    }

    pub const fn parent_node(&self) -> Option<NodeId> {
        self.parent_node
    }

    pub fn braille_spans(&self) -> &[Span] {
        &self.braille
    }

    pub const fn is_whitespace(&self) -> bool {
        matches!(self.kind, UnitKind::Whitespace)
    }

    pub const fn is_end_of_line(&self) -> bool {
        matches!(self.kind, UnitKind::LineBreak { end_of_line: true })
    }

    /// Whitespace and end-of-line markers are never valid stop positions.
    pub const fn is_ignorable(&self) -> bool {
        match self.kind {
            UnitKind::Whitespace | UnitKind::LineBreak { end_of_line: true } => true,
            UnitKind::Content
            | UnitKind::LineBreak { end_of_line: false }
            | UnitKind::PageBoundary { .. }
            | UnitKind::TableAggregate { .. }
            | UnitKind::BoundaryLine => false,
        }
    }

    pub const fn page_kind(&self) -> Option<PageKind> {
        match self.kind {
            UnitKind::PageBoundary { kind } => Some(kind),
            _ => None,
        }
    }

    pub const fn is_page_boundary(&self) -> bool {
        self.page_kind().is_some()
    }

    pub const fn is_boundary_line(&self) -> bool {
        matches!(self.kind, UnitKind::BoundaryLine)
    }

    /// Explicitly known text start. Aggregates report their first cell's start.
    pub fn declared_start(&self) -> Option<usize> {
        match &self.kind {
            UnitKind::TableAggregate { cells } if !cells.is_empty() => {
                cells.first().and_then(Self::declared_start)
            }
            _ => self.start,
        }
    }

    /// Explicitly known text end. Aggregates report their last cell's end.
    pub fn declared_end(&self) -> Option<usize> {
        match &self.kind {
            UnitKind::TableAggregate { cells } if !cells.is_empty() => {
                cells.last().and_then(Self::declared_end)
            }
            _ => self.end,
        }
    }

    /// Braille-view extent of the unit, or `None` when it has no braille presence.
    ///
    /// Aggregates span from the first cell with braille to the last one,
    /// recursively through nested aggregates.
    pub fn braille_span(&self) -> Option<Span> {
        match &self.kind {
            UnitKind::TableAggregate { cells } => {
                let first = cells.iter().find_map(Self::braille_span)?;
                let last = cells.iter().rev().find_map(Self::braille_span)?;
                Some(Span::new(first.start, last.end))
            }
            _ => {
                let first = self.braille.first()?;
                let last = self.braille.last()?;
                Some(Span::new(first.start, last.end))
            }
        }
    }

    pub(crate) fn set_start(&mut self, value: usize) {
        match &mut self.kind {
            UnitKind::TableAggregate { cells } if !cells.is_empty() => {
                if let Some(cell) = cells.first_mut() {
                    cell.set_start(value);
                }
            }
            _ => self.start = Some(value),
        }
    }

    pub(crate) fn set_end(&mut self, value: usize) {
        match &mut self.kind {
            UnitKind::TableAggregate { cells } if !cells.is_empty() => {
                if let Some(cell) = cells.last_mut() {
                    cell.set_end(value);
                }
            }
            _ => self.end = Some(value),
        }
    }

    /// Shift the start of the first braille span.
    pub(crate) fn shift_braille_start(&mut self, delta: isize) {
        match &mut self.kind {
            UnitKind::TableAggregate { cells } => {
                if let Some(cell) = cells.iter_mut().find(|c| c.braille_span().is_some()) {
                    cell.shift_braille_start(delta);
                }
            }
            _ => {
                if let Some(span) = self.braille.first_mut() {
                    span.start = span.start.saturating_add_signed(delta);
                }
            }
        }
    }

    /// Shift the end of the last braille span.
    pub(crate) fn shift_braille_end(&mut self, delta: isize) {
        match &mut self.kind {
            UnitKind::TableAggregate { cells } => {
                if let Some(cell) = cells.iter_mut().rev().find(|c| c.braille_span().is_some()) {
                    cell.shift_braille_end(delta);
                }
            }
            _ => {
                if let Some(span) = self.braille.last_mut() {
                    span.end = span.end.saturating_add_signed(delta);
                }
            }
        }
    }

    /// Shift every stored offset of the unit and its cells. Unresolved
    /// offsets stay unresolved.
    pub(crate) fn shift_all(&mut self, text_delta: isize, braille_delta: isize) {
        self.start = self.start.map(|v| v.saturating_add_signed(text_delta));
        self.end = self.end.map(|v| v.saturating_add_signed(text_delta));
        for span in &mut self.braille {
            span.start = span.start.saturating_add_signed(braille_delta);
            span.end = span.end.saturating_add_signed(braille_delta);
        }
        if let UnitKind::TableAggregate { cells } = &mut self.kind {
            for cell in cells {
                cell.shift_all(text_delta, braille_delta);
            }
        }
    }

    /// Zero every text and braille offset, cells included.
    pub(crate) fn zero(&mut self) {
        self.start = Some(0);
        self.end = Some(0);
        for span in &mut self.braille {
            *span = Span::new(0, 0);
        }
        if let UnitKind::TableAggregate { cells } = &mut self.kind {
            for cell in cells {
                cell.zero();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(start: usize, end: usize) -> Unit {
        Unit::new(UnitKind::Content, NodeId(1)).with_text(start, end)
    }

    #[test]
    fn test_ignorable_kinds() {
        let ws = Unit::new(UnitKind::Whitespace, NodeId(1));
        let eol = Unit::new(UnitKind::LineBreak { end_of_line: true }, NodeId(1));
        let br = Unit::new(UnitKind::LineBreak { end_of_line: false }, NodeId(1));
        let page = Unit::new(
            UnitKind::PageBoundary {
                kind: PageKind::Print,
            },
            NodeId(1),
        );
        assert!(ws.is_ignorable() && ws.is_whitespace());
        assert!(eol.is_ignorable() && !eol.is_whitespace());
        assert!(!br.is_ignorable());
        assert!(!page.is_ignorable());
        assert_eq!(page.page_kind(), Some(PageKind::Print));
    }

    #[test]
    fn test_braille_span_unions_first_and_last() {
        let unit = content(0, 4).with_braille([Span::new(2, 3), Span::new(5, 9)]);
        assert_eq!(unit.braille_span(), Some(Span::new(2, 9)));
        assert_eq!(content(0, 4).braille_span(), None);
    }

    #[test]
    fn test_aggregate_spans_recurse_through_nested_cells() {
        let inner = Unit::new(
            UnitKind::TableAggregate {
                cells: vec![
                    content(10, 12).with_braille([Span::new(20, 22)]),
                    content(13, 15).with_braille([Span::new(23, 26)]),
                ],
            },
            NodeId(2),
        );
        let outer = Unit::new(
            UnitKind::TableAggregate {
                cells: vec![content(4, 8).with_braille([Span::new(5, 9)]), inner],
            },
            NodeId(3),
        );
        assert_eq!(outer.declared_start(), Some(4));
        assert_eq!(outer.declared_end(), Some(15));
        assert_eq!(outer.braille_span(), Some(Span::new(5, 26)));
    }

    #[test]
    fn test_aggregate_without_braille_cells_has_no_span() {
        let table = Unit::new(
            UnitKind::TableAggregate {
                cells: vec![content(0, 2)],
            },
            NodeId(2),
        );
        assert_eq!(table.braille_span(), None);
    }

    #[test]
    fn test_shift_all_keeps_unresolved_offsets() {
        let mut unit = Unit::new(UnitKind::Content, NodeId(1)).with_braille([Span::new(4, 6)]);
        unit.shift_all(3, -2);
        assert_eq!(unit.declared_start(), None);
        assert_eq!(unit.braille_span(), Some(Span::new(2, 4)));
    }

    #[test]
    fn test_zero_resets_cells() {
        let mut table = Unit::new(
            UnitKind::TableAggregate {
                cells: vec![content(3, 5).with_braille([Span::new(7, 9)])],
            },
            NodeId(2),
        );
        table.zero();
        assert_eq!(table.declared_start(), Some(0));
        assert_eq!(table.declared_end(), Some(0));
        assert_eq!(table.braille_span(), Some(Span::new(0, 0)));
    }

    #[test]
    fn test_braille_shift_saturates_at_zero() {
        let mut unit = content(0, 4).with_braille([Span::new(1, 3)]);
        unit.shift_braille_start(-5);
        unit.shift_braille_end(2);
        assert_eq!(unit.braille_span(), Some(Span::new(0, 5)));
    }
}
