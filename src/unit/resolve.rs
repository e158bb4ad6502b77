//! Pure text-offset resolution.
//!
//! A unit whose offsets were never tracked independently takes them from its
//! neighbours: an unresolved start is the previous unit's end (0 for the first
//! unit), an unresolved end is the unit's own start. Reading never writes
//! anything back.

use super::{Span, Unit};

/// Resolved text start of `units[index]`. Out-of-range indices resolve to 0.
pub fn text_start(units: &[Unit], index: usize) -> usize {
    let Some(unit) = units.get(index) else {
        return 0;
    };
    if let Some(start) = unit.declared_start() {
        return start;
    }
    units[..index]
        .iter()
        .rev()
        .find_map(|u| u.declared_end().or_else(|| u.declared_start()))
        .unwrap_or(0)
}

/// Resolved text end of `units[index]`. Out-of-range indices resolve to 0.
pub fn text_end(units: &[Unit], index: usize) -> usize {
    units
        .get(index)
        .and_then(Unit::declared_end)
        .unwrap_or_else(|| text_start(units, index))
}

pub fn text_span(units: &[Unit], index: usize) -> Span {
    Span::new(text_start(units, index), text_end(units, index))
}
