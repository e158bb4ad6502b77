// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. unit::UnitKind)
    clippy::module_name_repetitions
)]

//! # braillemap
//!
//! Bidirectional mapping between a print text view and a braille view of the
//! same structured document.
//!
//! Every addressable span (a run of text, whitespace, a line break, a page
//! marker, a table) is a unit with an offset range in each view and a backing
//! document node. The unit list keeps them in document order and answers the
//! three questions an editor asks constantly:
//! - which unit is under this text offset?
//! - which unit is under this braille offset?
//! - which unit does this document node map to?
//!
//! ## Modules
//!
//! - [`unit`]: unit kinds, spans and offset resolution
//! - [`list`]: the ordered unit list and its searches
//! - [`document`]: the document tree the list points into
//! - [`editor`]: a session owning a document, its list and both views
//! - [`fixture`]: JSON fixtures that build sessions
//! - [`report`]: CLI queries and their output
//! - [`config`]: saved default flags
//! - [`watcher`]: fixture watching
//! - [`logging`]: subscriber setup, span timings and the debug log

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod fixture;
pub mod list;
pub mod logging;
pub mod report;
pub mod unit;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Document, DocumentTree, NodeId};
    pub use crate::editor::Session;
    pub use crate::error::{Result, SyncError};
    pub use crate::list::{Edge, Neighbors, UnitList};
    pub use crate::unit::{PageKind, Span, Unit, UnitId, UnitKind};
}
