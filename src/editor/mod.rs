//! Editing session over a document and its unit index.
//!
//! Keeps the text and braille views in ropes and routes cursor placement,
//! node selection and in-place edits through the unit list.

mod session;

pub use session::Session;
