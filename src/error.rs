//! Error type shared by the unit list and the editor session.

use thiserror::Error;

use crate::document::NodeId;

/// Failures raised while resolving offsets or nodes against the unit list.
///
/// Only invariant violations are reported here. Recoverable conditions, such
/// as an out-of-range offset or a node with no unit, are returned as ordinary
/// values by the list itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("unit list is empty; document and index are desynchronized")]
    EmptyList,

    #[error("no unit resolved for offset {offset}; unit list is out of order")]
    Unterminated { offset: usize },

    #[error("unit index {index} out of range for list of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("node {node} has no unit; document changed without a rebuild")]
    StaleNode { node: NodeId },

    #[error("unit {index} starts before the previous unit ends")]
    OutOfOrder { index: usize },

    #[error("edit {start}..{end} crosses unit boundaries; rebuild required")]
    SpansUnits { start: usize, end: usize },
}

/// Convenience alias for results carrying a [`SyncError`].
pub type Result<T> = std::result::Result<T, SyncError>;
