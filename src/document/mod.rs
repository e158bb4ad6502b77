//! Structured document tree seen by the unit list.
//!
//! The list never owns the document. It only needs the traversal and
//! classification queries in [`DocumentTree`]; [`Document`] is a small arena
//! implementation used by the fixture loader, the CLI and the tests.

mod tree;

pub use tree::{Document, Node, NodeKind};

use std::fmt;

use serde::Serialize;

/// Element name of tables.
pub const TABLE_TAG: &str = "table";
/// Element name of embedded foreign markup (math) subtrees.
pub const FOREIGN_MARKUP_TAG: &str = "math";
/// Element name of rendered braille output subtrees.
pub const RENDERED_OUTPUT_TAG: &str = "brl";
/// Table attribute selecting the layout format.
pub const FORMAT_ATTR: &str = "format";
/// Value of [`FORMAT_ATTR`] for simple-format tables.
pub const SIMPLE_FORMAT: &str = "simple";
/// Attribute marking a table as the rendered duplicate of its previous sibling.
pub const DUPLICATE_ATTR: &str = "duplicate";

/// Compact node identifier (index into the document arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read access to the document tree.
///
/// Required methods are the primitive queries; the provided methods derive
/// the walks the node locator and the range queries need.
pub trait DocumentTree {
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    fn is_text(&self, node: NodeId) -> bool;

    fn is_table(&self, node: NodeId) -> bool;

    /// True for the root element of an embedded foreign-markup subtree.
    fn is_foreign_markup(&self, node: NodeId) -> bool;

    /// True for the root element of a rendered-output subtree.
    fn is_rendered_output(&self, node: NodeId) -> bool;

    fn is_simple_table(&self, node: NodeId) -> bool;

    /// True for a table that is the rendered duplicate of its previous sibling.
    fn is_table_duplicate(&self, node: NodeId) -> bool;

    /// Ancestors of `node`, nearest first, excluding `node` itself.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(node);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.parent(id);
        }
        out
    }

    /// Descendants of `node` in document order, excluding `node` itself.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            // Reverse so the first child is visited first
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Position of `node` among its parent's children.
    fn child_position(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let pos = self.child_position(node)?;
        self.children(parent).get(pos + 1).copied()
    }

    fn is_first_child(&self, node: NodeId) -> bool {
        self.child_position(node) == Some(0)
    }

    fn is_last_child(&self, node: NodeId) -> bool {
        self.parent(node)
            .is_some_and(|p| self.children(p).last() == Some(&node))
    }

    /// True if `node` or one of its ancestors is rendered output.
    fn in_rendered_output(&self, node: NodeId) -> bool {
        self.is_rendered_output(node)
            || self
                .ancestors(node)
                .into_iter()
                .any(|a| self.is_rendered_output(a))
    }

    /// Nearest foreign-markup root at or above `node`.
    fn foreign_markup_root(&self, node: NodeId) -> Option<NodeId> {
        if self.is_foreign_markup(node) {
            return Some(node);
        }
        self.ancestors(node)
            .into_iter()
            .find(|&a| self.is_foreign_markup(a))
    }
}
