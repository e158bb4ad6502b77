use std::collections::HashSet;

use tracing::{debug, trace};

use super::UnitList;
use crate::document::{DocumentTree, NodeId};

impl UnitList {
    /// Index of the first unit at or after `start_index` backed by `node` or
    /// one of its descendants.
    ///
    /// Text inside foreign markup resolves to the markup root, and nodes in a
    /// simple-format table resolve to the same position in the table's
    /// rendered duplicate. Returns `None` when nothing matches, which means the
    /// document changed without a rebuild.
    pub fn find_index_of_node<T: DocumentTree + ?Sized>(
        &self,
        tree: &T,
        node: NodeId,
        start_index: usize,
    ) -> Option<usize> {
        let target = redirect(tree, node);
        if target != node {
            trace!(%node, %target, "redirected node lookup");
        }

        let mut candidates: HashSet<NodeId> = HashSet::from([target]);
        if !tree.is_table(target) {
            candidates.extend(
                tree.descendants(target)
                    .into_iter()
                    .filter(|&d| !tree.in_rendered_output(d)),
            );
        }

        let found = self
            .units
            .iter()
            .enumerate()
            .skip(start_index)
            .find(|(_, u)| candidates.contains(&u.node()))
            .map(|(i, _)| i);
        if found.is_none() {
            debug!(%node, start_index, "no unit for node");
        }
        found
    }
}

fn redirect<T: DocumentTree + ?Sized>(tree: &T, node: NodeId) -> NodeId {
    let node = if tree.is_text(node) {
        tree.foreign_markup_root(node).unwrap_or(node)
    } else {
        node
    };
    duplicate_position(tree, node).unwrap_or(node)
}

/// Same position as `node` inside the rendered duplicate of its enclosing
/// simple-format table, or the duplicate itself when the duplicate has no
/// node at that position.
fn duplicate_position<T: DocumentTree + ?Sized>(tree: &T, node: NodeId) -> Option<NodeId> {
    // Child positions from the table down to `node`, innermost first
    let mut path = Vec::new();
    let mut cursor = node;
    while !tree.is_simple_table(cursor) {
        path.push(tree.child_position(cursor)?);
        cursor = tree.parent(cursor)?;
    }
    let duplicate = tree
        .next_sibling(cursor)
        .filter(|&s| tree.is_table_duplicate(s))?;

    let mut target = duplicate;
    for &pos in path.iter().rev() {
        match tree.children(target).get(pos) {
            Some(&child) => target = child,
            None => return Some(duplicate),
        }
    }
    Some(target)
}
