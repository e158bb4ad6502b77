use super::{
    DUPLICATE_ATTR, DocumentTree, FORMAT_ATTR, FOREIGN_MARKUP_TAG, NodeId, RENDERED_OUTPUT_TAG,
    SIMPLE_FORMAT, TABLE_TAG,
};

/// Type of a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

/// A node in the document arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed document tree.
///
/// Nodes are only ever appended, so a [`NodeId`] stays valid for the lifetime
/// of the document. The root element is always `NodeId(0)`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document with a single root element.
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    name: root_name.to_string(),
                    attributes: Vec::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Append an element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.append(
            parent,
            NodeKind::Element {
                name: name.to_string(),
                attributes: Vec::new(),
            },
        )
    }

    /// Append a text node as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent.index()) {
            p.children.push(id);
        }
        id
    }

    /// Set an attribute on an element. Text nodes are left unchanged.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(Node {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.index())
        else {
            return;
        };
        if let Some(slot) = attributes.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value.to_string();
        } else {
            attributes.push((name.to_string(), value.to_string()));
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Element name, or `None` for text nodes.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    /// Text content of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }
}

impl DocumentTree for Document {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map_or(&[], |n| n.children.as_slice())
    }

    fn is_text(&self, node: NodeId) -> bool {
        self.text(node).is_some()
    }

    fn is_table(&self, node: NodeId) -> bool {
        self.name(node) == Some(TABLE_TAG)
    }

    fn is_foreign_markup(&self, node: NodeId) -> bool {
        self.name(node) == Some(FOREIGN_MARKUP_TAG)
    }

    fn is_rendered_output(&self, node: NodeId) -> bool {
        self.name(node) == Some(RENDERED_OUTPUT_TAG)
    }

    fn is_simple_table(&self, node: NodeId) -> bool {
        self.is_table(node) && self.attribute(node, FORMAT_ATTR) == Some(SIMPLE_FORMAT)
    }

    fn is_table_duplicate(&self, node: NodeId) -> bool {
        self.is_table(node) && self.attribute(node, DUPLICATE_ATTR) == Some("true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("book");
        let p = doc.append_element(doc.root(), "p");
        let a = doc.append_text(p, "alpha");
        let b = doc.append_text(p, "beta");
        (doc, p, a, b)
    }

    #[test]
    fn test_append_links_parent_and_children() {
        let (doc, p, a, b) = sample();
        assert_eq!(doc.parent(a), Some(p));
        assert_eq!(doc.children(p), &[a, b]);
        assert_eq!(doc.parent(doc.root()), None);
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let mut doc = Document::new("book");
        let s = doc.append_element(doc.root(), "section");
        let p1 = doc.append_element(s, "p");
        let t1 = doc.append_text(p1, "one");
        let p2 = doc.append_element(s, "p");
        let t2 = doc.append_text(p2, "two");
        assert_eq!(doc.descendants(doc.root()), vec![s, p1, t1, p2, t2]);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let (doc, p, a, _) = sample();
        assert_eq!(doc.ancestors(a), vec![p, doc.root()]);
    }

    #[test]
    fn test_sibling_queries() {
        let (doc, p, a, b) = sample();
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), None);
        assert!(doc.is_first_child(a));
        assert!(doc.is_last_child(b));
        assert!(!doc.is_last_child(a));
        assert!(doc.is_first_child(p));
    }

    #[test]
    fn test_table_flags() {
        let mut doc = Document::new("book");
        let t = doc.append_element(doc.root(), "table");
        doc.set_attribute(t, "format", "simple");
        let dup = doc.append_element(doc.root(), "table");
        doc.set_attribute(dup, "duplicate", "true");
        assert!(doc.is_simple_table(t));
        assert!(!doc.is_table_duplicate(t));
        assert!(doc.is_table_duplicate(dup));
        assert!(!doc.is_simple_table(dup));
    }

    #[test]
    fn test_rendered_output_and_foreign_markup_lookups() {
        let mut doc = Document::new("book");
        let p = doc.append_element(doc.root(), "p");
        let math = doc.append_element(p, "math");
        let mi = doc.append_element(math, "mi");
        let x = doc.append_text(mi, "x");
        let brl = doc.append_element(p, "brl");
        let cells = doc.append_text(brl, "⠭");
        assert_eq!(doc.foreign_markup_root(x), Some(math));
        assert_eq!(doc.foreign_markup_root(p), None);
        assert!(doc.in_rendered_output(cells));
        assert!(!doc.in_rendered_output(x));
    }

    #[test]
    fn test_set_attribute_overwrites() {
        let (mut doc, p, a, _) = sample();
        doc.set_attribute(p, "class", "one");
        doc.set_attribute(p, "class", "two");
        assert_eq!(doc.attribute(p, "class"), Some("two"));
        doc.set_attribute(a, "class", "ignored");
        assert_eq!(doc.attribute(a, "class"), None);
    }
}
