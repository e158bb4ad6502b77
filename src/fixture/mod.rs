//! JSON fixtures describing a document, its two views and its unit list.
//!
//! ```json
//! {
//!   "text": "Hello world",
//!   "braille": "⠠⠓⠑⠇⠇⠕ ⠺⠕⠗⠇⠙",
//!   "tree": { "name": "doc", "children": [
//!     { "id": "p", "name": "p", "children": [
//!       { "id": "hello", "text": "Hello" }
//!     ] }
//!   ] },
//!   "units": [
//!     { "kind": "content", "node": "hello", "parent": "p",
//!       "start": 0, "end": 5, "braille": [[0, 6]] }
//!   ]
//! }
//! ```
//!
//! Nodes are referenced from units by their string `id`. Offsets are char
//! offsets into `text` and `braille`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use crate::document::{Document, NodeId};
use crate::editor::Session;
use crate::unit::{PageKind, Span, Unit, UnitKind};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
    text: String,
    #[serde(default)]
    braille: String,
    tree: NodeSpec,
    #[serde(default)]
    units: Vec<UnitSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeSpec {
    Text {
        id: Option<String>,
        text: String,
    },
    Element {
        id: Option<String>,
        name: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum KindSpec {
    Content,
    Whitespace,
    LineBreak,
    EndOfLine,
    PrintPage,
    BraillePage,
    Table,
    BoundaryLine,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitSpec {
    kind: KindSpec,
    node: String,
    parent: Option<String>,
    start: Option<usize>,
    end: Option<usize>,
    #[serde(default)]
    braille: Vec<(usize, usize)>,
    #[serde(default)]
    cells: Vec<UnitSpec>,
}

/// Load a fixture file into a ready session.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid fixture.
pub fn load(path: &Path) -> Result<Session<Document>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    from_json(&content).with_context(|| format!("Invalid fixture {}", path.display()))
}

/// Parse a fixture from a JSON string into a ready session.
///
/// # Errors
/// Returns an error for malformed JSON, duplicate or unknown node ids, cells
/// on a non-table unit, and unit lists that are out of document order.
pub fn from_json(json: &str) -> Result<Session<Document>> {
    let fixture: FixtureFile = serde_json::from_str(json).context("Failed to parse fixture JSON")?;

    let (root_name, root_id, root_attributes, root_children) = match &fixture.tree {
        NodeSpec::Element {
            id,
            name,
            attributes,
            children,
        } => (name, id, attributes, children),
        NodeSpec::Text { .. } => bail!("fixture tree root must be an element"),
    };

    let mut document = Document::new(root_name);
    let mut ids = HashMap::new();
    let root = document.root();
    register(&mut ids, root_id.as_deref(), root)?;
    for (name, value) in root_attributes {
        document.set_attribute(root, name, value);
    }
    for child in root_children {
        build_node(&mut document, &mut ids, root, child)?;
    }

    let units = fixture
        .units
        .iter()
        .map(|spec| build_unit(&ids, spec))
        .collect::<Result<Vec<_>>>()?;

    debug!(nodes = document.len(), units = units.len(), "loaded fixture");
    Ok(Session::with_units(
        document,
        &fixture.text,
        &fixture.braille,
        units,
    )?)
}

fn register(ids: &mut HashMap<String, NodeId>, id: Option<&str>, node: NodeId) -> Result<()> {
    let Some(id) = id else {
        return Ok(());
    };
    if ids.insert(id.to_string(), node).is_some() {
        bail!("duplicate node id `{id}`");
    }
    Ok(())
}

fn build_node(
    document: &mut Document,
    ids: &mut HashMap<String, NodeId>,
    parent: NodeId,
    spec: &NodeSpec,
) -> Result<()> {
    match spec {
        NodeSpec::Text { id, text } => {
            let node = document.append_text(parent, text);
            register(ids, id.as_deref(), node)
        }
        NodeSpec::Element {
            id,
            name,
            attributes,
            children,
        } => {
            let node = document.append_element(parent, name);
            register(ids, id.as_deref(), node)?;
            for (key, value) in attributes {
                document.set_attribute(node, key, value);
            }
            for child in children {
                build_node(document, ids, node, child)?;
            }
            Ok(())
        }
    }
}

fn lookup(ids: &HashMap<String, NodeId>, id: &str) -> Result<NodeId> {
    ids.get(id)
        .copied()
        .with_context(|| format!("unknown node id `{id}`"))
}

fn build_unit(ids: &HashMap<String, NodeId>, spec: &UnitSpec) -> Result<Unit> {
    if !spec.cells.is_empty() && !matches!(spec.kind, KindSpec::Table) {
        bail!("unit for `{}` has cells but is not a table", spec.node);
    }
    let kind = match spec.kind {
        KindSpec::Content => UnitKind::Content,
        KindSpec::Whitespace => UnitKind::Whitespace,
        KindSpec::LineBreak => UnitKind::LineBreak { end_of_line: false },
        KindSpec::EndOfLine => UnitKind::LineBreak { end_of_line: true },
        KindSpec::PrintPage => UnitKind::PageBoundary {
            kind: PageKind::Print,
        },
        KindSpec::BraillePage => UnitKind::PageBoundary {
            kind: PageKind::Braille,
        },
        KindSpec::Table => UnitKind::TableAggregate {
            cells: spec
                .cells
                .iter()
                .map(|cell| build_unit(ids, cell))
                .collect::<Result<_>>()?,
        },
        KindSpec::BoundaryLine => UnitKind::BoundaryLine,
    };

    let parent = spec.parent.as_deref().map(|p| lookup(ids, p)).transpose()?;
    let mut unit = Unit::new(kind, lookup(ids, &spec.node)?)
        .with_parent(parent)
        .with_braille(spec.braille.iter().map(|&(s, e)| Span::new(s, e)));
    if let Some(start) = spec.start {
        unit.set_start(start);
    }
    if let Some(end) = spec.end {
        unit.set_end(end);
    }
    Ok(unit)
}
