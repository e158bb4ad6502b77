//! Queries the command line runs against a session, and their printable
//! results.

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use crate::config::OutputFormat;
use crate::document::{DocumentTree, NodeId};
use crate::editor::Session;
use crate::unit::{Span, UnitId};

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// List every unit with its resolved offsets
    Dump,
    /// Resolve a text-view offset to a unit
    Text {
        offset: usize,
        /// Unit index to treat as the current position
        #[arg(long, value_name = "INDEX")]
        hint: Option<usize>,
    },
    /// Resolve a braille-view offset to a unit
    Braille {
        offset: usize,
        /// Unit index to treat as the current position
        #[arg(long, value_name = "INDEX")]
        hint: Option<usize>,
    },
    /// Find the unit backing a document node
    Node { id: u32 },
    /// List the units touched by a text selection
    Range {
        start: usize,
        end: usize,
        /// Resolve every offset instead of jumping over units
        #[arg(long)]
        one_by_one: bool,
    },
    /// Show the print page a text offset falls on
    Page { offset: usize },
}

/// One unit as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRow {
    pub index: usize,
    pub id: UnitId,
    pub kind: &'static str,
    pub node: NodeId,
    pub parent: Option<NodeId>,
    pub text: Span,
    pub braille: Option<Span>,
    pub content: String,
}

impl UnitRow {
    /// # Errors
    /// Returns an error if `index` is not in the session's list.
    pub fn from_session<D: DocumentTree>(session: &Session<D>, index: usize) -> Result<Self> {
        let content = session.unit_text(index)?;
        let list = session.list();
        let unit = list
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("unit {index} disappeared"))?;
        Ok(Self {
            index,
            id: unit.id(),
            kind: unit.kind().label(),
            node: unit.node(),
            parent: unit.parent_node(),
            text: list.text_span(index),
            braille: unit.braille_span(),
            content,
        })
    }

    fn plain(&self) -> String {
        let braille = self
            .braille
            .map_or_else(|| "-".to_string(), |s| format!("{}..{}", s.start, s.end));
        format!(
            "{:>4}  {:<5} {:<15} {:<5} text {:>9}  braille {:>9}  {:?}",
            self.index,
            self.id.to_string(),
            self.kind,
            self.node.to_string(),
            format!("{}..{}", self.text.start, self.text.end),
            braille,
            self.content,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "query", rename_all = "kebab-case")]
pub enum Report {
    Dump {
        units: Vec<UnitRow>,
    },
    Text {
        offset: usize,
        unit: UnitRow,
    },
    Braille {
        offset: usize,
        unit: Option<UnitRow>,
    },
    Node {
        node: NodeId,
        unit: UnitRow,
    },
    Range {
        start: usize,
        end: usize,
        units: Vec<UnitRow>,
    },
    Page {
        offset: usize,
        page: Option<UnitRow>,
        on_boundary: bool,
    },
}

/// Run `query` against `session`, moving its cursor where the query implies.
///
/// # Errors
/// Returns an error if the list and document are out of sync, a hint index is
/// out of range, or the node has no unit.
pub fn run<D: DocumentTree>(session: &mut Session<D>, query: &Query) -> Result<Report> {
    let rows = |session: &Session<D>, indices: Vec<usize>| {
        indices
            .into_iter()
            .map(|i| UnitRow::from_session(session, i))
            .collect::<Result<Vec<_>>>()
    };

    let report = match *query {
        Query::Dump => Report::Dump {
            units: rows(session, (0..session.list().len()).collect())?,
        },
        Query::Text { offset, hint } => {
            if let Some(hint) = hint {
                session.select_unit(hint)?;
            }
            let index = session.place_cursor_text(offset)?;
            Report::Text {
                offset,
                unit: UnitRow::from_session(session, index)?,
            }
        }
        Query::Braille { offset, hint } => {
            if let Some(hint) = hint {
                session.select_unit(hint)?;
            }
            let unit = match session.place_cursor_braille(offset)? {
                Some(index) => Some(UnitRow::from_session(session, index)?),
                None => None,
            };
            Report::Braille { offset, unit }
        }
        Query::Node { id } => {
            let node = NodeId(id);
            let index = session.select_node(node)?;
            Report::Node {
                node,
                unit: UnitRow::from_session(session, index)?,
            }
        }
        Query::Range {
            start,
            end,
            one_by_one,
        } => {
            let indices = if one_by_one {
                session.list().units_one_by_one(start, end)?
            } else {
                session.list().units_in_selected_range(start, end)?
            };
            Report::Range {
                start,
                end,
                units: rows(session, indices)?,
            }
        }
        Query::Page { offset } => {
            let on_boundary = session.list().in_print_page_range(offset)?;
            let page = match session.list().current_print_page(offset)? {
                Some(index) => Some(UnitRow::from_session(session, index)?),
                None => None,
            };
            Report::Page {
                offset,
                page,
                on_boundary,
            }
        }
    };
    Ok(report)
}

/// Format a report for stdout.
///
/// # Errors
/// Returns an error if JSON serialization fails.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Plain => Ok(render_plain(report)),
    }
}

fn render_plain(report: &Report) -> String {
    let mut out = String::new();
    match report {
        Report::Dump { units } => {
            if units.is_empty() {
                out.push_str("(no units)");
            }
            for row in units {
                let _ = writeln!(out, "{}", row.plain());
            }
        }
        Report::Text { offset, unit } => {
            let _ = write!(out, "text {offset} -> {}", unit.plain());
        }
        Report::Braille { offset, unit } => match unit {
            Some(unit) => {
                let _ = write!(out, "braille {offset} -> {}", unit.plain());
            }
            None => {
                let _ = write!(out, "braille {offset} -> no unit has braille");
            }
        },
        Report::Node { node, unit } => {
            let _ = write!(out, "node {node} -> {}", unit.plain());
        }
        Report::Range { start, end, units } => {
            let _ = writeln!(out, "range {start}..{end}: {} unit(s)", units.len());
            for row in units {
                let _ = writeln!(out, "{}", row.plain());
            }
        }
        Report::Page {
            offset,
            page,
            on_boundary,
        } => {
            match page {
                Some(page) => {
                    let _ = write!(out, "page {offset} -> {}", page.plain());
                }
                None => {
                    let _ = write!(out, "page {offset} -> before the first print page");
                }
            }
            if *on_boundary {
                out.push_str(" (on page marker)");
            }
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::fixture;

    const BOOK: &str = r#"{
        "text": "p1 Hello world",
        "braille": "⠏⠼⠁⠠⠓⠑⠇⠇⠕ ⠺⠕⠗⠇⠙",
        "tree": { "name": "doc", "children": [
            { "id": "pn", "name": "pagenum", "children": [ { "text": "p1" } ] },
            { "id": "p", "name": "p", "children": [
                { "id": "hello", "text": "Hello" },
                { "id": "space", "text": " " },
                { "id": "world", "text": "world" }
            ] }
        ] },
        "units": [
            { "kind": "print-page", "node": "pn", "start": 0, "end": 2, "braille": [[0, 3]] },
            { "kind": "content", "node": "hello", "parent": "p",
              "start": 3, "end": 8, "braille": [[3, 9]] },
            { "kind": "whitespace", "node": "space", "parent": "p",
              "start": 8, "end": 9, "braille": [[9, 10]] },
            { "kind": "content", "node": "world", "parent": "p",
              "start": 9, "end": 14, "braille": [[10, 15]] }
        ]
    }"#;

    fn book() -> Session<Document> {
        fixture::from_json(BOOK).unwrap()
    }

    #[test]
    fn test_dump_lists_every_unit() {
        let mut session = book();
        let Report::Dump { units } = run(&mut session, &Query::Dump).unwrap() else {
            panic!("expected dump report");
        };
        assert_eq!(units.len(), 4);
        assert_eq!(units[0].kind, "print-page");
        assert_eq!(units[1].content, "Hello");
        assert_eq!(units[3].braille, Some(Span::new(10, 15)));
    }

    #[test]
    fn test_text_query_honours_hint() {
        let mut session = book();
        let plain = run(&mut session, &Query::Text { offset: 8, hint: None }).unwrap();
        let Report::Text { unit, .. } = plain else {
            panic!("expected text report");
        };
        assert_eq!(unit.index, 1);

        let hinted = run(&mut session, &Query::Text { offset: 8, hint: Some(2) }).unwrap();
        let Report::Text { unit, .. } = hinted else {
            panic!("expected text report");
        };
        assert_eq!(unit.index, 2);
    }

    #[test]
    fn test_bad_hint_is_an_error() {
        let mut session = book();
        assert!(run(&mut session, &Query::Text { offset: 0, hint: Some(9) }).is_err());
    }

    #[test]
    fn test_node_query_reports_stale_node() {
        let mut session = book();
        let err = run(&mut session, &Query::Node { id: 99 }).unwrap_err();
        assert!(err.to_string().contains("#99"));
    }

    #[test]
    fn test_range_collapses_units_with_same_parent() {
        let mut session = book();
        let query = Query::Range {
            start: 3,
            end: 14,
            one_by_one: false,
        };
        let Report::Range { units, .. } = run(&mut session, &query).unwrap() else {
            panic!("expected range report");
        };
        let indices: Vec<usize> = units.iter().map(|u| u.index).collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn test_page_query_finds_enclosing_page() {
        let mut session = book();
        let report = run(&mut session, &Query::Page { offset: 11 }).unwrap();
        let Report::Page {
            page, on_boundary, ..
        } = report
        else {
            panic!("expected page report");
        };
        assert_eq!(page.map(|p| p.index), Some(0));
        assert!(!on_boundary);
    }

    #[test]
    fn test_render_json_is_tagged_by_query() {
        let mut session = book();
        let report = run(&mut session, &Query::Text { offset: 4, hint: None }).unwrap();
        let json = render(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["query"], "text");
        assert_eq!(value["unit"]["kind"], "content");
        assert_eq!(value["unit"]["text"]["start"], 3);
    }

    #[test]
    fn test_render_plain_text_query() {
        let mut session = book();
        let report = run(&mut session, &Query::Text { offset: 4, hint: None }).unwrap();
        let plain = render(&report, OutputFormat::Plain).unwrap();
        assert!(plain.starts_with("text 4 ->"));
        assert!(plain.contains("\"Hello\""));
    }

    #[test]
    fn test_render_plain_empty_dump() {
        let report = Report::Dump { units: Vec::new() };
        assert_eq!(render(&report, OutputFormat::Plain).unwrap(), "(no units)");
    }
}
