use std::path::{Path, PathBuf};

use braillemap::config::OutputFormat;
use braillemap::fixture;
use braillemap::prelude::*;
use braillemap::report::{self, Query, Report};

fn book_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/book.json")
}

fn book() -> Session<Document> {
    fixture::load(&book_path()).unwrap()
}

#[test]
fn test_fixture_loads_ordered_list() {
    let session = book();
    assert_eq!(session.list().len(), 7);
    assert!(session.list().is_ordered());
    assert_eq!(session.document().len(), 20);
    assert_eq!(session.text_len(), 19);
    assert_eq!(session.braille_len(), 19);
}

#[test]
fn test_cursor_moves_between_views() {
    let mut session = book();
    let index = session.place_cursor_text(11).unwrap();
    assert_eq!(index, 3);
    assert_eq!(session.unit_braille(index).unwrap().as_deref(), Some("⠺⠕⠗⠇⠙"));

    let index = session.place_cursor_braille(16).unwrap();
    assert_eq!(index, Some(5));
    assert_eq!(session.unit_text(5).unwrap(), "x");
}

#[test]
fn test_braille_boundary_follows_current_unit() {
    let mut session = book();
    assert_eq!(session.place_cursor_braille(15).unwrap(), Some(3));

    session.select_unit(5).unwrap();
    assert_eq!(session.place_cursor_braille(15).unwrap(), Some(5));
}

#[test]
fn test_end_of_line_marker_is_not_a_stop() {
    let session = book();
    let list = session.list();
    assert_eq!(list.next(3, false), Some(5));
    assert_eq!(list.next(3, true), Some(4));
    assert_eq!(list.previous(5, false), Some(3));
}

#[test]
fn test_select_text_inside_math_lands_on_math_unit() {
    let mut session = book();
    assert_eq!(session.select_node(NodeId(11)).unwrap(), 5);
}

#[test]
fn test_select_simple_table_cell_lands_on_duplicate() {
    let mut session = book();
    assert_eq!(session.select_node(NodeId(15)).unwrap(), 6);
}

#[test]
fn test_select_paragraph_lands_on_first_unit() {
    let mut session = book();
    assert_eq!(session.select_node(NodeId(3)).unwrap(), 1);
    assert_eq!(session.select_node(NodeId(8)).unwrap(), 5);
}

#[test]
fn test_selection_ranges() {
    let session = book();
    let list = session.list();
    assert_eq!(list.units_in_selected_range(3, 14).unwrap(), vec![1]);
    assert_eq!(list.units_one_by_one(3, 14).unwrap(), vec![1, 3]);
    assert_eq!(list.units_in_selected_range(0, 19).unwrap(), vec![0, 1, 5, 6]);
}

#[test]
fn test_page_queries() {
    let session = book();
    let list = session.list();
    assert_eq!(list.current_print_page(12).unwrap(), Some(0));
    assert!(list.in_print_page_range(1).unwrap());
    assert!(!list.in_print_page_range(5).unwrap());
    assert_eq!(list.next_page(0, PageKind::Print), None);
}

#[test]
fn test_insert_keeps_later_units_aligned() {
    let mut session = book();
    assert_eq!(session.insert_text(14, "s").unwrap(), 3);
    assert_eq!(session.text(), "p1 Hello worlds\nx ab");
    assert!(session.is_dirty());
    assert!(session.list().is_ordered());

    let index = session.place_cursor_text(16).unwrap();
    assert_eq!(index, 5);
    assert_eq!(session.unit_text(index).unwrap(), "x");
    assert_eq!(session.unit_text(3).unwrap(), "worlds");
}

#[test]
fn test_delete_across_units_is_rejected() {
    let mut session = book();
    assert_eq!(
        session.delete_text(5, 12),
        Err(SyncError::SpansUnits { start: 5, end: 12 })
    );
    assert_eq!(session.text(), "p1 Hello world\nx ab");
}

#[test]
fn test_invalid_fixture_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{").unwrap();
    let err = fixture::load(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Invalid fixture"));
    assert!(message.contains("broken.json"));
}

#[test]
fn test_node_report_as_json() {
    let mut session = book();
    let report = report::run(&mut session, &Query::Node { id: 11 }).unwrap();
    assert!(matches!(&report, Report::Node { unit, .. } if unit.index == 5));

    let json = report::render(&report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["query"], "node");
    assert_eq!(value["node"], 11);
    assert_eq!(value["unit"]["content"], "x");
}
