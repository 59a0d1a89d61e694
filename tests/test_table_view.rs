mod common;

use common::{calls, numbered_records, CountingSource};
use ratatui::style::Modifier;
use serde_json::json;
use std::time::Duration;
use tabview::data::record::record_from_value;
use tabview::data::{IndexedTable, Table, TableHandle};
use tabview::ui::{Key, MemorySurface, ScriptedKeys, Step, TableView, ViewOptions};

fn view_over(records: Vec<tabview::data::Record>, height: u16, width: u16) -> TableView<MemorySurface> {
    let base = TableHandle::new(IndexedTable::new(CountingSource::new(records).0));
    TableView::new(MemorySurface::new(height, width), base, ViewOptions::default())
}

fn row_text(id: usize) -> String {
    format!("{:<20}{}", id, format!("item-{id}"))
}

#[tokio::test]
async fn test_initial_draw() {
    let mut view = view_over(numbered_records(5), 6, 40);
    view.draw().await.unwrap();

    let surface = view.surface();
    assert_eq!(surface.line(0), format!("{:<20}{}", "id", "name"));
    for id in 0..4 {
        assert_eq!(surface.line(id as u16 + 1), row_text(id));
    }
    assert_eq!(surface.line(5), "Search:");
    assert_eq!(surface.cursor(), (5, 8));
    assert_eq!(surface.displayed_line(1), row_text(0));

    // header and the selected row are emphasised
    assert!(surface.style_at(0, 0).add_modifier.contains(Modifier::BOLD));
    assert!(surface.style_at(1, 0).add_modifier.contains(Modifier::BOLD));
    assert!(!surface.style_at(2, 0).add_modifier.contains(Modifier::BOLD));
}

#[tokio::test]
async fn test_scroll_window_follows_selection() {
    let mut view = view_over(numbered_records(12), 5, 40);
    view.draw().await.unwrap();
    for _ in 0..10 {
        view.handle_key(Key::Down).await.unwrap();
    }
    assert_eq!(view.selected_row(), 10);

    let surface = view.surface();
    assert_eq!(surface.line(1), row_text(8));
    assert_eq!(surface.line(2), row_text(9));
    assert_eq!(surface.line(3), row_text(10));
    assert!(surface.style_at(3, 0).add_modifier.contains(Modifier::BOLD));
    assert!(!surface.style_at(1, 0).add_modifier.contains(Modifier::BOLD));
}

#[tokio::test]
async fn test_moves_stop_at_the_ends() {
    let mut view = view_over(numbered_records(3), 10, 40);
    view.draw().await.unwrap();

    view.handle_key(Key::Up).await.unwrap();
    assert_eq!(view.selected_row(), 0);

    for _ in 0..5 {
        view.handle_key(Key::Down).await.unwrap();
    }
    assert_eq!(view.selected_row(), 2);
    assert!(!view.is_filtered());
}

#[tokio::test]
async fn test_search_filters_rows() {
    let records = vec![
        record_from_value(json!({"a": 1})),
        record_from_value(json!({"a": 2})),
        record_from_value(json!({"a": 3})),
    ];
    let mut view = view_over(records, 6, 20);
    view.draw().await.unwrap();

    view.handle_key(Key::Char('2')).await.unwrap();
    assert!(view.is_filtered());
    assert_eq!(view.search_text(), "2");

    let surface = view.surface();
    assert_eq!(surface.line(0), "a");
    assert_eq!(surface.line(1), "2");
    assert_eq!(surface.line(2), "");
    assert_eq!(surface.line(5), "Search: 2");
    assert_eq!(surface.cursor(), (5, 9));

    let mut active = view.active_table().clone();
    assert_eq!(active.get(0).await.unwrap()["a"], json!(2));
    assert!(active.get(1).await.is_none());

    match view.handle_key(Key::Enter).await.unwrap() {
        Step::Done(Some(record)) => assert_eq!(record["a"], json!(2)),
        other => panic!("expected a selection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_clearing_search_restores_base_table() {
    let mut view = view_over(numbered_records(5), 6, 40);
    view.draw().await.unwrap();
    let base = view.base_table().clone();

    view.handle_key(Key::Char('3')).await.unwrap();
    let first_filter = view.active_table().clone();
    assert!(!first_filter.same_table(&base));

    view.handle_key(Key::Char('x')).await.unwrap();
    assert!(!view.active_table().same_table(&first_filter));
    assert_eq!(view.surface().line(1), "");

    view.handle_key(Key::Backspace).await.unwrap();
    view.handle_key(Key::Backspace).await.unwrap();
    assert_eq!(view.search_text(), "");
    assert!(view.active_table().same_table(&base));
    assert_eq!(view.surface().line(1), row_text(0));

    // backspace on empty text is harmless
    view.handle_key(Key::Backspace).await.unwrap();
    assert!(view.active_table().same_table(&base));
}

#[tokio::test]
async fn test_widening_query_brings_rows_back() {
    let mut view = view_over(numbered_records(5), 6, 40);
    view.draw().await.unwrap();

    for key in ScriptedKeys::typing("3x") {
        view.handle_key(key).await.unwrap();
    }
    assert_eq!(view.surface().line(1), "");

    view.handle_key(Key::Backspace).await.unwrap();
    assert_eq!(view.search_text(), "3");
    assert!(view.is_filtered());
    assert_eq!(view.surface().line(1), row_text(3));
    assert_eq!(view.surface().line(2), "");

    let mut active = view.active_table().clone();
    assert_eq!(active.get(0).await.unwrap()["id"], json!(3));
}

#[tokio::test]
async fn test_down_at_last_row_leaves_table_untouched() {
    let (source, counter) = CountingSource::new(numbered_records(3));
    let base = TableHandle::new(IndexedTable::new(source));
    let mut view = TableView::new(MemorySurface::new(10, 40), base, ViewOptions::default());

    view.draw().await.unwrap();
    // three records plus the exhaustion probe from the blank rows
    assert_eq!(calls(&counter), 4);

    view.handle_key(Key::Down).await.unwrap();
    view.handle_key(Key::Down).await.unwrap();
    assert_eq!(view.selected_row(), 2);
    let before = view.surface().lines();

    for _ in 0..3 {
        view.handle_key(Key::Down).await.unwrap();
    }
    assert_eq!(view.selected_row(), 2);
    assert_eq!(calls(&counter), 4);
    assert_eq!(view.surface().lines(), before);
    assert!(!view.is_filtered());

    let mut base = view.base_table().clone();
    assert_eq!(base.get(2).await.unwrap()["id"], json!(2));
    assert!(base.get(3).await.is_none());
    assert_eq!(calls(&counter), 4);
}

#[tokio::test]
async fn test_named_keys_repaint_without_editing() {
    let mut view = view_over(numbered_records(5), 6, 40);
    view.handle_key(Key::Char('3')).await.unwrap();
    let filter = view.active_table().clone();
    let flushes = view.surface().flush_count();

    view.handle_key(Key::Other).await.unwrap();
    assert_eq!(view.search_text(), "3");
    assert!(view.active_table().same_table(&filter));
    assert_eq!(view.surface().flush_count(), flushes + 1);
    assert_eq!(view.surface().line(5), "Search: 3");
}

#[tokio::test]
async fn test_empty_source() {
    let (source, counter) = CountingSource::new(Vec::new());
    let base = TableHandle::new(IndexedTable::new(source));
    let mut view = TableView::new(MemorySurface::new(5, 30), base, ViewOptions::default());

    view.draw().await.unwrap();
    assert_eq!(view.surface().line(0), "");
    assert_eq!(view.surface().line(1), "");
    assert_eq!(view.surface().line(4), "Search:");

    view.handle_key(Key::Down).await.unwrap();
    assert_eq!(view.selected_row(), 0);

    match view.handle_key(Key::Enter).await.unwrap() {
        Step::Done(selection) => assert!(selection.is_none()),
        Step::Continue => panic!("enter must end the view"),
    }
    assert_eq!(calls(&counter), 1);
}

#[tokio::test]
async fn test_headers_come_from_base_while_filtered() {
    let records = vec![
        record_from_value(json!({"kind": "wide", "extra": "x"})),
        record_from_value(json!({"other": "narrow"})),
    ];
    let mut view = view_over(records, 5, 20);
    view.handle_key(Key::Char('n')).await.unwrap();

    let surface = view.surface();
    assert_eq!(surface.line(0), format!("{:<10}{}", "kind", "extra"));
    assert_eq!(surface.line(1), "narrow");
}

#[tokio::test]
async fn test_resize_repaints_with_new_dimensions() {
    let mut view = view_over(numbered_records(10), 4, 40);
    view.draw().await.unwrap();
    assert_eq!(view.surface().line(3), "Search:");

    view.surface_mut().set_terminal_size(7, 20);
    view.handle_key(Key::Resize).await.unwrap();

    let surface = view.surface();
    assert_eq!(surface.resize_count(), 1);
    assert_eq!(surface.lines().len(), 7);
    assert_eq!(surface.line(6), "Search:");
    assert_eq!(surface.line(5), format!("{:<10}{}", 4, "item-4"));
}

#[tokio::test]
async fn test_show_returns_confirmed_record() {
    let mut view = view_over(numbered_records(10), 6, 40);
    let mut keys = ScriptedKeys::new([Key::Down, Key::Down, Key::Enter, Key::Down]);

    let selection = view.show(&mut keys).await.unwrap();
    assert_eq!(selection.unwrap()["id"], json!(2));
    assert_eq!(keys.remaining(), 1);
}

#[tokio::test]
async fn test_show_search_then_confirm() {
    let mut view = view_over(numbered_records(30), 6, 40);
    let mut script = ScriptedKeys::typing("item-2");
    script.extend([Key::Down, Key::Enter]);
    let mut keys = ScriptedKeys::new(script);

    // item-2, item-20, item-21, ...
    let selection = view.show(&mut keys).await.unwrap();
    assert_eq!(selection.unwrap()["id"], json!(20));
}

#[tokio::test]
async fn test_show_cancel() {
    let mut view = view_over(numbered_records(3), 6, 40);
    let mut keys = ScriptedKeys::new([Key::Down, Key::Escape]);
    assert!(view.show(&mut keys).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_fast_rows_flush_once_per_frame() {
    let mut view = view_over(numbered_records(10), 6, 40);
    view.draw().await.unwrap();
    assert_eq!(view.surface().flush_count(), 1);

    // no refresh is left pending after the frame
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(view.surface().flush_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_rows_flush_partial_frames() {
    let (source, _) = CountingSource::new(numbered_records(10));
    let base = TableHandle::new(IndexedTable::new(source.with_delay(Duration::from_millis(250))));
    let mut view = TableView::new(MemorySurface::new(5, 40), base, ViewOptions::default());

    view.draw().await.unwrap();

    // row 0 is cached by the schema lookup; rows 1 and 2 each outlast the
    // refresh delay once, then the finished frame is flushed
    assert_eq!(view.surface().flush_count(), 3);
    assert_eq!(view.surface().displayed_line(3), row_text(2));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(view.surface().flush_count(), 3);

    // cached rows are fast again
    view.handle_key(Key::Up).await.unwrap();
    assert_eq!(view.surface().flush_count(), 4);
}
