use std::sync::Arc;

use lookup_select::prelude::*;
use lookup_select::window::compute_window;
use serde_json::{Value, json};

fn numbered(count: usize) -> Vec<Value> {
    (0..count).map(|i| json!({"id": i, "label": format!("row {i}")})).collect()
}

fn lookup(count: usize, virtualization: VirtualizationConfig) -> SelectionController<Value> {
    let mapper = FnMapper::new(
        |v: &Value| Identity::from_json(&v["id"]).unwrap_or(Identity::Int(-1)),
        |v: &Value| v["label"].as_str().unwrap_or_default().to_string(),
    );
    let config = LookupConfig::new(Arc::new(mapper), RowSource::Rows(numbered(count)))
        .with_columns(vec![Column::new("label", "Label")])
        .with_virtualization(virtualization);
    SelectionController::new(config, Callbacks::new()).unwrap()
}

#[test]
fn test_reference_window() {
    let window = compute_window(2000.0, 400.0, 40.0, 5, 1000);
    assert_eq!(window.start_index(), 45);
    assert_eq!(window.end_index(), Some(65));

    let tops: Vec<f64> = window.items().map(|item| item.top).take(2).collect();
    assert_eq!(tops, vec![1800.0, 1840.0]);
}

#[test]
fn test_window_bounds_for_many_inputs() {
    for item_count in 0..40usize {
        for scroll in (0..30).map(|s| s as f64 * 37.0) {
            let window = compute_window(scroll, 120.0, 40.0, 2, item_count);
            match window.end_index() {
                None => assert_eq!(item_count, 0),
                Some(end) => {
                    assert!(window.start_index() <= end);
                    assert!(end < item_count);
                }
            }
        }
    }
}

#[test]
fn test_controller_materialises_only_the_window() {
    let mut lookup = lookup(1000, VirtualizationConfig::default().with_enabled(true));
    lookup.open();
    lookup.observe_viewport(2000.0, 400.0);

    let grid = lookup.grid_props();
    assert!(grid.virtualized);
    assert_eq!(grid.rows.len(), 21);
    assert_eq!(grid.rows.first().map(|r| r.index), Some(45));
    assert_eq!(grid.rows.last().map(|r| r.index), Some(65));
    assert_eq!(grid.rows[0].top, 1800.0);
    assert_eq!(grid.rows[0].cells, vec!["row 45"]);
    assert_eq!(grid.rows[0].id, Identity::from(45));
    assert_eq!(grid.total_height, 40_000.0);
}

#[test]
fn test_below_threshold_materialises_everything() {
    let mut lookup = lookup(99, VirtualizationConfig::default().with_enabled(true));
    lookup.observe_viewport(2000.0, 400.0);

    let grid = lookup.grid_props();
    assert!(!grid.virtualized);
    assert_eq!(grid.rows.len(), 99);
}

#[test]
fn test_window_follows_filtered_rows() {
    let virtualization = VirtualizationConfig::default()
        .with_enabled(true)
        .with_threshold(10);
    let mut lookup = lookup(1000, virtualization);
    lookup.observe_viewport(0.0, 80.0);
    // "row 1", "row 10".."row 19", "row 100".."row 199": 111 rows.
    lookup.update_query(QueryPatch::new().search("row 1"));
    assert_eq!(lookup.total(), 111);

    let window = lookup.visible_window();
    assert_eq!(window.start_index(), 0);
    assert_eq!(window.end_index(), Some(7));

    lookup.update_query(QueryPatch::new().search("row 999"));
    let grid = lookup.grid_props();
    assert!(!grid.virtualized);
    assert_eq!(grid.rows.len(), 1);
}

#[test]
fn test_empty_dataset() {
    let lookup = lookup(0, VirtualizationConfig::default().with_enabled(true).with_threshold(0));
    let window = lookup.visible_window();
    assert!(window.is_empty());
    assert!(lookup.grid_props().rows.is_empty());
}
