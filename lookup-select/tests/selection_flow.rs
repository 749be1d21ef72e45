use std::sync::{Arc, Mutex};

use lookup_select::prelude::*;
use lookup_select::return_value::{ReturnConfig, map_return_value};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct User {
    id: i64,
    name: String,
    city: String,
}

impl LookupRow for User {
    fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "name" => Some(self.name.clone()),
            "city" => Some(self.city.clone()),
            _ => None,
        }
    }
}

fn user(id: i64, name: &str, city: &str) -> User {
    User {
        id,
        name: name.to_string(),
        city: city.to_string(),
    }
}

fn users() -> Vec<User> {
    vec![
        user(1, "Ayla", "Izmir"),
        user(2, "Bora", "Ankara"),
        user(3, "Cem", "Istanbul"),
        user(4, "Deniz", "Bursa"),
        user(5, "Ece", "Ankara"),
    ]
}

fn mapper() -> Arc<dyn ValueMapper<User>> {
    Arc::new(FnMapper::new(|u: &User| Identity::from(u.id), |u: &User| u.name.clone()))
}

fn config(mode: SelectMode) -> LookupConfig<User> {
    LookupConfig::new(mapper(), RowSource::Rows(users()))
        .with_mode(mode)
        .with_columns(vec![
            Column::new("name", "Name").sortable(),
            Column::new("city", "City"),
        ])
}

fn controller(mode: SelectMode) -> SelectionController<User> {
    SelectionController::new(config(mode), Callbacks::new()).unwrap()
}

fn ids(lookup: &SelectionController<User>) -> Vec<i64> {
    let mut ids: Vec<i64> = lookup.selected_rows().iter().map(|u| u.id).collect();
    ids.sort();
    ids
}

#[test]
fn test_single_mode_replaces_selection() {
    let mut lookup = controller(SelectMode::Single);
    let rows = lookup.page_rows();

    lookup.toggle_row(&rows[2]);
    assert_eq!(ids(&lookup), vec![3]);
    lookup.toggle_row(&rows[4]);
    assert_eq!(ids(&lookup), vec![5]);
}

#[test]
fn test_multiple_mode_toggle_off() {
    let mut lookup = controller(SelectMode::Multiple);
    let rows = lookup.page_rows();

    lookup.toggle_row(&rows[0]);
    lookup.toggle_row(&rows[1]);
    lookup.toggle_row(&rows[0]);
    assert_eq!(ids(&lookup), vec![2]);
}

#[test]
fn test_refetched_row_is_same_entity() {
    let mut lookup = controller(SelectMode::Multiple);
    lookup.toggle_row(&user(2, "Bora", "Ankara"));
    assert!(lookup.is_row_selected(&user(2, "Bora (renamed)", "Konya")));
}

#[test]
fn test_search_resets_page_and_notifies() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let callbacks =
        Callbacks::new().on_query_change(move |q: &QueryState| log.lock().unwrap().push(q.clone()));
    let mut lookup = SelectionController::new(config(SelectMode::Single), callbacks).unwrap();

    lookup.update_query(QueryPatch::new().page(3));
    let state = lookup.update_query(QueryPatch::new().search("x"));

    assert_eq!(state.page, 1);
    assert_eq!(state.search.as_deref(), Some("x"));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].page, 3);
    assert_eq!(seen[1], state);
}

#[test]
fn test_local_search_matches_any_declared_column() {
    let mut lookup = controller(SelectMode::Single);
    lookup.update_query(QueryPatch::new().search("ANK"));
    let names: Vec<String> = lookup.page_rows().into_iter().map(|u| u.name).collect();
    assert_eq!(names, vec!["Bora", "Ece"]);

    // Selection survives the filter.
    let bora = lookup.page_rows()[0].clone();
    lookup.toggle_row(&bora);
    lookup.update_query(QueryPatch::new().search(""));
    assert_eq!(lookup.total(), 5);
    assert_eq!(ids(&lookup), vec![2]);
}

#[test]
fn test_confirm_emits_change_then_confirm() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let (a, b, c) = (events.clone(), events.clone(), events.clone());
    let callbacks = Callbacks::new()
        .on_change(move |v: &ReturnValue<User>| {
            a.lock().unwrap().push(format!("change:{}", v.len()))
        })
        .on_confirm(move |v: &ReturnValue<User>| {
            b.lock().unwrap().push(format!("confirm:{}", v.len()))
        })
        .on_open_change(move |open| c.lock().unwrap().push(format!("open:{open}")));

    let mut lookup = SelectionController::new(config(SelectMode::Multiple), callbacks).unwrap();
    lookup.open();
    let rows = lookup.page_rows();
    lookup.toggle_row(&rows[3]);
    lookup.toggle_row(&rows[0]);

    let value = lookup.confirm_selection().unwrap();
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        serde_json::json!([{"id": 4, "text": "Deniz"}, {"id": 1, "text": "Ayla"}])
    );
    assert_eq!(
        *events.lock().unwrap(),
        vec!["open:true", "change:2", "confirm:2", "open:false"]
    );

    // Reopening shows the confirmed selection.
    lookup.open();
    assert_eq!(ids(&lookup), vec![1, 4]);
}

#[test]
fn test_cancel_discards_without_selection_event() {
    let selection_events = Arc::new(Mutex::new(0));
    let cancelled = Arc::new(Mutex::new(false));
    let (s, c) = (selection_events.clone(), cancelled.clone());
    let callbacks = Callbacks::new()
        .on_selection_change(move |_: &[User]| *s.lock().unwrap() += 1)
        .on_cancel(move || *c.lock().unwrap() = true);

    let mut lookup = SelectionController::new(config(SelectMode::Single), callbacks).unwrap();
    lookup.open();
    let first = lookup.page_rows()[0].clone();
    lookup.toggle_row(&first);
    lookup.cancel_selection();

    assert!(lookup.selected_rows().is_empty());
    assert!(!lookup.modal_open());
    assert!(*cancelled.lock().unwrap());
    assert_eq!(*selection_events.lock().unwrap(), 1);
}

#[test]
fn test_empty_confirm_sentinels() {
    let mut single = controller(SelectMode::Single);
    assert_eq!(single.confirm_selection().unwrap(), ReturnValue::Single(None));

    let mut multiple = controller(SelectMode::Multiple);
    let value = multiple.confirm_selection().unwrap();
    assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!([]));
}

#[test]
fn test_row_and_custom_shapes() {
    let mut lookup = SelectionController::new(
        config(SelectMode::Single).with_return_shape(ReturnShape::Row),
        Callbacks::new(),
    )
    .unwrap();
    let cem = lookup.page_rows()[2].clone();
    lookup.toggle_row(&cem);
    assert_eq!(
        lookup.confirm_selection().unwrap(),
        ReturnValue::Single(Some(Mapped::Row(cem.clone())))
    );

    let map = ReturnMap::new(|u: &User| serde_json::json!({ "key": u.id, "where": u.city }));
    let config = config(SelectMode::Multiple).with_return_map(map);
    let mut lookup = SelectionController::new(config, Callbacks::new()).unwrap();
    lookup.toggle_row(&cem);
    let value = lookup.confirm_selection().unwrap();
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        serde_json::json!([{"key": 3, "where": "Istanbul"}])
    );
}

#[test]
fn test_custom_shape_without_map_is_a_config_error() {
    let err = SelectionController::new(
        config(SelectMode::Single).with_return_shape(ReturnShape::Custom),
        Callbacks::new(),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::MissingReturnMap);

    let mapper = FnMapper::new(|u: &User| Identity::from(u.id), |u: &User| u.name.clone());
    let result = map_return_value(
        &users()[..1],
        &ReturnConfig {
            shape: ReturnShape::Custom,
            return_map: None,
            mapper: &mapper,
            mode: SelectMode::Single,
        },
    );
    assert_eq!(result, Err(ConfigError::MissingReturnMap));
}

#[test]
fn test_selectable_row_predicate() {
    let config = config(SelectMode::Multiple)
        .with_selectable_row(SelectableRow::new(|u: &User| u.city != "Ankara"));
    let mut lookup = SelectionController::new(config, Callbacks::new()).unwrap();

    assert_eq!(lookup.select_all_visible(), 3);
    assert_eq!(ids(&lookup), vec![1, 3, 4]);
    assert!(!lookup.toggle_row(&user(2, "Bora", "Ankara")));
    assert_eq!(lookup.header_check_state(), HeaderCheckState::Checked);
}

#[test]
fn test_confirmed_value_round_trips_as_controlled_value() {
    let mut lookup = controller(SelectMode::Multiple);
    let rows = lookup.page_rows();
    lookup.toggle_row(&rows[1]);
    lookup.toggle_row(&rows[4]);
    let value = lookup.confirm_selection().unwrap();

    let mut other = controller(SelectMode::Multiple);
    other.set_value(SelectionValue::from_return(value));
    assert_eq!(ids(&other), vec![2, 5]);
}

#[test]
fn test_render_with_text_slots() {
    let mut lookup = SelectionController::new(
        config(SelectMode::Multiple).with_default_value(SelectionValue::ids([1, 2, 3, 4])),
        Callbacks::new(),
    )
    .unwrap();

    let closed = lookup_select::slots::render(&lookup, &TextSlots);
    assert_eq!(closed, vec!["[Ayla] [Bora] [Cem] +1 more ▼"]);

    lookup.open();
    let open = lookup_select::slots::render(&lookup, &TextSlots);
    assert!(open.iter().any(|line| line.contains("[-] Name ↕ | City")));
    assert!(open.iter().any(|line| line.contains("[x] Ayla | Izmir")));
    assert!(open.iter().any(|line| line.contains("[ ] Ece | Ankara")));
    assert!(open.iter().any(|line| line.contains("4 selected")));
}
