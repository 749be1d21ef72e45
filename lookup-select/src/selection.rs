//! Identity-keyed selection state.
//!
//! Selection is tracked by [`Identity`] so it survives re-fetches: two row
//! values with the same id are the same selectable entity. The row stored
//! for an id is whatever was passed to the toggle that selected it.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mapper::{Identity, ValueMapper};

/// Selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    /// At most one row (radio-button style).
    #[default]
    Single,
    /// Any number of rows (checkbox style).
    Multiple,
}

/// Snapshot of the selected ids and the row stored for each.
///
/// The id set and the keys of the row list are always identical; both are
/// private and only mutated together.
#[derive(Debug, Clone)]
pub struct SelectionState<T> {
    selected_ids: HashSet<Identity>,
    /// Insertion order.
    selected_rows: Vec<(Identity, T)>,
}

impl<T> Default for SelectionState<T> {
    fn default() -> Self {
        Self {
            selected_ids: HashSet::new(),
            selected_rows: Vec::new(),
        }
    }
}

impl<T> SelectionState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_ids(&self) -> &HashSet<Identity> {
        &self.selected_ids
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.selected_ids.contains(id)
    }

    /// Row stored for `id`, if selected.
    pub fn get(&self, id: &Identity) -> Option<&T> {
        self.selected_rows
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, row)| row)
    }

    /// Selected rows in the order they were selected.
    pub fn rows(&self) -> impl Iterator<Item = &T> {
        self.selected_rows.iter().map(|(_, row)| row)
    }

    /// Selected `(id, row)` pairs in the order they were selected.
    pub fn entries(&self) -> impl Iterator<Item = (&Identity, &T)> {
        self.selected_rows.iter().map(|(id, row)| (id, row))
    }

    pub fn len(&self) -> usize {
        self.selected_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty()
    }

    fn insert(&mut self, id: Identity, row: T) {
        if self.selected_ids.insert(id.clone()) {
            self.selected_rows.push((id, row));
        }
    }

    fn remove(&mut self, id: &Identity) -> bool {
        if self.selected_ids.remove(id) {
            self.selected_rows.retain(|(key, _)| key != id);
            true
        } else {
            false
        }
    }

    fn clear(&mut self) {
        self.selected_ids.clear();
        self.selected_rows.clear();
    }
}

/// Map equality: same ids, same row per id. Selection order is ignored.
impl<T: PartialEq> PartialEq for SelectionState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.selected_ids == other.selected_ids
            && self
                .selected_rows
                .iter()
                .all(|(id, row)| other.get(id) == Some(row))
    }
}

/// Owns the selection and applies the mode rules on every toggle.
pub struct SelectionStore<T> {
    mode: SelectMode,
    mapper: Arc<dyn ValueMapper<T>>,
    state: SelectionState<T>,
}

impl<T> std::fmt::Debug for SelectionStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("mode", &self.mode)
            .field("selected", &self.state.len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone> SelectionStore<T> {
    pub fn new(mode: SelectMode, mapper: Arc<dyn ValueMapper<T>>) -> Self {
        Self {
            mode,
            mapper,
            state: SelectionState::new(),
        }
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    pub fn state(&self) -> &SelectionState<T> {
        &self.state
    }

    /// Select or deselect `row`.
    ///
    /// A selected id is removed. Otherwise the row is added, after clearing
    /// any previous entry in single mode.
    pub fn toggle_row(&mut self, row: &T) -> &SelectionState<T> {
        let id = self.mapper.get_id(row);
        if !self.state.remove(&id) {
            if self.mode == SelectMode::Single {
                self.state.clear();
            }
            self.state.insert(id, row.clone());
        }
        &self.state
    }

    pub fn is_row_selected(&self, row: &T) -> bool {
        self.state.contains(&self.mapper.get_id(row))
    }

    /// Selected rows in selection order (not dataset order).
    pub fn selected_rows(&self) -> Vec<T> {
        self.state.rows().cloned().collect()
    }

    pub fn clear_selection(&mut self) -> &SelectionState<T> {
        self.state.clear();
        &self.state
    }

    /// Replaces the whole selection with `rows`.
    ///
    /// Duplicate ids keep their first occurrence; single mode keeps only the
    /// first row.
    pub fn replace(&mut self, rows: impl IntoIterator<Item = T>) -> &SelectionState<T> {
        self.state.clear();
        for row in rows {
            if self.mode == SelectMode::Single && !self.state.is_empty() {
                break;
            }
            let id = self.mapper.get_id(&row);
            self.state.insert(id, row);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::FnMapper;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: &'static str,
    }

    fn mapper() -> Arc<dyn ValueMapper<Row>> {
        Arc::new(FnMapper::new(|r: &Row| Identity::from(r.id), |r: &Row| r.name.to_string()))
    }

    fn rows() -> Vec<Row> {
        (1..=5)
            .map(|id| Row { id, name: "row" })
            .collect()
    }

    fn ids(state: &SelectionState<Row>) -> Vec<i64> {
        let mut ids: Vec<i64> = state
            .selected_ids()
            .iter()
            .map(|id| match id {
                Identity::Int(n) => *n,
                Identity::Str(_) => unreachable!(),
            })
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_single_mode_replaces_previous() {
        let data = rows();
        let mut store = SelectionStore::new(SelectMode::Single, mapper());

        assert_eq!(ids(store.toggle_row(&data[2])), vec![3]);
        assert_eq!(ids(store.toggle_row(&data[4])), vec![5]);
        assert!(!store.is_row_selected(&data[2]));
    }

    #[test]
    fn test_multiple_mode_toggle_off() {
        let data = rows();
        let mut store = SelectionStore::new(SelectMode::Multiple, mapper());

        store.toggle_row(&data[0]);
        store.toggle_row(&data[1]);
        let state = store.toggle_row(&data[0]);

        assert_eq!(ids(state), vec![2]);
        assert_eq!(state.get(&Identity::from(2)), Some(&data[1]));
        assert!(state.get(&Identity::from(1)).is_none());
    }

    #[test]
    fn test_single_mode_cardinality_holds_for_every_toggle() {
        let data = rows();
        let mut store = SelectionStore::new(SelectMode::Single, mapper());
        for i in [0, 3, 3, 1, 4, 4, 4, 2, 0] {
            let state = store.toggle_row(&data[i]);
            assert!(state.len() <= 1);
            assert_eq!(state.len(), state.rows().count());
        }
    }

    #[test]
    fn test_identity_not_reference() {
        let mut store = SelectionStore::new(SelectMode::Multiple, mapper());
        let original = Row { id: 9, name: "before" };
        let refetched = Row { id: 9, name: "after" };

        store.toggle_row(&original);
        assert!(store.is_row_selected(&refetched));
        // The stored row is the one that was toggled in.
        assert_eq!(store.selected_rows(), vec![original]);

        store.toggle_row(&refetched);
        assert!(store.state().is_empty());
    }

    #[test]
    fn test_toggle_is_self_inverse() {
        let data = rows();
        let mut store = SelectionStore::new(SelectMode::Multiple, mapper());
        store.toggle_row(&data[0]);
        store.toggle_row(&data[1]);
        store.toggle_row(&data[2]);

        for row in &data {
            let before = store.state().clone();
            store.toggle_row(row);
            store.toggle_row(row);
            assert_eq!(store.state(), &before);
        }
    }

    #[test]
    fn test_selected_rows_in_selection_order() {
        let data = rows();
        let mut store = SelectionStore::new(SelectMode::Multiple, mapper());
        store.toggle_row(&data[3]);
        store.toggle_row(&data[0]);
        store.toggle_row(&data[2]);

        let order: Vec<i64> = store.selected_rows().iter().map(|r| r.id).collect();
        assert_eq!(order, vec![4, 1, 3]);
    }

    #[test]
    fn test_clear_and_replace() {
        let data = rows();
        let mut store = SelectionStore::new(SelectMode::Single, mapper());
        store.toggle_row(&data[0]);
        assert!(store.clear_selection().is_empty());

        let state = store.replace(data.clone());
        assert_eq!(ids(state), vec![1]);

        let mut store = SelectionStore::new(SelectMode::Multiple, mapper());
        let state = store.replace(vec![data[1].clone(), data[1].clone(), data[4].clone()]);
        assert_eq!(ids(state), vec![2, 5]);
    }

    #[test]
    fn test_select_mode_serde() {
        assert_eq!(serde_json::to_string(&SelectMode::Multiple).unwrap(), "\"multiple\"");
        let mode: SelectMode = serde_json::from_str("\"single\"").unwrap();
        assert_eq!(mode, SelectMode::Single);
    }
}
