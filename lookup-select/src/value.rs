//! Declared selection values and their resolution against loaded rows.
//!
//! A host declares a selection (controlled `value` or uncontrolled default)
//! as rows or as id-bearing shapes. Before it can be shown it is resolved to
//! concrete rows by matching identities against the rows currently loaded.

use std::collections::{HashMap, HashSet};

use crate::mapper::{Identity, ValueMapper};
use crate::return_value::{IdText, Mapped, ReturnValue};
use crate::selection::SelectMode;

/// One declared entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueItem<T> {
    Row(T),
    Id(Identity),
    IdText(IdText),
}

impl<T> ValueItem<T> {
    pub fn identity(&self, mapper: &dyn ValueMapper<T>) -> Identity {
        match self {
            Self::Row(row) => mapper.get_id(row),
            Self::Id(id) => id.clone(),
            Self::IdText(v) => v.id.clone(),
        }
    }
}

impl<T> From<Identity> for ValueItem<T> {
    fn from(id: Identity) -> Self {
        Self::Id(id)
    }
}

impl<T> From<IdText> for ValueItem<T> {
    fn from(value: IdText) -> Self {
        Self::IdText(value)
    }
}

/// A declared selection: one entry, or a list (multiple mode).
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionValue<T> {
    One(ValueItem<T>),
    Many(Vec<ValueItem<T>>),
}

impl<T> SelectionValue<T> {
    pub fn items(&self) -> &[ValueItem<T>] {
        match self {
            Self::One(item) => std::slice::from_ref(item),
            Self::Many(items) => items,
        }
    }

    /// Selection value holding `ids`.
    pub fn ids<I>(ids: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Identity>,
    {
        Self::Many(ids.into_iter().map(|id| ValueItem::Id(id.into())).collect())
    }

    /// Wraps selected rows in the value shape of `mode`.
    ///
    /// Returns `None` for an empty selection.
    pub fn from_rows(rows: Vec<T>, mode: SelectMode) -> Option<Self> {
        let mut items = rows.into_iter().map(ValueItem::Row);
        match mode {
            SelectMode::Single => items.next().map(Self::One),
            SelectMode::Multiple => Some(Self::Many(items.collect())),
        }
    }

    /// Feeds a confirmed value back in as a declared one.
    ///
    /// Rows and `{id, text}` pairs carry over. Custom JSON values contribute
    /// their `"id"` property when it is a string or integer and are dropped
    /// otherwise. Returns `None` for the empty sentinels.
    pub fn from_return(value: ReturnValue<T>) -> Option<Self> {
        fn item<T>(mapped: Mapped<T>) -> Option<ValueItem<T>> {
            match mapped {
                Mapped::Row(row) => Some(ValueItem::Row(row)),
                Mapped::IdText(v) => Some(ValueItem::IdText(v)),
                Mapped::Custom(json) => {
                    json.get("id").and_then(Identity::from_json).map(ValueItem::Id)
                }
            }
        }

        match value {
            ReturnValue::Single(mapped) => mapped.and_then(item).map(Self::One),
            ReturnValue::Multiple(items) => {
                Some(Self::Many(items.into_iter().filter_map(item).collect()))
            }
        }
    }
}

/// Outcome of matching a declared value against loaded rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    /// Matched rows, in declaration order.
    pub rows: Vec<T>,
    /// Declared identities with no loaded row.
    pub unmatched: Vec<Identity>,
}

/// Resolves `value` to rows taken from `rows`.
///
/// The row returned for a match is the loaded one, not the declared one, so
/// a declared `Row` picks up fresher fields. A declared `Row` with no loaded
/// match resolves to itself. Repeated identities resolve once; earlier
/// entries in `rows` win over later ones with the same identity.
pub fn resolve_value<T: Clone>(
    value: &SelectionValue<T>,
    rows: &[T],
    mapper: &dyn ValueMapper<T>,
) -> Resolution<T> {
    let mut index: HashMap<Identity, &T> = HashMap::with_capacity(rows.len());
    for row in rows {
        index.entry(mapper.get_id(row)).or_insert(row);
    }

    let mut seen = HashSet::new();
    let mut resolution = Resolution {
        rows: Vec::new(),
        unmatched: Vec::new(),
    };
    for item in value.items() {
        let id = item.identity(mapper);
        if !seen.insert(id.clone()) {
            continue;
        }
        match (index.get(&id), item) {
            (Some(row), _) => resolution.rows.push((*row).clone()),
            (None, ValueItem::Row(row)) => resolution.rows.push(row.clone()),
            (None, _) => resolution.unmatched.push(id),
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mapper::FnMapper;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: &'static str,
    }

    fn mapper() -> FnMapper<Row> {
        FnMapper::new(|r: &Row| Identity::from(r.id), |r: &Row| r.name.to_string())
    }

    fn data() -> Vec<Row> {
        vec![
            Row { id: 1, name: "one" },
            Row { id: 2, name: "two" },
            Row { id: 3, name: "three" },
        ]
    }

    #[test]
    fn test_resolves_mixed_shapes_in_declaration_order() {
        let value = SelectionValue::Many(vec![
            ValueItem::IdText(IdText::new(3, "stale label")),
            ValueItem::Id(Identity::from(1)),
            ValueItem::Row(Row { id: 2, name: "old" }),
        ]);
        let resolution = resolve_value(&value, &data(), &mapper());

        let names: Vec<&str> = resolution.rows.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["three", "one", "two"]);
        assert!(resolution.unmatched.is_empty());
    }

    #[test]
    fn test_unmatched_ids_are_reported() {
        let value = SelectionValue::ids([2, 99, 2]);
        let resolution = resolve_value(&value, &data(), &mapper());
        assert_eq!(resolution.rows, vec![Row { id: 2, name: "two" }]);
        assert_eq!(resolution.unmatched, vec![Identity::from(99)]);
    }

    #[test]
    fn test_declared_row_without_match_resolves_to_itself() {
        let value = SelectionValue::Many(vec![
            ValueItem::Row(Row { id: 7, name: "seven" }),
            ValueItem::Id(Identity::from(8)),
        ]);
        let resolution = resolve_value(&value, &data(), &mapper());
        assert_eq!(resolution.rows, vec![Row { id: 7, name: "seven" }]);
        assert_eq!(resolution.unmatched, vec![Identity::from(8)]);
    }

    #[test]
    fn test_earlier_candidates_win() {
        let mut candidates = data();
        candidates.push(Row { id: 1, name: "shadowed" });
        let resolution = resolve_value(&SelectionValue::ids([1]), &candidates, &mapper());
        assert_eq!(resolution.rows[0].name, "one");
    }

    #[test]
    fn test_from_rows() {
        assert_eq!(SelectionValue::<Row>::from_rows(vec![], SelectMode::Single), None);
        assert_eq!(
            SelectionValue::<Row>::from_rows(vec![], SelectMode::Multiple),
            Some(SelectionValue::Many(vec![]))
        );
        let one = SelectionValue::from_rows(data(), SelectMode::Single);
        assert_eq!(one, Some(SelectionValue::One(ValueItem::Row(data()[0].clone()))));
    }

    #[test]
    fn test_from_return_custom_uses_id_property() {
        let value: ReturnValue<Row> = ReturnValue::Multiple(vec![
            Mapped::Custom(json!({"id": 4, "label": "x"})),
            Mapped::Custom(json!({"label": "no id"})),
            Mapped::IdText(IdText::new("k", "K")),
        ]);
        let declared = SelectionValue::from_return(value).unwrap();
        assert_eq!(
            declared.items(),
            &[
                ValueItem::Id(Identity::from(4)),
                ValueItem::IdText(IdText::new("k", "K")),
            ]
        );
        assert_eq!(SelectionValue::<Row>::from_return(ReturnValue::Single(None)), None);
    }
}
