//! In-memory search and sort over [`LookupRow`]s.

use std::cmp::Ordering;

use crate::mapper::LookupRow;
use crate::query::{QueryState, SortDir};

/// Whether any of `keys` holds a value containing `term`, ignoring case.
///
/// Substring match, not token match. A blank term matches every row.
pub fn matches_search<T: LookupRow>(row: &T, keys: &[String], term: &str) -> bool {
    if term.trim().is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    keys.iter()
        .filter_map(|key| row.field(key))
        .any(|value| value.to_lowercase().contains(&needle))
}

/// Rows matching the query's search term, in their original order.
pub fn filter_rows<T: LookupRow>(rows: &[T], keys: &[String], query: &QueryState) -> Vec<T> {
    match query.search_term() {
        Some(term) => rows
            .iter()
            .filter(|row| matches_search(*row, keys, term))
            .cloned()
            .collect(),
        None => rows.to_vec(),
    }
}

/// Stable sort by the value under `key`.
///
/// Two numeric values compare as numbers, anything else as strings. Rows
/// without the field sort first when ascending.
pub fn sort_rows<T: LookupRow>(rows: &mut [T], key: &str, dir: SortDir) {
    rows.sort_by(|a, b| {
        let ordering = compare_fields(a.field(key), b.field(key));
        match dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
}

fn compare_fields(a: Option<String>, b: Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.total_cmp(&y),
            _ => a.cmp(&b),
        },
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}
