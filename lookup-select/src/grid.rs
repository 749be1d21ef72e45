//! Column declarations and grid interaction rules.

use std::fmt;
use std::sync::Arc;

use crate::mapper::ValueMapper;
use crate::query::SortDir;

/// A grid column.
///
/// The core reads `key` (search and sort) and `sortable`. `title` and
/// `width` are carried through to the presentation layer untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub title: String,
    pub sortable: bool,
    pub width: Option<u16>,
}

impl Column {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            sortable: false,
            width: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }
}

/// Direction to apply when the header of `key` is clicked.
///
/// Clicking the column already sorted ascending flips it to descending;
/// every other click sorts ascending.
pub fn next_sort(sort_by: Option<&str>, sort_dir: Option<SortDir>, key: &str) -> SortDir {
    match (sort_by, sort_dir) {
        (Some(current), Some(SortDir::Asc)) if current == key => SortDir::Desc,
        _ => SortDir::Asc,
    }
}

/// Header glyph for `key`: `↕` when unsorted, `↑` / `↓` otherwise.
pub fn sort_indicator(sort_by: Option<&str>, sort_dir: Option<SortDir>, key: &str) -> &'static str {
    match (sort_by, sort_dir) {
        (Some(current), Some(SortDir::Asc)) if current == key => "↑",
        (Some(current), Some(SortDir::Desc)) if current == key => "↓",
        _ => "↕",
    }
}

/// State of the select-all checkbox in multiple mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderCheckState {
    #[default]
    Unchecked,
    Indeterminate,
    Checked,
}

impl HeaderCheckState {
    /// `selected` of the `selectable` rows on the current page are selected.
    pub fn from_counts(selected: usize, selectable: usize) -> Self {
        if selected == 0 || selectable == 0 {
            Self::Unchecked
        } else if selected >= selectable {
            Self::Checked
        } else {
            Self::Indeterminate
        }
    }

    pub fn is_checked(self) -> bool {
        self == Self::Checked
    }
}

/// Host predicate restricting which rows may be selected.
pub struct SelectableRow<T>(Arc<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> SelectableRow<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn allows(&self, row: &T) -> bool {
        (self.0)(row)
    }
}

impl<T> Clone for SelectableRow<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for SelectableRow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SelectableRow(..)")
    }
}

/// Whether `row` may be toggled.
///
/// Disabled rows and rows rejected by the host predicate are shown but
/// never selectable.
pub fn is_selectable<T>(
    row: &T,
    mapper: &dyn ValueMapper<T>,
    predicate: Option<&SelectableRow<T>>,
) -> bool {
    !mapper.is_disabled(row) && predicate.is_none_or(|p| p.allows(row))
}
