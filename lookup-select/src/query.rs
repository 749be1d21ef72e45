//! Pagination, search and sort state.

use serde::{Deserialize, Serialize};

/// Page size used when the host does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Query snapshot handed to data sources and to `on_query_change`.
///
/// Serialises with camelCase keys (`page`, `pageSize`, `search`, `sortBy`,
/// `sortDir`); absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDir>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    /// First page, no search, no sort.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: None,
            sort_by: None,
            sort_dir: None,
        }
    }

    /// Index of the first row on the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Search text, or `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Partial query update, as produced by the presentation layer.
///
/// Fields are applied in a fixed order: search, page, sort, page size. A
/// patch that carries both a search and a page therefore ends up on that
/// page; one that carries a sort or page size ends up on page 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub sort: Option<(String, SortDir)>,
    pub page_size: Option<usize>,
}

impl QueryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn sort(mut self, column: impl Into<String>, dir: SortDir) -> Self {
        self.sort = Some((column.into(), dir));
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.page.is_none()
            && self.sort.is_none()
            && self.page_size.is_none()
    }
}

/// Owns the [`QueryState`].
///
/// Anything that changes what is shown (search, sort, page size) sends the
/// query back to page 1. Sort columns are not validated.
#[derive(Debug, Clone, Default)]
pub struct QueryStore {
    state: QueryState,
}

impl QueryStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: QueryState::new(page_size),
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn update_search(&mut self, text: impl Into<String>) -> &QueryState {
        self.state.search = Some(text.into());
        self.state.page = 1;
        &self.state
    }

    /// Moves to `page`. Page 0 is treated as page 1.
    pub fn update_page(&mut self, page: usize) -> &QueryState {
        self.state.page = page.max(1);
        &self.state
    }

    pub fn update_sort(&mut self, column: impl Into<String>, dir: SortDir) -> &QueryState {
        self.state.sort_by = Some(column.into());
        self.state.sort_dir = Some(dir);
        self.state.page = 1;
        &self.state
    }

    /// Changes the page size. A size of 0 is treated as 1.
    pub fn update_page_size(&mut self, size: usize) -> &QueryState {
        self.state.page_size = size.max(1);
        self.state.page = 1;
        &self.state
    }

    /// Dispatches every field present in `patch` to its update operation.
    pub fn apply(&mut self, patch: QueryPatch) -> &QueryState {
        if let Some(text) = patch.search {
            self.update_search(text);
        }
        if let Some(page) = patch.page {
            self.update_page(page);
        }
        if let Some((column, dir)) = patch.sort {
            self.update_sort(column, dir);
        }
        if let Some(size) = patch.page_size {
            self.update_page_size(size);
        }
        &self.state
    }
}
