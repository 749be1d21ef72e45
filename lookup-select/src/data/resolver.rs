//! Client-side filtering vs. server fetches, and the rows that result.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use log::debug;

use super::filter::filter_rows;
use super::source::{DataPage, DataSource, RowSource};
use crate::error::FetchError;
use crate::mapper::LookupRow;
use crate::query::QueryState;

struct Inner<T> {
    /// Full host-supplied list. Empty for remote sources.
    source_rows: Vec<T>,
    /// Rows currently shown: the filtered list, or the last fetched page.
    rows: Vec<T>,
    total: usize,
    loading: bool,
    error: Option<String>,
    /// Id of the most recently issued fetch. Guarded with the rows so a
    /// staleness check and the commit it allows cannot be split.
    latest: u64,
}

/// Handle for one issued fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub id: u64,
    pub query: QueryState,
}

/// What happened to a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows and total were replaced.
    Committed,
    /// The source failed; the error is exposed and rows are unchanged.
    Failed,
    /// A newer fetch was issued meanwhile; the result was discarded.
    Stale,
}

/// Owns the rows shown in the grid.
///
/// With local rows every query is answered synchronously by filtering. With
/// a remote source each query issues a fetch tagged with a monotonically
/// increasing request id; only the most recently issued fetch may commit,
/// so a slow early response can never overwrite a newer one.
///
/// Cheap to clone; clones share state, which lets a spawned fetch task
/// commit into the same resolver the controller reads from.
pub struct DataResolver<T> {
    inner: Arc<RwLock<Inner<T>>>,
    remote: Option<Arc<dyn DataSource<T>>>,
    search_keys: Arc<[String]>,
    dirty: Arc<AtomicBool>,
}

impl<T: LookupRow> DataResolver<T> {
    pub fn new(source: RowSource<T>, search_keys: Vec<String>) -> Self {
        let (source_rows, remote) = match source {
            RowSource::Rows(rows) => (rows, None),
            RowSource::Remote(source) => (Vec::new(), Some(source)),
        };
        let rows = source_rows.clone();
        let total = rows.len();
        Self {
            inner: Arc::new(RwLock::new(Inner {
                source_rows,
                rows,
                total,
                loading: false,
                error: None,
                latest: 0,
            })),
            remote,
            search_keys: search_keys.into(),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Re-filters the local rows for `query`. No-op for remote sources.
    pub fn apply_local(&self, query: &QueryState) {
        if self.is_remote() {
            return;
        }
        if let Ok(mut guard) = self.inner.write() {
            let filtered = filter_rows(&guard.source_rows, &self.search_keys, query);
            guard.total = filtered.len();
            guard.rows = filtered;
            self.mark_dirty();
        }
    }

    /// Replaces the host-supplied rows and re-filters them.
    ///
    /// Ignored for remote sources, whose rows only ever come from fetches.
    pub fn set_local_rows(&self, rows: Vec<T>, query: &QueryState) {
        if self.is_remote() {
            return;
        }
        if let Ok(mut guard) = self.inner.write() {
            guard.source_rows = rows;
        }
        self.apply_local(query);
    }

    /// Issues a new request id and enters the loading state.
    ///
    /// Returns `None` for local sources. Any earlier ticket becomes stale.
    pub fn begin_fetch(&self, query: &QueryState) -> Option<FetchTicket> {
        self.remote.as_ref()?;
        let mut guard = self.inner.write().ok()?;
        guard.latest += 1;
        guard.loading = true;
        guard.error = None;
        let id = guard.latest;
        drop(guard);
        self.mark_dirty();
        debug!("Fetch #{id} issued: {query:?}");
        Some(FetchTicket {
            id,
            query: query.clone(),
        })
    }

    /// Commits the result of `ticket` if it is still the latest request.
    pub fn complete_fetch(
        &self,
        ticket: &FetchTicket,
        result: Result<DataPage<T>, FetchError>,
    ) -> FetchOutcome {
        let Ok(mut guard) = self.inner.write() else {
            return FetchOutcome::Stale;
        };
        if ticket.id != guard.latest {
            debug!("Fetch #{} discarded as stale (latest is #{})", ticket.id, guard.latest);
            return FetchOutcome::Stale;
        }
        guard.loading = false;
        let outcome = match result {
            Ok(page) => {
                debug!(
                    "Fetch #{} committed: {} rows, total {}",
                    ticket.id,
                    page.rows.len(),
                    page.total
                );
                guard.rows = page.rows;
                guard.total = page.total;
                guard.error = None;
                FetchOutcome::Committed
            }
            Err(err) => {
                debug!("Fetch #{} failed: {err}", ticket.id);
                guard.error = Some(err.to_string());
                FetchOutcome::Failed
            }
        };
        self.mark_dirty();
        outcome
    }

    /// Answers `query`.
    ///
    /// Local sources filter synchronously and always commit. Remote sources
    /// fetch; no lock is held while the source is awaited.
    pub async fn fetch(&self, query: &QueryState) -> FetchOutcome {
        match self.begin_fetch(query) {
            Some(ticket) => self.run(ticket).await,
            None => {
                self.apply_local(query);
                FetchOutcome::Committed
            }
        }
    }

    /// Performs the fetch for an already issued `ticket` and commits it.
    ///
    /// Issuing the ticket up front fixes the request order at the call
    /// site, independent of when the returned future is first polled.
    pub async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        let Some(source) = self.remote.clone() else {
            return FetchOutcome::Stale;
        };
        let result = source.fetch(ticket.query.clone()).await;
        self.complete_fetch(&ticket, result)
    }

    /// Clone of the rows currently shown.
    pub fn rows(&self) -> Vec<T> {
        self.inner
            .read()
            .map(|guard| guard.rows.clone())
            .unwrap_or_default()
    }

    /// Clone of `rows[range]`, clamped to what is loaded.
    pub fn rows_in(&self, range: std::ops::Range<usize>) -> Vec<T> {
        self.inner
            .read()
            .map(|guard| {
                let end = range.end.min(guard.rows.len());
                let start = range.start.min(end);
                guard.rows[start..end].to_vec()
            })
            .unwrap_or_default()
    }

    /// Rows a declared value can be resolved against.
    ///
    /// The full host list locally; the last fetched page remotely.
    pub fn available_rows(&self) -> Vec<T> {
        self.inner
            .read()
            .map(|guard| {
                if self.is_remote() {
                    guard.rows.clone()
                } else {
                    guard.source_rows.clone()
                }
            })
            .unwrap_or_default()
    }

    /// Rows currently shown, counted.
    pub fn row_count(&self) -> usize {
        self.inner.read().map(|guard| guard.rows.len()).unwrap_or(0)
    }

    /// Total matches: the filtered count locally, the server's total remotely.
    pub fn total(&self) -> usize {
        self.inner.read().map(|guard| guard.total).unwrap_or(0)
    }

    pub fn loading(&self) -> bool {
        self.inner.read().map(|guard| guard.loading).unwrap_or(false)
    }

    /// Message of the last failed fetch, cleared by the next fetch.
    pub fn error(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.error.clone())
    }

    /// Id of the most recently issued fetch (0 before the first).
    pub fn latest_request(&self) -> u64 {
        self.inner.read().map(|guard| guard.latest).unwrap_or(0)
    }

    /// Check if the rows or fetch status changed since the last check
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<T> Clone for DataResolver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            remote: self.remote.clone(),
            search_keys: Arc::clone(&self.search_keys),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<T: LookupRow> fmt::Debug for DataResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataResolver")
            .field("remote", &self.remote.is_some())
            .field("latest", &self.latest_request())
            .finish_non_exhaustive()
    }
}
