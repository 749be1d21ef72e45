//! Where rows come from.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::filter::{filter_rows, sort_rows};
use crate::error::FetchError;
use crate::mapper::LookupRow;
use crate::query::QueryState;

/// One page of server results.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPage<T> {
    pub rows: Vec<T>,
    /// Number of rows matching the query across all pages.
    pub total: usize,
}

impl<T> DataPage<T> {
    pub fn new(rows: Vec<T>, total: usize) -> Self {
        Self { rows, total }
    }
}

/// Asynchronous row provider.
///
/// Receives the full query (page, page size, search, sort) and answers with
/// one page plus the total match count. Implementations are assumed to be
/// idempotent reads: a superseded call is not aborted, its result is
/// discarded on arrival.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    async fn fetch(&self, query: QueryState) -> Result<DataPage<T>, FetchError>;
}

type FetchFuture<T> = BoxFuture<'static, Result<DataPage<T>, FetchError>>;
type FetchFn<T> = dyn Fn(QueryState) -> FetchFuture<T> + Send + Sync;

/// A [`DataSource`] backed by a closure.
///
/// # Example
///
/// ```ignore
/// let source = FnDataSource::new(move |query: QueryState| {
///     let client = client.clone();
///     async move { client.search_users(&query).await.map_err(FetchError::from) }.boxed()
/// });
/// ```
pub struct FnDataSource<T> {
    fetch: Arc<FetchFn<T>>,
}

impl<T> FnDataSource<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(QueryState) -> FetchFuture<T> + Send + Sync + 'static,
    {
        Self { fetch: Arc::new(f) }
    }
}

impl<T> Clone for FnDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<T> fmt::Debug for FnDataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDataSource(..)")
    }
}

#[async_trait]
impl<T: Send + 'static> DataSource<T> for FnDataSource<T> {
    async fn fetch(&self, query: QueryState) -> Result<DataPage<T>, FetchError> {
        (self.fetch)(query).await
    }
}

/// Server-style source over an in-memory dataset.
///
/// Searches the declared keys, sorts by the requested column and returns the
/// requested page, like a backend would. Optional latency makes it usable
/// for exercising loading states.
#[derive(Debug, Clone)]
pub struct InMemorySource<T> {
    rows: Arc<Vec<T>>,
    search_keys: Vec<String>,
    latency: Option<Duration>,
}

impl<T: LookupRow> InMemorySource<T> {
    pub fn new(rows: Vec<T>, search_keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            rows: Arc::new(rows),
            search_keys: search_keys.into_iter().map(Into::into).collect(),
            latency: None,
        }
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Answers `query` without any latency.
    pub fn query(&self, query: &QueryState) -> DataPage<T> {
        let mut matched = filter_rows(&self.rows, &self.search_keys, query);
        if let (Some(key), Some(dir)) = (query.sort_by.as_deref(), query.sort_dir) {
            sort_rows(&mut matched, key, dir);
        }
        let total = matched.len();
        let rows = matched
            .into_iter()
            .skip(query.offset())
            .take(query.page_size)
            .collect();
        DataPage { rows, total }
    }
}

#[async_trait]
impl<T: LookupRow> DataSource<T> for InMemorySource<T> {
    async fn fetch(&self, query: QueryState) -> Result<DataPage<T>, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.query(&query))
    }
}

/// Rows supplied up front, or an asynchronous source. Exactly one.
pub enum RowSource<T> {
    Rows(Vec<T>),
    Remote(Arc<dyn DataSource<T>>),
}

impl<T> RowSource<T> {
    pub fn remote(source: impl DataSource<T> + 'static) -> Self {
        Self::Remote(Arc::new(source))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl<T> Clone for RowSource<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Rows(rows) => Self::Rows(rows.clone()),
            Self::Remote(source) => Self::Remote(Arc::clone(source)),
        }
    }
}

impl<T> fmt::Debug for RowSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(rows) => f.debug_tuple("Rows").field(&rows.len()).finish(),
            Self::Remote(_) => f.write_str("Remote(..)"),
        }
    }
}
