//! Row sources and data resolution.

mod filter;
mod resolver;
mod source;

pub use filter::{filter_rows, matches_search, sort_rows};
pub use resolver::{DataResolver, FetchOutcome, FetchTicket};
pub use source::{DataPage, DataSource, FnDataSource, InMemorySource, RowSource};
