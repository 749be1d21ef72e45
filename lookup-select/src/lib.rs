//! Headless lookup/select core.
//!
//! A lookup select is a trigger that opens a modal with a searchable,
//! sortable, paginated (optionally virtualized) grid. The user picks one or
//! many rows and the host receives them in a shape it chose up front.
//!
//! This crate owns the state and the algorithms; it never draws anything.
//! A presentation layer feeds it user events and scroll observations and
//! reads back plain props snapshots (see [`slots`]).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lookup_select::prelude::*;
//!
//! let mapper = FnMapper::new(|u: &User| Identity::from(u.id), |u: &User| u.name.clone());
//! let config = LookupConfig::new(Arc::new(mapper), RowSource::Rows(users))
//!     .with_mode(SelectMode::Multiple)
//!     .with_columns(vec![Column::new("name", "Name").sortable()]);
//!
//! let mut lookup = SelectionController::new(config, Callbacks::new())?;
//! lookup.open();
//! lookup.update_query(QueryPatch::new().search("ali"));
//! let first = lookup.page_rows()[0].clone();
//! lookup.toggle_row(&first);
//! let value = lookup.confirm_selection()?;
//! ```

pub mod config;
pub mod controllable;
pub mod controller;
pub mod data;
pub mod error;
pub mod grid;
pub mod mapper;
pub mod pagination;
pub mod query;
pub mod return_value;
pub mod selection;
pub mod slots;
pub mod value;
pub mod window;

pub use config::LookupConfig;
pub use controller::{Callbacks, SelectionController};
pub use error::{ConfigError, FetchError, LookupError};

pub mod prelude {
    pub use crate::config::LookupConfig;
    pub use crate::controllable::Controllable;
    pub use crate::controller::{Callbacks, SelectionController};
    pub use crate::data::{
        DataPage, DataResolver, DataSource, FetchOutcome, FnDataSource, InMemorySource, RowSource,
    };
    pub use crate::error::{ConfigError, FetchError, LookupError};
    pub use crate::grid::{Column, HeaderCheckState, SelectableRow};
    pub use crate::mapper::{FnMapper, Identity, LookupRow, ValueMapper};
    pub use crate::pagination::PageItem;
    pub use crate::query::{QueryPatch, QueryState, QueryStore, SortDir};
    pub use crate::return_value::{IdText, Mapped, ReturnMap, ReturnShape, ReturnValue};
    pub use crate::selection::{SelectMode, SelectionState, SelectionStore};
    pub use crate::slots::{Slots, TextSlots};
    pub use crate::value::{SelectionValue, ValueItem};
    pub use crate::window::{Viewport, VirtualItem, VirtualWindow, VirtualizationConfig};
}
