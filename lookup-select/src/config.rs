//! Lookup configuration

use std::fmt;
use std::sync::Arc;

use crate::data::RowSource;
use crate::error::ConfigError;
use crate::grid::{Column, SelectableRow};
use crate::mapper::ValueMapper;
use crate::query::DEFAULT_PAGE_SIZE;
use crate::return_value::{ReturnConfig, ReturnMap, ReturnShape};
use crate::selection::SelectMode;
use crate::value::SelectionValue;
use crate::window::VirtualizationConfig;

/// Everything a host declares about one lookup.
///
/// # Example
///
/// ```ignore
/// let config = LookupConfig::new(Arc::new(mapper), RowSource::remote(api))
///     .with_mode(SelectMode::Multiple)
///     .with_return_shape(ReturnShape::Row)
///     .with_columns(vec![
///         Column::new("name", "Name").sortable(),
///         Column::new("email", "E-mail"),
///     ])
///     .with_virtualization(VirtualizationConfig::default().with_enabled(true));
/// ```
pub struct LookupConfig<T> {
    pub mapper: Arc<dyn ValueMapper<T>>,
    pub source: RowSource<T>,

    /// Default: single
    pub mode: SelectMode,

    /// Default: id-text
    pub return_shape: ReturnShape,

    /// Required when `return_shape` is custom.
    pub return_map: Option<ReturnMap<T>>,

    /// Rows per page requested from a remote source.
    ///
    /// Default: 20
    pub page_size: usize,

    /// Declared columns. Search and in-memory sort only look at these keys.
    pub columns: Vec<Column>,

    pub virtualization: VirtualizationConfig,

    /// Extra restriction on which rows may be selected.
    pub selectable_row: Option<SelectableRow<T>>,

    /// Host-controlled modal state.
    pub open: Option<bool>,

    /// Initial modal state when uncontrolled.
    pub default_open: bool,

    /// Host-controlled selection. `Some(None)` pins it to "nothing selected".
    pub value: Option<Option<SelectionValue<T>>>,

    /// Initial selection when uncontrolled.
    pub default_value: Option<SelectionValue<T>>,
}

impl<T> LookupConfig<T> {
    pub fn new(mapper: Arc<dyn ValueMapper<T>>, source: RowSource<T>) -> Self {
        Self {
            mapper,
            source,
            mode: SelectMode::default(),
            return_shape: ReturnShape::default(),
            return_map: None,
            page_size: DEFAULT_PAGE_SIZE,
            columns: Vec::new(),
            virtualization: VirtualizationConfig::default(),
            selectable_row: None,
            open: None,
            default_open: false,
            value: None,
            default_value: None,
        }
    }

    pub fn with_mode(mut self, mode: SelectMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_return_shape(mut self, shape: ReturnShape) -> Self {
        self.return_shape = shape;
        self
    }

    /// Sets the custom return map and switches the shape to custom.
    pub fn with_return_map(mut self, map: ReturnMap<T>) -> Self {
        self.return_shape = ReturnShape::Custom;
        self.return_map = Some(map);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_virtualization(mut self, virtualization: VirtualizationConfig) -> Self {
        self.virtualization = virtualization;
        self
    }

    pub fn with_selectable_row(mut self, predicate: SelectableRow<T>) -> Self {
        self.selectable_row = Some(predicate);
        self
    }

    /// Puts the modal state under host control.
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    pub fn with_default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    /// Puts the selection under host control.
    pub fn with_value(mut self, value: Option<SelectionValue<T>>) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_default_value(mut self, value: SelectionValue<T>) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Checks the configuration for contract violations.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingReturnMap`] for a custom shape without a map.
    /// - [`ConfigError::InvalidPageSize`] for a page size of 0.
    /// - [`ConfigError::InvalidRowHeight`] when virtualization is enabled
    ///   with a row height that is not a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.return_shape == ReturnShape::Custom && self.return_map.is_none() {
            return Err(ConfigError::MissingReturnMap);
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        let row_height = self.virtualization.row_height;
        if self.virtualization.enabled && !(row_height.is_finite() && row_height > 0.0) {
            return Err(ConfigError::InvalidRowHeight(row_height));
        }
        Ok(())
    }

    /// Page size actually requested.
    ///
    /// A remote source with virtualization enabled is asked for enough rows
    /// to scroll ahead smoothly.
    pub fn effective_page_size(&self) -> usize {
        if self.source.is_remote() && self.virtualization.enabled {
            self.virtualization.effective_page_size(self.page_size)
        } else {
            self.page_size
        }
    }

    pub fn search_keys(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.key.clone()).collect()
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn return_config(&self) -> ReturnConfig<'_, T> {
        ReturnConfig {
            shape: self.return_shape,
            return_map: self.return_map.as_ref(),
            mapper: self.mapper.as_ref(),
            mode: self.mode,
        }
    }
}

impl<T> fmt::Debug for LookupConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupConfig")
            .field("source", &self.source)
            .field("mode", &self.mode)
            .field("return_shape", &self.return_shape)
            .field("page_size", &self.page_size)
            .field("columns", &self.columns)
            .field("virtualization", &self.virtualization)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}
