//! Orchestration of selection, query, modal state and data resolution.
//!
//! [`SelectionController`] is the only stateful object a host talks to. It
//! receives user events (open, toggle, search, sort, page, confirm, cancel)
//! and scroll observations, updates the stores, emits callbacks, and hands
//! out props snapshots for the render slots.
//!
//! Every method runs to completion. The only asynchronous work is a remote
//! fetch, which is spawned onto the current tokio runtime and commits into
//! the shared [`DataResolver`]; call [`SelectionController::sync`] after it
//! lands (or `await` [`SelectionController::refresh`] instead) to fold the
//! new rows back into the selection.

use std::fmt;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::config::LookupConfig;
use crate::controllable::Controllable;
use crate::data::{DataResolver, FetchOutcome};
use crate::error::ConfigError;
use crate::grid::{self, HeaderCheckState};
use crate::mapper::LookupRow;
use crate::pagination;
use crate::query::{QueryPatch, QueryState, QueryStore};
use crate::return_value::{ReturnValue, map_return_value};
use crate::selection::{SelectMode, SelectionState, SelectionStore};
use crate::slots::{
    FooterProps, GridProps, GridRow, HeaderCell, HeaderProps, MAX_TRIGGER_TAGS, ModalProps,
    PaginationProps, SearchProps, TriggerProps,
};
use crate::value::{SelectionValue, resolve_value};
use crate::window::{Viewport, VirtualWindow};

type ValueFn<T> = Box<dyn Fn(&ReturnValue<T>) + Send + Sync>;
type RowsFn<T> = Box<dyn Fn(&[T]) + Send + Sync>;
type QueryFn = Box<dyn Fn(&QueryState) + Send + Sync>;
type OpenFn = Box<dyn Fn(bool) + Send + Sync>;
type UnitFn = Box<dyn Fn() + Send + Sync>;

/// Host callbacks. All optional.
pub struct Callbacks<T> {
    on_change: Option<ValueFn<T>>,
    on_confirm: Option<ValueFn<T>>,
    on_cancel: Option<UnitFn>,
    on_selection_change: Option<RowsFn<T>>,
    on_query_change: Option<QueryFn>,
    on_open_change: Option<OpenFn>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            on_change: None,
            on_confirm: None,
            on_cancel: None,
            on_selection_change: None,
            on_query_change: None,
            on_open_change: None,
        }
    }
}

impl<T> Callbacks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapped value, on confirm. Fires before `on_confirm`.
    pub fn on_change(mut self, f: impl Fn(&ReturnValue<T>) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn on_confirm(mut self, f: impl Fn(&ReturnValue<T>) + Send + Sync + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    /// Raw selected rows, in selection order, after every selection change.
    pub fn on_selection_change(mut self, f: impl Fn(&[T]) + Send + Sync + 'static) -> Self {
        self.on_selection_change = Some(Box::new(f));
        self
    }

    pub fn on_query_change(mut self, f: impl Fn(&QueryState) + Send + Sync + 'static) -> Self {
        self.on_query_change = Some(Box::new(f));
        self
    }

    /// Requested modal state. Fires for controlled and uncontrolled modals.
    pub fn on_open_change(mut self, f: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_open_change = Some(Box::new(f));
        self
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_change", &self.on_change.is_some())
            .field("on_confirm", &self.on_confirm.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("on_selection_change", &self.on_selection_change.is_some())
            .field("on_query_change", &self.on_query_change.is_some())
            .field("on_open_change", &self.on_open_change.is_some())
            .finish()
    }
}

/// Headless lookup controller.
pub struct SelectionController<T: LookupRow> {
    config: LookupConfig<T>,
    callbacks: Callbacks<T>,
    selection: SelectionStore<T>,
    query: QueryStore,
    modal: Controllable<bool>,
    value: Controllable<Option<SelectionValue<T>>>,
    resolver: DataResolver<T>,
    viewport: Viewport,
    /// Set once the user changes the selection; an uncontrolled default
    /// value stops re-seeding it from then on.
    touched: bool,
}

impl<T: LookupRow> SelectionController<T> {
    /// Builds a controller, resolving any declared value against the rows
    /// available now.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] reported by [`LookupConfig::validate`].
    pub fn new(config: LookupConfig<T>, callbacks: Callbacks<T>) -> Result<Self, ConfigError> {
        config.validate()?;

        let selection = SelectionStore::new(config.mode, config.mapper.clone());
        let query = QueryStore::new(config.effective_page_size());
        let resolver = DataResolver::new(config.source.clone(), config.search_keys());

        let mut modal = Controllable::new(config.default_open);
        modal.set_controlled(config.open);

        let mut value = Controllable::new(config.default_value.clone());
        if let Some(controlled) = config.value.clone() {
            value.set_controlled(Some(controlled));
        }

        let viewport = Viewport::new(0.0, config.virtualization.container_height);

        let mut controller = Self {
            config,
            callbacks,
            selection,
            query,
            modal,
            value,
            resolver,
            viewport,
            touched: false,
        };
        controller.reseed();
        if controller.modal_open() {
            controller.spawn_refresh();
        }
        Ok(controller)
    }

    pub fn config(&self) -> &LookupConfig<T> {
        &self.config
    }

    pub fn mode(&self) -> SelectMode {
        self.config.mode
    }

    // Modal

    pub fn modal_open(&self) -> bool {
        *self.modal.get()
    }

    pub fn open(&mut self) {
        self.request_open(true);
    }

    pub fn close(&mut self) {
        self.request_open(false);
    }

    /// Trigger click.
    pub fn toggle_open(&mut self) {
        self.request_open(!self.modal_open());
    }

    fn request_open(&mut self, open: bool) {
        let was_open = self.modal_open();
        let changed = self.modal.request(open);
        debug!(
            "Modal {} requested (controlled: {}, changed: {changed})",
            if open { "open" } else { "close" },
            self.modal.is_controlled()
        );
        if let Some(f) = &self.callbacks.on_open_change {
            f(open);
        }
        if !was_open && self.modal_open() {
            self.on_opened();
        }
    }

    /// Updates (`Some`) or releases (`None`) the host-controlled modal state.
    pub fn set_open_prop(&mut self, open: Option<bool>) {
        let was_open = self.modal_open();
        self.modal.set_controlled(open);
        if !was_open && self.modal_open() {
            self.on_opened();
        }
    }

    fn on_opened(&mut self) {
        if self.resolver.is_remote() {
            self.spawn_refresh();
        } else {
            self.resolver.apply_local(self.query.state());
        }
    }

    // Selection

    pub fn selection(&self) -> &SelectionState<T> {
        self.selection.state()
    }

    /// Selected rows in selection order.
    pub fn selected_rows(&self) -> Vec<T> {
        self.selection.selected_rows()
    }

    pub fn is_row_selected(&self, row: &T) -> bool {
        self.selection.is_row_selected(row)
    }

    pub fn is_row_selectable(&self, row: &T) -> bool {
        grid::is_selectable(row, self.config.mapper.as_ref(), self.config.selectable_row.as_ref())
    }

    /// Toggles `row`. Returns `false` (and changes nothing) when the row is
    /// not selectable.
    pub fn toggle_row(&mut self, row: &T) -> bool {
        if !self.is_row_selectable(row) {
            debug!("Ignoring toggle of unselectable row {}", self.config.mapper.get_id(row));
            return false;
        }
        self.selection.toggle_row(row);
        self.touched = true;
        self.notify_selection();
        true
    }

    pub fn clear_selections(&mut self) {
        self.selection.clear_selection();
        self.touched = true;
        self.notify_selection();
    }

    /// Selects every selectable row of the current page that is not yet
    /// selected. Multiple mode only; returns how many rows were added.
    pub fn select_all_visible(&mut self) -> usize {
        if self.config.mode != SelectMode::Multiple {
            return 0;
        }
        let mut added = 0;
        for row in self.resolver.rows() {
            if self.is_row_selectable(&row) && !self.selection.is_row_selected(&row) {
                self.selection.toggle_row(&row);
                added += 1;
            }
        }
        if added > 0 {
            self.touched = true;
            self.notify_selection();
        }
        added
    }

    /// Header checkbox: checking selects the page, unchecking clears all.
    pub fn set_header_checked(&mut self, checked: bool) {
        if checked {
            self.select_all_visible();
        } else {
            self.clear_selections();
        }
    }

    pub fn header_check_state(&self) -> HeaderCheckState {
        let (selectable, selected) = self
            .resolver
            .rows()
            .iter()
            .filter(|row| self.is_row_selectable(row))
            .fold((0, 0), |(selectable, selected), row| {
                (selectable + 1, selected + usize::from(self.selection.is_row_selected(row)))
            });
        HeaderCheckState::from_counts(selected, selectable)
    }

    fn notify_selection(&self) {
        if let Some(f) = &self.callbacks.on_selection_change {
            f(&self.selection.selected_rows());
        }
    }

    /// Maps the selection to the configured shape, emits `on_change` then
    /// `on_confirm`, and closes the modal. The selection is kept.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingReturnMap`] for a custom shape without a map.
    /// Nothing is emitted and the modal stays open.
    pub fn confirm_selection(&mut self) -> Result<ReturnValue<T>, ConfigError> {
        let rows = self.selection.selected_rows();
        let value = map_return_value(&rows, &self.config.return_config())?;
        debug!("Confirming {} selected row(s)", value.len());

        if let Some(f) = &self.callbacks.on_change {
            f(&value);
        }
        if let Some(f) = &self.callbacks.on_confirm {
            f(&value);
        }
        self.value
            .set_fallback(SelectionValue::from_rows(rows, self.config.mode));
        self.close();
        Ok(value)
    }

    /// Clears the selection, emits `on_cancel` and closes the modal.
    ///
    /// `on_selection_change` is not emitted.
    pub fn cancel_selection(&mut self) {
        debug!("Cancelling selection of {} row(s)", self.selection.state().len());
        self.selection.clear_selection();
        self.touched = true;
        if let Some(f) = &self.callbacks.on_cancel {
            f();
        }
        self.close();
    }

    // Declared value

    /// Current declared value: the host's if controlled, else the default
    /// (or the last confirmed value).
    pub fn value(&self) -> Option<&SelectionValue<T>> {
        self.value.get().as_ref()
    }

    /// Puts the selection under host control and re-resolves it.
    pub fn set_value(&mut self, value: Option<SelectionValue<T>>) {
        self.value.set_controlled(Some(value));
        self.reseed();
    }

    /// Releases host control of the selection.
    pub fn release_value(&mut self) {
        self.value.set_controlled(None);
    }

    /// Replaces the uncontrolled default and re-seeds from it.
    pub fn set_default_value(&mut self, value: Option<SelectionValue<T>>) {
        self.value.set_fallback(value);
        self.touched = false;
        self.reseed();
    }

    /// Replaces the selection with the declared value resolved against the
    /// available rows.
    ///
    /// Ids with no available row keep the row already selected for them;
    /// ids with neither are dropped with a warning.
    fn reseed(&mut self) {
        if !self.value.is_controlled() && self.touched {
            return;
        }
        let Some(declared) = self.value.get().clone() else {
            if self.value.is_controlled() && !self.selection.state().is_empty() {
                self.selection.clear_selection();
                self.notify_selection();
            }
            return;
        };

        let mut candidates = self.resolver.available_rows();
        candidates.extend(self.selection.selected_rows());
        let resolution = resolve_value(&declared, &candidates, self.config.mapper.as_ref());
        for id in &resolution.unmatched {
            warn!("Declared value references unknown row id {id}; dropping it");
        }
        debug!("Re-seeding selection with {} row(s)", resolution.rows.len());
        self.selection.replace(resolution.rows);
        self.notify_selection();
    }

    // Query

    pub fn current_query(&self) -> &QueryState {
        self.query.state()
    }

    /// Applies `patch`, emits `on_query_change` and reloads rows.
    ///
    /// Local rows are re-filtered immediately. A remote source is fetched
    /// only while the modal is open; the next open fetches otherwise.
    pub fn update_query(&mut self, patch: QueryPatch) -> QueryState {
        let state = self.query.apply(patch).clone();
        debug!("Query changed: {state:?}");
        if let Some(f) = &self.callbacks.on_query_change {
            f(&state);
        }
        if self.resolver.is_remote() {
            if self.modal_open() {
                self.spawn_refresh();
            }
        } else {
            self.resolver.apply_local(&state);
        }
        state
    }

    /// Header click on `key`. Returns `None` for a declared, unsortable
    /// column.
    pub fn sort_by_column(&mut self, key: &str) -> Option<QueryState> {
        if self.config.column(key).is_some_and(|c| !c.sortable) {
            return None;
        }
        let state = self.query.state();
        let dir = grid::next_sort(state.sort_by.as_deref(), state.sort_dir, key);
        Some(self.update_query(QueryPatch::new().sort(key, dir)))
    }

    // Data

    /// Replaces host-supplied rows and re-resolves the declared value.
    ///
    /// Ignored for remote sources.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        if self.resolver.is_remote() {
            warn!("set_rows called on a lookup with a remote source; ignoring");
            return;
        }
        self.resolver.set_local_rows(rows, self.query.state());
        self.reseed();
    }

    pub fn resolver(&self) -> &DataResolver<T> {
        &self.resolver
    }

    /// Rows of the current page (remote) or the filtered rows (local).
    pub fn page_rows(&self) -> Vec<T> {
        self.resolver.rows()
    }

    pub fn loading(&self) -> bool {
        self.resolver.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.resolver.error()
    }

    pub fn total(&self) -> usize {
        self.resolver.total()
    }

    /// Fetches (remote) or re-filters (local) for the current query, then
    /// folds the result into the selection.
    pub async fn refresh(&mut self) -> FetchOutcome {
        let query = self.query.state().clone();
        let outcome = self.resolver.fetch(&query).await;
        self.sync();
        outcome
    }

    /// Spawns a fetch for the current query onto the current tokio runtime.
    ///
    /// Returns `None` for local sources, and when no runtime is running (in
    /// which case the host should `await` [`refresh`](Self::refresh)).
    pub fn spawn_refresh(&self) -> Option<JoinHandle<FetchOutcome>> {
        if !self.resolver.is_remote() {
            return None;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available; remote refresh skipped");
            return None;
        };
        let ticket = self.resolver.begin_fetch(self.query.state())?;
        let resolver = self.resolver.clone();
        Some(handle.spawn(async move { resolver.run(ticket).await }))
    }

    /// Folds landed fetch results into the selection.
    ///
    /// Returns `true` when the rows or fetch status changed since the last
    /// call.
    pub fn sync(&mut self) -> bool {
        if !self.resolver.is_dirty() {
            return false;
        }
        self.resolver.clear_dirty();
        if self.resolver.is_remote() {
            self.reseed();
        }
        true
    }

    // Viewport

    /// Records the latest scroll offset and container height.
    pub fn observe_viewport(&mut self, scroll_top: f64, container_height: f64) {
        self.viewport = Viewport::new(scroll_top, container_height);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_virtualized(&self) -> bool {
        self.config.virtualization.is_active(self.resolver.row_count())
    }

    /// Rows to materialise for the current viewport.
    pub fn visible_window(&self) -> VirtualWindow {
        self.config
            .virtualization
            .window(self.resolver.row_count(), self.viewport)
    }

    // Slot props

    pub fn trigger_props(&self) -> TriggerProps {
        let mapper = self.config.mapper.as_ref();
        let texts: Vec<String> = self
            .selection
            .state()
            .rows()
            .map(|row| mapper.get_text(row))
            .collect();
        let selected_count = texts.len();
        let (text, tags, more) = match self.config.mode {
            SelectMode::Single => (texts.into_iter().next(), Vec::new(), 0),
            SelectMode::Multiple => {
                let more = selected_count.saturating_sub(MAX_TRIGGER_TAGS);
                let tags = texts.into_iter().take(MAX_TRIGGER_TAGS).collect();
                (None, tags, more)
            }
        };
        TriggerProps {
            open: self.modal_open(),
            mode: self.config.mode,
            text,
            tags,
            more,
            selected_count,
        }
    }

    pub fn modal_props(&self) -> ModalProps {
        ModalProps {
            open: self.modal_open(),
            loading: self.loading(),
            error: self.error(),
        }
    }

    pub fn search_props(&self) -> SearchProps {
        SearchProps {
            value: self.query.state().search.clone().unwrap_or_default(),
        }
    }

    pub fn header_props(&self) -> HeaderProps {
        let state = self.query.state();
        let cells = self
            .config
            .columns
            .iter()
            .map(|column| HeaderCell {
                key: column.key.clone(),
                title: column.title.clone(),
                sortable: column.sortable,
                indicator: if column.sortable {
                    grid::sort_indicator(state.sort_by.as_deref(), state.sort_dir, &column.key)
                } else {
                    ""
                },
                width: column.width,
            })
            .collect();
        let check = (self.config.mode == SelectMode::Multiple).then(|| self.header_check_state());
        HeaderProps { cells, check }
    }

    pub fn grid_props(&self) -> GridProps<T> {
        let window = self.visible_window();
        let mapper = self.config.mapper.as_ref();
        let rows = self
            .resolver
            .rows_in(window.range())
            .into_iter()
            .zip(window.items())
            .map(|(row, item)| GridRow {
                index: item.index,
                top: item.top,
                id: mapper.get_id(&row),
                cells: self
                    .config
                    .columns
                    .iter()
                    .map(|c| row.field(&c.key).unwrap_or_default())
                    .collect(),
                selected: self.selection.is_row_selected(&row),
                selectable: self.is_row_selectable(&row),
                row,
            })
            .collect();
        GridProps {
            rows,
            row_height: self.config.virtualization.row_height,
            total_height: window.total_height(),
            virtualized: self.is_virtualized(),
            loading: self.loading(),
            error: self.error(),
        }
    }

    pub fn footer_props(&self) -> FooterProps {
        let selected_count = self.selection.state().len();
        FooterProps {
            selected_count,
            can_confirm: selected_count > 0,
        }
    }

    /// Pagination props; `None` for local rows or a single page.
    pub fn pagination_props(&self) -> Option<PaginationProps> {
        if !self.resolver.is_remote() {
            return None;
        }
        let state = self.query.state();
        let total = self.total();
        let total_pages = pagination::total_pages(total, state.page_size);
        let items = pagination::visible_pages(state.page, total_pages);
        if items.is_empty() {
            return None;
        }
        Some(PaginationProps {
            page: state.page,
            page_size: state.page_size,
            total,
            total_pages,
            items,
            record_range: pagination::record_range(state.page, state.page_size, total),
            has_previous: pagination::has_previous(state.page),
            has_next: pagination::has_next(state.page, total_pages),
        })
    }
}

impl<T: LookupRow> fmt::Debug for SelectionController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionController")
            .field("mode", &self.config.mode)
            .field("open", &self.modal_open())
            .field("selected", &self.selection.state().len())
            .field("query", self.query.state())
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
