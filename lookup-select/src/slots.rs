//! Render slots.
//!
//! The presentation layer is split into seven independently overridable
//! slots. Each receives a plain props snapshot built by the controller and
//! returns the lines it renders. [`TextSlots`] renders every slot as plain
//! text; a host implements [`Slots`] and overrides only the slots it cares
//! about.

use crate::controller::SelectionController;
use crate::grid::HeaderCheckState;
use crate::mapper::{Identity, LookupRow};
use crate::pagination::PageItem;
use crate::selection::SelectMode;

/// Tags shown on the trigger before collapsing into "+N more".
pub const MAX_TRIGGER_TAGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerProps {
    pub open: bool,
    pub mode: SelectMode,
    /// Label of the selected row in single mode.
    pub text: Option<String>,
    /// Labels of the first selected rows in multiple mode.
    pub tags: Vec<String>,
    /// Selected rows not shown as tags.
    pub more: usize,
    pub selected_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalProps {
    pub open: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub title: String,
    pub sortable: bool,
    /// `↕`, `↑` or `↓`; empty for unsortable columns.
    pub indicator: &'static str,
    pub width: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderProps {
    pub cells: Vec<HeaderCell>,
    /// Select-all checkbox, present in multiple mode only.
    pub check: Option<HeaderCheckState>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<T> {
    /// Position in the loaded rows.
    pub index: usize,
    /// Absolute top offset.
    pub top: f64,
    pub id: Identity,
    pub row: T,
    /// Stringified values, one per declared column.
    pub cells: Vec<String>,
    pub selected: bool,
    pub selectable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridProps<T> {
    pub rows: Vec<GridRow<T>>,
    pub row_height: f64,
    /// Height of the full scrollable content.
    pub total_height: f64,
    pub virtualized: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterProps {
    pub selected_count: usize,
    /// Confirm is disabled while nothing is selected.
    pub can_confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProps {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationProps {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub items: Vec<PageItem>,
    /// 1-based `(first, last)` record numbers on this page.
    pub record_range: Option<(usize, usize)>,
    pub has_previous: bool,
    pub has_next: bool,
}

/// One method per slot. Every method has a plain-text default.
pub trait Slots<T> {
    fn trigger(&self, props: &TriggerProps) -> Vec<String> {
        let body = match (props.mode, props.selected_count) {
            (_, 0) => "Select...".to_string(),
            (SelectMode::Single, _) => props.text.clone().unwrap_or_default(),
            (SelectMode::Multiple, _) => {
                let mut parts: Vec<String> = props.tags.iter().map(|t| format!("[{t}]")).collect();
                if props.more > 0 {
                    parts.push(format!("+{} more", props.more));
                }
                parts.join(" ")
            }
        };
        let arrow = if props.open { "▲" } else { "▼" };
        vec![format!("{body} {arrow}")]
    }

    /// Wraps the already-rendered inner slots.
    fn modal(&self, props: &ModalProps, body: Vec<String>) -> Vec<String> {
        if !props.open {
            return Vec::new();
        }
        let mut lines = vec!["┌ lookup".to_string()];
        lines.extend(body.into_iter().map(|line| format!("│ {line}")));
        lines.push("└".to_string());
        lines
    }

    fn search(&self, props: &SearchProps) -> Vec<String> {
        vec![format!("Search: {}", props.value)]
    }

    fn header(&self, props: &HeaderProps) -> Vec<String> {
        let check = match props.check {
            None => String::new(),
            Some(HeaderCheckState::Unchecked) => "[ ] ".to_string(),
            Some(HeaderCheckState::Indeterminate) => "[-] ".to_string(),
            Some(HeaderCheckState::Checked) => "[x] ".to_string(),
        };
        let cells: Vec<String> = props
            .cells
            .iter()
            .map(|cell| {
                if cell.sortable {
                    format!("{} {}", cell.title, cell.indicator)
                } else {
                    cell.title.clone()
                }
            })
            .collect();
        vec![format!("{check}{}", cells.join(" | "))]
    }

    fn grid(&self, props: &GridProps<T>) -> Vec<String> {
        if props.loading && props.rows.is_empty() {
            return vec!["Loading...".to_string()];
        }
        let mut lines = Vec::new();
        if let Some(error) = &props.error {
            lines.push(format!("Error: {error}"));
        }
        if props.rows.is_empty() {
            lines.push("No records found".to_string());
            return lines;
        }
        for row in &props.rows {
            let mark = match (row.selectable, row.selected) {
                (false, _) => "[/]",
                (true, true) => "[x]",
                (true, false) => "[ ]",
            };
            lines.push(format!("{mark} {}", row.cells.join(" | ")));
        }
        lines
    }

    fn pagination(&self, props: &PaginationProps) -> Vec<String> {
        let info = match props.record_range {
            Some((first, last)) => format!("{first}-{last} / {}", props.total),
            None => "0 records".to_string(),
        };
        let pages: Vec<String> = props
            .items
            .iter()
            .map(|item| match item {
                PageItem::Page(n) if *n == props.page => format!("({n})"),
                PageItem::Page(n) => n.to_string(),
                PageItem::Ellipsis => "...".to_string(),
            })
            .collect();
        let prev = if props.has_previous { "‹" } else { " " };
        let next = if props.has_next { "›" } else { " " };
        vec![format!("{info}  {prev} {} {next}", pages.join(" "))]
    }

    fn footer(&self, props: &FooterProps) -> Vec<String> {
        let count = if props.selected_count > 0 {
            format!("{} selected", props.selected_count)
        } else {
            "No selection".to_string()
        };
        let confirm = if props.can_confirm { "[Confirm]" } else { "(Confirm)" };
        vec![format!("{count}  [Cancel] {confirm}")]
    }
}

/// Every slot at its plain-text default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSlots;

impl<T> Slots<T> for TextSlots {}

/// Renders the whole lookup through `slots`.
///
/// The trigger is always rendered. The modal, when open, wraps search,
/// header, grid, pagination (remote sources with more than one page) and
/// footer, in that order.
pub fn render<T, S>(controller: &SelectionController<T>, slots: &S) -> Vec<String>
where
    T: LookupRow,
    S: Slots<T> + ?Sized,
{
    let mut lines = slots.trigger(&controller.trigger_props());
    let modal = controller.modal_props();
    if !modal.open {
        return lines;
    }

    let mut body = slots.search(&controller.search_props());
    body.extend(slots.header(&controller.header_props()));
    body.extend(slots.grid(&controller.grid_props()));
    if let Some(pagination) = controller.pagination_props() {
        body.extend(slots.pagination(&pagination));
    }
    body.extend(slots.footer(&controller.footer_props()));

    lines.extend(slots.modal(&modal, body));
    lines
}
