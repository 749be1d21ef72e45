//! Fixed-height row windowing.
//!
//! Only the rows intersecting the viewport (plus an overscan margin on each
//! side) are materialised. Scroll offset and container height are sampled
//! from the presentation layer on every scroll/resize and the window is
//! recomputed from scratch; the computation is O(1) in the row count.
//!
//! All rows share one height. Content that does not fit must be clipped by
//! the presentation layer.

use std::ops::Range;

use log::trace;

/// Virtualization settings.
///
/// # Example
///
/// ```
/// use lookup_select::window::VirtualizationConfig;
///
/// let config = VirtualizationConfig::default()
///     .with_enabled(true)
///     .with_row_height(32.0)
///     .with_threshold(200);
/// assert!(config.is_active(500));
/// assert!(!config.is_active(199));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualizationConfig {
    pub enabled: bool,
    /// Height of every row, in the same unit as the scroll offset.
    ///
    /// Default: 40
    pub row_height: f64,
    /// Extra rows materialised above and below the viewport.
    ///
    /// Default: 5
    pub overscan: usize,
    /// Initial viewport height, used until the first observation.
    ///
    /// Default: 400
    pub container_height: f64,
    /// Minimum row count for windowing to kick in.
    ///
    /// Default: 100
    pub threshold: usize,
}

impl Default for VirtualizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            row_height: 40.0,
            overscan: 5,
            container_height: 400.0,
            threshold: 100,
        }
    }
}

impl VirtualizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_container_height(mut self, height: f64) -> Self {
        self.container_height = height;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Whether `item_count` rows are windowed.
    pub fn is_active(&self, item_count: usize) -> bool {
        self.enabled && item_count >= self.threshold
    }

    /// Page size to request from a server when virtualizing.
    ///
    /// Five viewports' worth of rows, but never less than `page_size`.
    pub fn effective_page_size(&self, page_size: usize) -> usize {
        if !(self.row_height > 0.0) || !self.container_height.is_finite() {
            return page_size;
        }
        let per_viewport = (self.container_height.max(0.0) / self.row_height).ceil() as usize;
        page_size.max(per_viewport.saturating_mul(5))
    }

    /// The rows to materialise for `item_count` rows seen through `viewport`.
    ///
    /// Below the threshold (or when disabled) every row is materialised.
    pub fn window(&self, item_count: usize, viewport: Viewport) -> VirtualWindow {
        if self.is_active(item_count) {
            compute_window(
                viewport.scroll_top,
                viewport.container_height,
                self.row_height,
                self.overscan,
                item_count,
            )
        } else {
            VirtualWindow::all(item_count, self.row_height)
        }
    }
}

/// Latest scroll/resize observation from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_top: f64,
    pub container_height: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, container_height: f64) -> Self {
        Self {
            scroll_top,
            container_height,
        }
    }
}

/// A materialised row and where it goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItem {
    pub index: usize,
    /// Absolute top offset: `index * row_height`.
    pub top: f64,
    pub height: f64,
}

/// Contiguous range of rows to materialise.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualWindow {
    range: Range<usize>,
    row_height: f64,
    total_height: f64,
}

impl VirtualWindow {
    /// No rows.
    pub fn empty() -> Self {
        Self {
            range: 0..0,
            row_height: 0.0,
            total_height: 0.0,
        }
    }

    /// Every row, unwindowed.
    pub fn all(item_count: usize, row_height: f64) -> Self {
        let row_height = sanitize(row_height);
        Self {
            range: 0..item_count,
            row_height,
            total_height: item_count as f64 * row_height,
        }
    }

    /// First materialised index (0 for an empty window).
    pub fn start_index(&self) -> usize {
        self.range.start
    }

    /// Last materialised index, inclusive. `None` for an empty window.
    pub fn end_index(&self) -> Option<usize> {
        self.range.end.checked_sub(1).filter(|_| !self.is_empty())
    }

    /// Half-open index range, suitable for slicing.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range.contains(&index)
    }

    /// Height of the full scrollable content: `item_count * row_height`.
    pub fn total_height(&self) -> f64 {
        self.total_height
    }

    pub fn offset_of(&self, index: usize) -> f64 {
        index as f64 * self.row_height
    }

    pub fn items(&self) -> impl Iterator<Item = VirtualItem> + '_ {
        self.range.clone().map(move |index| VirtualItem {
            index,
            top: self.offset_of(index),
            height: self.row_height,
        })
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Computes the window of rows to materialise.
///
/// ```text
/// start = max(0, floor(scroll_top / row_height) - overscan)
/// end   = min(item_count - 1, floor((scroll_top + container_height) / row_height) + overscan)
/// ```
///
/// `scroll_top` is first clamped to `[0, item_count * row_height - container_height]`
/// so an overscrolled or stale offset still yields `start <= end`. An empty
/// window is returned when there are no rows or the row height is not a
/// positive finite number.
///
/// ```
/// use lookup_select::window::compute_window;
///
/// let window = compute_window(2000.0, 400.0, 40.0, 5, 1000);
/// assert_eq!(window.start_index(), 45);
/// assert_eq!(window.end_index(), Some(65));
/// ```
pub fn compute_window(
    scroll_top: f64,
    container_height: f64,
    row_height: f64,
    overscan: usize,
    item_count: usize,
) -> VirtualWindow {
    trace!(
        "compute_window: scroll_top={scroll_top} container_height={container_height} \
         row_height={row_height} overscan={overscan} item_count={item_count}"
    );

    if item_count == 0 || !row_height.is_finite() || row_height <= 0.0 {
        return VirtualWindow::empty();
    }

    let container_height = sanitize(container_height);
    let total_height = item_count as f64 * row_height;
    let max_scroll = (total_height - container_height).max(0.0);
    let scroll_top = sanitize(scroll_top).min(max_scroll);

    let first_visible = (scroll_top / row_height).floor() as usize;
    let last_visible = ((scroll_top + container_height) / row_height).floor() as usize;

    let end = last_visible.saturating_add(overscan).min(item_count - 1);
    let start = first_visible.saturating_sub(overscan).min(end);

    VirtualWindow {
        range: start..end + 1,
        row_height,
        total_height,
    }
}
