//! Page arithmetic for the pagination slot.

use serde::Serialize;

/// Pages shown on each side of the current one.
const PAGE_WINDOW: usize = 2;

/// Entry in the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "page")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Number of pages needed for `total` rows.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// 1-based `(first, last)` record numbers shown on `page`, or `None` when
/// there is nothing to show.
pub fn record_range(page: usize, page_size: usize, total: usize) -> Option<(usize, usize)> {
    if total == 0 || page_size == 0 {
        return None;
    }
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    if offset >= total {
        return None;
    }
    Some((offset + 1, offset.saturating_add(page_size).min(total)))
}

pub fn has_previous(page: usize) -> bool {
    page > 1
}

pub fn has_next(page: usize, total_pages: usize) -> bool {
    page < total_pages
}

/// Page selector entries for `current` out of `total_pages`.
///
/// Always includes the first and last page plus up to two pages on either
/// side of `current`; skipped runs are collapsed into one ellipsis. Empty
/// when there is at most one page, in which case pagination is hidden.
///
/// ```
/// use lookup_select::pagination::{visible_pages, PageItem::*};
///
/// assert_eq!(
///     visible_pages(10, 20),
///     vec![Page(1), Ellipsis, Page(8), Page(9), Page(10), Page(11), Page(12), Ellipsis, Page(20)]
/// );
/// ```
pub fn visible_pages(current: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);

    let lo = current.saturating_sub(PAGE_WINDOW).max(2);
    let hi = current.saturating_add(PAGE_WINDOW).min(total_pages - 1);

    let mut items = vec![PageItem::Page(1)];
    if current.saturating_sub(PAGE_WINDOW) > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((lo..=hi).map(PageItem::Page));
    if current.saturating_add(PAGE_WINDOW) < total_pages - 1 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total_pages));
    items
}

#[cfg(test)]
mod tests {
    use super::PageItem::*;
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn test_record_range() {
        assert_eq!(record_range(1, 20, 0), None);
        assert_eq!(record_range(1, 20, 45), Some((1, 20)));
        assert_eq!(record_range(3, 20, 45), Some((41, 45)));
        assert_eq!(record_range(4, 20, 45), None);
        assert_eq!(record_range(0, 20, 45), Some((1, 20)));
        assert_eq!(record_range(usize::MAX, 20, 45), None);
        assert_eq!(record_range(2, usize::MAX, 45), None);
    }

    #[test]
    fn test_hidden_for_single_page() {
        assert!(visible_pages(1, 0).is_empty());
        assert!(visible_pages(1, 1).is_empty());
    }

    #[test]
    fn test_small_page_counts_have_no_ellipsis() {
        assert_eq!(visible_pages(1, 2), vec![Page(1), Page(2)]);
        assert_eq!(
            visible_pages(3, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
        );
    }

    #[test]
    fn test_edges() {
        assert_eq!(
            visible_pages(1, 10),
            vec![Page(1), Page(2), Page(3), Ellipsis, Page(10)]
        );
        assert_eq!(
            visible_pages(10, 10),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        assert_eq!(visible_pages(99, 3), vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn test_prev_next() {
        assert!(!has_previous(1));
        assert!(has_previous(2));
        assert!(has_next(1, 2));
        assert!(!has_next(2, 2));
    }

    #[test]
    fn test_page_item_serializes_tagged() {
        assert_eq!(
            serde_json::to_value(Page(3)).unwrap(),
            serde_json::json!({"kind": "page", "page": 3})
        );
        assert_eq!(
            serde_json::to_value(Ellipsis).unwrap(),
            serde_json::json!({"kind": "ellipsis"})
        );
    }
}
