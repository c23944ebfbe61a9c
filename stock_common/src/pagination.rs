//! Fixed-size paging over an ordered list, plus the page-marker strip shown
//! beneath it.

use serde::Serialize;

/// One page of `items` and the number of pages overall.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// Items on the requested page; empty when the page is out of range.
    pub items: &'a [T],
    /// `ceil(len / page_size)`.
    pub total_pages: usize,
}

/// Number of pages needed for `len` items. A zero `page_size` yields zero pages.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slices `items` into page number `page` (1-based).
///
/// Requesting page 0 or a page past the end returns no items; nothing here
/// panics on caller input.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let total_pages = total_pages(items.len(), page_size);
    if page == 0 || page > total_pages {
        return Page { items: &[], total_pages };
    }
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        total_pages,
    }
}

/// A single entry of the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageMarker {
    /// A clickable page number.
    Page {
        /// 1-based page number.
        number: usize,
        /// Whether this is the page being shown.
        current: bool,
    },
    /// Collapsed run of hidden pages.
    Ellipsis,
}

/// Pages that are always listed in full.
const FULL_STRIP_MAX: usize = 5;

/// Page-number strip for `total_pages` pages with `current` selected.
///
/// Up to five pages are all listed. Beyond that the first and last page and
/// the pages within one of `current` are listed, and a page exactly two away
/// from `current` turns into an ellipsis.
pub fn page_markers(total_pages: usize, current: usize) -> Vec<PageMarker> {
    (1..=total_pages)
        .filter_map(|number| {
            let distance = number.abs_diff(current);
            if total_pages <= FULL_STRIP_MAX || number == 1 || number == total_pages || distance <= 1 {
                Some(PageMarker::Page {
                    number,
                    current: number == current,
                })
            } else if distance == 2 {
                Some(PageMarker::Ellipsis)
            } else {
                None
            }
        })
        .collect()
}

/// Previous/next availability for a pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    /// 1-based page on display.
    pub current_page: usize,
    /// Number of pages; 0 when there is nothing to page.
    pub total_pages: usize,
    /// A page before the current one exists.
    pub has_previous: bool,
    /// A page after the current one exists.
    pub has_next: bool,
}

impl Navigation {
    /// Navigation for `current_page` of `total_pages`.
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        Navigation {
            current_page,
            total_pages,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        }
    }

    /// Whether `page` is a valid destination.
    pub fn accepts(&self, page: usize) -> bool {
        (1..=self.total_pages).contains(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(markers: &[PageMarker]) -> String {
        markers
            .iter()
            .map(|marker| match marker {
                PageMarker::Page { number, .. } => number.to_string(),
                PageMarker::Ellipsis => "…".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[test]
    fn eleven_items_in_pages_of_five() {
        let items: Vec<u32> = (0..11).collect();
        assert_eq!(paginate(&items, 5, 1).total_pages, 3);
        assert_eq!(paginate(&items, 5, 1).items, &[0, 1, 2, 3, 4]);
        assert_eq!(paginate(&items, 5, 3).items, &[10]);
        assert!(paginate(&items, 5, 4).items.is_empty());
        assert!(paginate(&items, 5, 0).items.is_empty());
    }

    #[test]
    fn empty_and_degenerate_inputs() {
        let empty: Vec<u32> = Vec::new();
        assert_eq!(paginate(&empty, 5, 1).total_pages, 0);
        assert_eq!(paginate(&[1, 2, 3], 0, 1).total_pages, 0);
        assert!(page_markers(0, 1).is_empty());
    }

    #[test]
    fn middle_of_ten_pages() {
        assert_eq!(render(&page_markers(10, 5)), "1, …, 4, 5, 6, …, 10");
    }

    #[test]
    fn short_strips_list_every_page() {
        assert_eq!(render(&page_markers(5, 1)), "1, 2, 3, 4, 5");
        assert_eq!(render(&page_markers(3, 2)), "1, 2, 3");
    }

    #[test]
    fn edges_of_long_strips() {
        assert_eq!(render(&page_markers(10, 1)), "1, 2, …, 10");
        assert_eq!(render(&page_markers(10, 10)), "1, …, 9, 10");
        assert_eq!(render(&page_markers(10, 3)), "1, 2, 3, 4, …, 10");
        // Single hidden page still collapses to an ellipsis.
        assert_eq!(render(&page_markers(6, 4)), "1, …, 3, 4, 5, 6");
        assert_eq!(render(&page_markers(7, 4)), "1, …, 3, 4, 5, …, 7");
    }

    #[test]
    fn current_page_is_flagged() {
        let markers = page_markers(10, 5);
        let current: Vec<usize> = markers
            .iter()
            .filter_map(|m| match m {
                PageMarker::Page { number, current: true } => Some(*number),
                _ => None,
            })
            .collect();
        assert_eq!(current, [5]);
    }

    #[test]
    fn navigation_bounds() {
        let nav = Navigation::new(1, 3);
        assert!(!nav.has_previous);
        assert!(nav.has_next);
        assert!(nav.accepts(3));
        assert!(!nav.accepts(0));
        assert!(!nav.accepts(4));
        let last = Navigation::new(3, 3);
        assert!(last.has_previous && !last.has_next);
    }

    proptest! {
        #[test]
        fn pages_partition_the_items(len in 0usize..200, page_size in 1usize..20) {
            let items: Vec<usize> = (0..len).collect();
            let total = paginate(&items, page_size, 1).total_pages;
            let mut joined = Vec::new();
            for page in 1..=total {
                let slice = paginate(&items, page_size, page).items;
                prop_assert!(!slice.is_empty());
                prop_assert!(slice.len() <= page_size);
                joined.extend_from_slice(slice);
            }
            prop_assert_eq!(joined, items);
            prop_assert!(paginate(&(0..len).collect::<Vec<_>>(), page_size, total + 1).items.is_empty());
        }

        #[test]
        fn markers_always_show_ends_and_neighbours(total in 1usize..40, pick in 0usize..40) {
            let current = pick % total + 1;
            let shown: Vec<usize> = page_markers(total, current)
                .iter()
                .filter_map(|m| match m {
                    PageMarker::Page { number, .. } => Some(*number),
                    PageMarker::Ellipsis => None,
                })
                .collect();
            prop_assert!(shown.contains(&1));
            prop_assert!(shown.contains(&total));
            prop_assert!(shown.contains(&current));
            prop_assert!(shown.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
