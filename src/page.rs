/// Fixed-size pagination.
///
/// Page numbers are 1-based. Asking for a page past the end (or page 0)
/// yields an empty page rather than an error.
use crate::error::{LensError, LensResult};
use serde::Serialize;

/// One page of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a, T> {
    /// The records on this page.
    pub items: &'a [T],
    /// Requested 1-based page number.
    pub page_number: usize,
    /// Maximum records per page.
    pub page_size: usize,
    /// Records across all pages.
    pub total_items: usize,
    /// `ceil(total_items / page_size)`; 0 when there are no records.
    pub total_pages: usize,
}

impl<'a, T> Page<'a, T> {
    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    /// Whether an earlier, non-empty page exists.
    pub fn has_previous(&self) -> bool {
        self.page_number > 1 && self.total_pages > 0
    }

    /// Whether this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Number of pages needed for `count` records.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        count.div_ceil(page_size)
    }
}

/// Slice page `page_number` (1-based) of `page_size` records from `items`.
///
/// Fails only for a zero page size.
pub fn paginate<T>(items: &[T], page_size: usize, page_number: usize) -> LensResult<Page<'_, T>> {
    if page_size == 0 {
        return Err(LensError::InvalidPageSize { size: page_size });
    }

    let start = page_number
        .checked_sub(1)
        .and_then(|index| index.checked_mul(page_size))
        .filter(|&start| start < items.len());

    let slice = match start {
        Some(start) => &items[start..start.saturating_add(page_size).min(items.len())],
        None => &items[..0],
    };

    Ok(Page {
        items: slice,
        page_number,
        page_size,
        total_items: items.len(),
        total_pages: total_pages(items.len(), page_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page() {
        let items = [1, 2, 3, 4, 5];
        let page = paginate(&items, 10, 1).unwrap();
        assert_eq!(page.items, &items);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let items = [1, 2, 3, 4, 5];
        let page = paginate(&items, 10, 2).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 5);

        assert!(paginate(&items, 10, 0).unwrap().is_empty());
        assert!(paginate(&items, 2, usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_partial_last_page() {
        let items: Vec<u32> = (1..=7).collect();
        let page = paginate(&items, 3, 3).unwrap();
        assert_eq!(page.items, &[7]);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(!page.has_next());

        let middle = paginate(&items, 3, 2).unwrap();
        assert_eq!(middle.items, &[4, 5, 6]);
        assert!(middle.has_next());
    }

    #[test]
    fn test_empty_input_has_zero_pages() {
        let items: [u8; 0] = [];
        let page = paginate(&items, 10, 1).unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            paginate(&[1, 2], 0, 1),
            Err(LensError::InvalidPageSize { size: 0 })
        ));
    }
}
