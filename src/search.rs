/// Listing search: filter, then sort, then paginate.
///
/// This is the entry point the UI layer calls once it has turned user
/// input into a [`FilterCriteria`] and a [`SortSpec`]. The listings are
/// borrowed, never copied or modified.
///
/// # Example
///
/// ```
/// use koru_lens::criteria::FilterCriteria;
/// use koru_lens::listing::Listing;
/// use koru_lens::search::search;
/// use koru_lens::sort::{SortKey, SortOrder, SortSpec};
///
/// let listings = vec![
///     Listing::new(1, "Loft", "Porto", 140.0, 4.2),
///     Listing::new(2, "Villa", "Lisbon", 110.0, 4.8),
///     Listing::new(3, "Hostel", "Lisbon", 35.0, 3.9),
/// ];
/// let criteria = FilterCriteria::new().price_between(100.0, 150.0);
/// let sort = SortSpec::new(SortKey::Price, SortOrder::Asc);
///
/// let page = search(&listings, &criteria, &sort, 10, 1).unwrap();
/// assert_eq!(page.total_count, 2);
/// assert_eq!(page.items[0].name, "Villa");
/// ```
use crate::config::LensConfig;
use crate::criteria::{FilterCriteria, ListingFilter};
use crate::error::LensResult;
use crate::listing::Listing;
use crate::page::paginate;
use crate::sort::SortSpec;
use serde::{Deserialize, Serialize};

/// One page of search results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<'a> {
    /// Listings on the requested page, in sorted order.
    pub items: Vec<&'a Listing>,
    /// Listings that matched the criteria, across all pages.
    pub total_count: usize,
    /// Pages needed for `total_count` listings.
    pub total_pages: usize,
    /// Requested 1-based page number.
    pub page_number: usize,
    /// Effective page size.
    pub page_size: usize,
}

/// A complete search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    /// What to match.
    pub criteria: FilterCriteria,
    /// How to order matches.
    pub sort: SortSpec,
    /// Records per page; the configured default when unset.
    pub page_size: Option<usize>,
    /// 1-based page number; page 1 when unset.
    pub page_number: Option<usize>,
}

impl SearchRequest {
    /// A request for the first page of all listings, sorted by `sort`.
    pub fn new(criteria: FilterCriteria, sort: SortSpec) -> Self {
        Self {
            criteria,
            sort,
            page_size: None,
            page_number: None,
        }
    }

    /// Request a specific page.
    pub fn page(mut self, page_number: usize, page_size: usize) -> Self {
        self.page_number = Some(page_number);
        self.page_size = Some(page_size);
        self
    }
}

/// Runs search requests under a [`LensConfig`].
#[derive(Debug, Clone, Default)]
pub struct ListingSearch {
    config: LensConfig,
}

impl ListingSearch {
    /// Create a search runner with the given configuration.
    pub fn new(config: LensConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    /// Run `request` over `listings`.
    pub fn run<'a>(
        &self,
        listings: &'a [Listing],
        request: &SearchRequest,
    ) -> LensResult<SearchPage<'a>> {
        search(
            listings,
            &request.criteria,
            &request.sort,
            self.config.page_size(request.page_size),
            request.page_number.unwrap_or(1),
        )
    }
}

/// Filter `listings` by `criteria`, order them by `sort`, and return page
/// `page_number` (1-based) of `page_size` listings.
///
/// Fails only for a zero page size.
pub fn search<'a>(
    listings: &'a [Listing],
    criteria: &FilterCriteria,
    sort: &SortSpec,
    page_size: usize,
    page_number: usize,
) -> LensResult<SearchPage<'a>> {
    let mut matched = ListingFilter::new(criteria).apply(listings);
    sort.sort(&mut matched);

    let page = paginate(&matched, page_size, page_number)?;

    tracing::debug!(
        "Search matched {} of {} listings; page {}/{} holds {}",
        matched.len(),
        listings.len(),
        page_number,
        page.total_pages,
        page.items.len()
    );

    Ok(SearchPage {
        items: page.items.to_vec(),
        total_count: page.total_items,
        total_pages: page.total_pages,
        page_number,
        page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LensError;
    use crate::sort::{SortKey, SortOrder};

    fn listings() -> Vec<Listing> {
        (1..=12)
            .map(|i| Listing::new(i, format!("Listing {i}"), "Lisbon", (i * 10) as f64, 4.0))
            .collect()
    }

    #[test]
    fn test_pages_through_sorted_matches() {
        let all = listings();
        let sort = SortSpec::new(SortKey::Price, SortOrder::Desc);
        let page = search(&all, &FilterCriteria::new(), &sort, 5, 1).unwrap();
        assert_eq!(page.total_count, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.first().map(|l| l.id), Some(12));

        let last = search(&all, &FilterCriteria::new(), &sort, 5, 3).unwrap();
        assert_eq!(last.items.iter().map(|l| l.id).collect::<Vec<_>>(), vec![2, 1]);

        let beyond = search(&all, &FilterCriteria::new(), &sort, 5, 4).unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_count, 12);
    }

    #[test]
    fn test_no_matches_means_zero_pages() {
        let all = listings();
        let criteria = FilterCriteria::new().search("nowhere");
        let page = search(&all, &criteria, &SortSpec::default(), 10, 1).unwrap();
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_runner_applies_config_page_size() {
        let all = listings();
        let runner = ListingSearch::new(LensConfig::new().default_page_size(4).max_page_size(6));

        let page = runner.run(&all, &SearchRequest::default()).unwrap();
        assert_eq!(page.page_size, 4);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 3);

        let request = SearchRequest::default().page(2, 50);
        let page = runner.run(&all, &request).unwrap();
        assert_eq!(page.page_size, 6);
        assert_eq!(page.items.len(), 6);
        assert_eq!(page.items[0].id, 7);
    }

    #[test]
    fn test_zero_page_size_is_an_error() {
        let all = listings();
        assert!(matches!(
            search(&all, &FilterCriteria::new(), &SortSpec::default(), 0, 1),
            Err(LensError::InvalidPageSize { .. })
        ));
    }

    #[test]
    fn test_request_from_json() {
        let request: SearchRequest = serde_json::from_value(serde_json::json!({
            "criteria": {"minRating": 4.5},
            "sort": {
                "primary": {"key": "rating", "order": "desc"},
                "secondary": {"key": "price", "order": "asc"}
            },
            "pageSize": 5
        }))
        .unwrap();
        assert_eq!(request.sort.primary.key, SortKey::Rating);
        assert_eq!(request.page_size, Some(5));
        assert_eq!(request.page_number, None);
    }
}
