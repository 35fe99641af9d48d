/// Listing filter criteria.
///
/// [`FilterCriteria`] is the plain-data request the UI layer builds from
/// user input. Every field is optional and an unset field imposes no
/// constraint. A listing is kept only if it satisfies every set field.
///
/// Criteria are compiled into a [`ListingFilter`] once per request, so the
/// partial check-in/check-out dates are parsed a single time rather than
/// per listing.
///
/// # Example
///
/// ```
/// use koru_lens::criteria::{FilterCriteria, ListingFilter};
/// use koru_lens::listing::Listing;
///
/// let criteria = FilterCriteria::new()
///     .search("lis")
///     .price_between(100.0, 150.0)
///     .require_amenities(["Pool"]);
/// let filter = ListingFilter::new(&criteria);
///
/// let villa = Listing::new(1, "Villa", "Lisbon", 120.0, 4.5).with_amenities(["Pool"]);
/// assert!(filter.matches(&villa));
/// ```
use crate::date::{DateInterval, parse_partial_date};
use crate::listing::Listing;
use serde::{Deserialize, Serialize};

/// Inclusive price bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest acceptable price.
    pub min: Option<f64>,
    /// Highest acceptable price.
    pub max: Option<f64>,
}

impl PriceRange {
    /// Both bounds set.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether `price` lies within the bounds.
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// A user's listing search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Case-insensitive substring of name or city.
    pub search: Option<String>,
    /// Price bounds.
    pub price: Option<PriceRange>,
    /// Amenities that must all be present.
    pub amenities: Vec<String>,
    /// Lowest acceptable rating.
    pub min_rating: Option<f64>,
    /// Partial check-in date (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    pub check_in: Option<String>,
    /// Partial check-out date.
    pub check_out: Option<String>,
}

impl FilterCriteria {
    /// Criteria that match every listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Set inclusive price bounds.
    pub fn price_between(mut self, min: f64, max: f64) -> Self {
        self.price = Some(PriceRange::between(min, max));
        self
    }

    /// Set a price range with optional bounds.
    pub fn price(mut self, range: PriceRange) -> Self {
        self.price = Some(range);
        self
    }

    /// Require every one of `amenities`.
    pub fn require_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    /// Set the minimum rating.
    pub fn min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    /// Set the partial check-in date.
    pub fn check_in(mut self, date: impl Into<String>) -> Self {
        self.check_in = Some(date.into());
        self
    }

    /// Set the partial check-out date.
    pub fn check_out(mut self, date: impl Into<String>) -> Self {
        self.check_out = Some(date.into());
        self
    }
}

/// What the date criteria require of a listing's availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateConstraint {
    /// No dates requested.
    Any,
    /// Availability must overlap this interval.
    Overlaps(DateInterval),
    /// Dates were requested but are unusable; nothing matches.
    Unsatisfiable,
}

impl DateConstraint {
    /// Build the constraint for an optional check-in/check-out pair.
    ///
    /// With both dates, check-in must start strictly before check-out ends
    /// and the requested stay spans from the start of one to the end of the
    /// other.
    pub fn from_dates(check_in: Option<&str>, check_out: Option<&str>) -> Self {
        match (check_in, check_out) {
            (None, None) => DateConstraint::Any,
            (Some(single), None) | (None, Some(single)) => match parse_partial_date(single) {
                Some(interval) => DateConstraint::Overlaps(interval),
                None => {
                    tracing::debug!("Unparseable date '{}': no listing can match", single);
                    DateConstraint::Unsatisfiable
                }
            },
            (Some(check_in), Some(check_out)) => {
                let (Some(from), Some(to)) =
                    (parse_partial_date(check_in), parse_partial_date(check_out))
                else {
                    tracing::debug!(
                        "Unparseable stay {} .. {}: no listing can match",
                        check_in,
                        check_out
                    );
                    return DateConstraint::Unsatisfiable;
                };
                if from.start() >= to.end() {
                    tracing::debug!(
                        "Inverted stay {} .. {}: no listing can match",
                        check_in,
                        check_out
                    );
                    return DateConstraint::Unsatisfiable;
                }
                DateInterval::new(from.start(), to.end())
                    .map_or(DateConstraint::Unsatisfiable, DateConstraint::Overlaps)
            }
        }
    }

    /// Whether a listing's availability satisfies this constraint.
    ///
    /// Listings without published availability only pass [`DateConstraint::Any`].
    pub fn admits(&self, listing: &Listing) -> bool {
        match self {
            DateConstraint::Any => true,
            DateConstraint::Unsatisfiable => false,
            DateConstraint::Overlaps(requested) => listing
                .availability
                .and_then(|a| a.interval())
                .is_some_and(|available| requested.overlaps(&available)),
        }
    }
}

/// Compiled form of [`FilterCriteria`].
#[derive(Debug, Clone)]
pub struct ListingFilter<'c> {
    criteria: &'c FilterCriteria,
    search: Option<String>,
    dates: DateConstraint,
}

impl<'c> ListingFilter<'c> {
    /// Compile `criteria`.
    pub fn new(criteria: &'c FilterCriteria) -> Self {
        Self {
            criteria,
            search: criteria
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            dates: DateConstraint::from_dates(
                criteria.check_in.as_deref(),
                criteria.check_out.as_deref(),
            ),
        }
    }

    /// The compiled date constraint.
    pub fn dates(&self) -> DateConstraint {
        self.dates
    }

    /// Whether `listing` satisfies every criterion.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.matches_search(listing)
            && self
                .criteria
                .price
                .is_none_or(|range| range.contains(listing.price))
            && listing.has_amenities(&self.criteria.amenities)
            && self
                .criteria
                .min_rating
                .is_none_or(|min| listing.rating >= min)
            && self.dates.admits(listing)
    }

    /// Keep the listings that match, in input order.
    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }

    fn matches_search(&self, listing: &Listing) -> bool {
        self.search.as_deref().is_none_or(|needle| {
            listing.name.to_lowercase().contains(needle)
                || listing.city.to_lowercase().contains(needle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Availability;
    use chrono::NaiveDate;

    fn window(start: &str, end: &str) -> Availability {
        Availability::new(
            NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        )
        .unwrap()
    }

    fn summer_villa() -> Listing {
        Listing::new(1, "Seaside Villa", "Lisbon", 120.0, 4.6)
            .with_amenities(["Pool", "WiFi"])
            .with_availability(window("2025-06-01", "2025-08-31"))
    }

    fn keeps(criteria: &FilterCriteria, listing: &Listing) -> bool {
        ListingFilter::new(criteria).matches(listing)
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        assert!(keeps(&FilterCriteria::new(), &summer_villa()));
        assert!(keeps(&FilterCriteria::new().search(""), &summer_villa()));
    }

    #[test]
    fn test_search_name_or_city_case_insensitive() {
        assert!(keeps(&FilterCriteria::new().search("SEASIDE"), &summer_villa()));
        assert!(keeps(&FilterCriteria::new().search("lisb"), &summer_villa()));
        assert!(!keeps(&FilterCriteria::new().search("porto"), &summer_villa()));
    }

    #[test]
    fn test_price_inclusive() {
        assert!(keeps(&FilterCriteria::new().price_between(120.0, 150.0), &summer_villa()));
        assert!(keeps(&FilterCriteria::new().price_between(100.0, 120.0), &summer_villa()));
        assert!(!keeps(&FilterCriteria::new().price_between(121.0, 150.0), &summer_villa()));
        let open_top = PriceRange {
            min: Some(100.0),
            max: None,
        };
        assert!(keeps(&FilterCriteria::new().price(open_top), &summer_villa()));
    }

    #[test]
    fn test_amenities_and_rating() {
        assert!(keeps(&FilterCriteria::new().require_amenities(["Pool"]), &summer_villa()));
        assert!(!keeps(
            &FilterCriteria::new().require_amenities(["Pool", "Spa"]),
            &summer_villa()
        ));
        assert!(keeps(&FilterCriteria::new().min_rating(4.6), &summer_villa()));
        assert!(!keeps(&FilterCriteria::new().min_rating(4.7), &summer_villa()));
    }

    #[test]
    fn test_single_date_overlap() {
        assert!(keeps(&FilterCriteria::new().check_in("2025-07"), &summer_villa()));
        assert!(keeps(&FilterCriteria::new().check_out("2025-08-31"), &summer_villa()));
        assert!(keeps(&FilterCriteria::new().check_in("2025"), &summer_villa()));
        assert!(!keeps(&FilterCriteria::new().check_in("2025-09"), &summer_villa()));
        assert!(!keeps(&FilterCriteria::new().check_out("2024"), &summer_villa()));
    }

    #[test]
    fn test_unparseable_date_rejects() {
        assert!(!keeps(&FilterCriteria::new().check_in("soon"), &summer_villa()));
        assert!(!keeps(
            &FilterCriteria::new().check_in("2025-07").check_out("2025-13"),
            &summer_villa()
        ));

        // A valid check-out does not rescue an unparseable check-in.
        let bad_check_in = FilterCriteria::new().check_in("July").check_out("2025-07-20");
        assert!(!keeps(&bad_check_in, &summer_villa()));
        assert_eq!(
            ListingFilter::new(&bad_check_in).dates(),
            DateConstraint::Unsatisfiable
        );
    }

    #[test]
    fn test_stay_spans_both_dates() {
        // Stay begins before availability but runs into it.
        let criteria = FilterCriteria::new().check_in("2025-05-20").check_out("2025-06-02");
        assert!(keeps(&criteria, &summer_villa()));

        let before = FilterCriteria::new().check_in("2025-04").check_out("2025-05");
        assert!(!keeps(&before, &summer_villa()));
    }

    #[test]
    fn test_inverted_or_degenerate_stay_rejects() {
        let inverted = FilterCriteria::new().check_in("2025-07-10").check_out("2025-07-01");
        assert!(!keeps(&inverted, &summer_villa()));
        assert_eq!(
            ListingFilter::new(&inverted).dates(),
            DateConstraint::Unsatisfiable
        );

        let same_day = FilterCriteria::new().check_in("2025-07-10").check_out("2025-07-10");
        assert!(!keeps(&same_day, &summer_villa()));

        // A month-wide check-out still ends after a same-month check-in.
        let same_month = FilterCriteria::new().check_in("2025-07-10").check_out("2025-07");
        assert!(keeps(&same_month, &summer_villa()));
    }

    #[test]
    fn test_missing_availability_only_passes_without_dates() {
        let listing = Listing::new(2, "Hut", "Oslo", 60.0, 3.9);
        assert!(keeps(&FilterCriteria::new(), &listing));
        assert!(!keeps(&FilterCriteria::new().check_in("2025"), &listing));
    }

    #[test]
    fn test_criteria_from_camel_case_json() {
        let criteria: FilterCriteria = serde_json::from_value(serde_json::json!({
            "search": "villa",
            "price": {"min": 100, "max": 150},
            "minRating": 4.0,
            "checkIn": "2025-07"
        }))
        .unwrap();
        assert_eq!(criteria.min_rating, Some(4.0));
        assert_eq!(criteria.check_in.as_deref(), Some("2025-07"));
        assert!(criteria.amenities.is_empty());
    }
}
