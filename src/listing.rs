/// Fixed-schema listing records for the filter/sort/paginate pipeline.
///
/// Unlike the group engine, which walks arbitrary JSON, the listing
/// pipeline works on a known schema. Field names are validated once, when
/// a [`ListingField`] is parsed, rather than on every record access.
use crate::date::DateInterval;
use crate::error::{LensError, LensResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// A bookable listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// City the listing is in.
    pub city: String,
    /// Nightly price.
    pub price: f64,
    /// Guest rating.
    pub rating: f64,
    /// Amenity tags, e.g. `"Pool"`, `"WiFi"`.
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Dates the listing can be booked, if published.
    #[serde(default)]
    pub availability: Option<Availability>,
}

impl Listing {
    /// Create a listing with no amenities and no published availability.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        city: impl Into<String>,
        price: f64,
        rating: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            city: city.into(),
            price,
            rating,
            amenities: Vec::new(),
            availability: None,
        }
    }

    /// Set the amenity tags.
    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    /// Set the availability window.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }

    /// Whether every amenity in `required` is offered.
    pub fn has_amenities<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required
            .iter()
            .all(|wanted| self.amenities.iter().any(|a| a == wanted.as_ref()))
    }

    /// Decode a JSON array of listings.
    ///
    /// A non-array input is an [`LensError::InputType`]; an element that
    /// does not fit the schema is an [`LensError::InvalidData`] naming its
    /// position.
    pub fn from_json_array(value: &JsonValue) -> LensResult<Vec<Listing>> {
        let items = value
            .as_array()
            .ok_or_else(|| LensError::input_type("listings must be a JSON array"))?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Listing::deserialize(item).map_err(|e| {
                    LensError::invalid_data(format!("listing at index {index}: {e}"))
                })
            })
            .collect()
    }
}

/// Inclusive range of bookable days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAvailability")]
pub struct Availability {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawAvailability {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawAvailability> for Availability {
    type Error = String;

    fn try_from(raw: RawAvailability) -> Result<Self, Self::Error> {
        Availability::new(raw.start, raw.end)
            .ok_or_else(|| format!("availability start {} is after end {}", raw.start, raw.end))
    }
}

impl Availability {
    /// Create an availability window, or `None` if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// First bookable day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last bookable day.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// The window as instants: midnight of the first day through the last
    /// second of the last day.
    pub fn interval(&self) -> Option<DateInterval> {
        DateInterval::days(self.start, self.end)
    }
}

/// Kinds of value a listing field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Totally ordered number.
    Number,
    /// Totally ordered text.
    Text,
    /// Unordered set of tags.
    TagSet,
    /// Date range; intervals have no total order.
    DateRange,
}

impl FieldType {
    /// Whether values of this type can be sorted.
    pub fn is_orderable(self) -> bool {
        matches!(self, FieldType::Number | FieldType::Text)
    }
}

/// The fields of the listing schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingField {
    /// Numeric listing id.
    Id,
    /// Display name.
    Name,
    /// City the listing is in.
    City,
    /// Nightly price.
    Price,
    /// Guest rating.
    Rating,
    /// Amenity tags.
    Amenities,
    /// Availability window.
    Availability,
}

impl ListingField {
    /// Every schema field.
    pub const ALL: [ListingField; 7] = [
        ListingField::Id,
        ListingField::Name,
        ListingField::City,
        ListingField::Price,
        ListingField::Rating,
        ListingField::Amenities,
        ListingField::Availability,
    ];

    /// Field name as it appears in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            ListingField::Id => "id",
            ListingField::Name => "name",
            ListingField::City => "city",
            ListingField::Price => "price",
            ListingField::Rating => "rating",
            ListingField::Amenities => "amenities",
            ListingField::Availability => "availability",
        }
    }

    /// Declared type of this field.
    pub fn field_type(self) -> FieldType {
        match self {
            ListingField::Id | ListingField::Price | ListingField::Rating => FieldType::Number,
            ListingField::Name | ListingField::City => FieldType::Text,
            ListingField::Amenities => FieldType::TagSet,
            ListingField::Availability => FieldType::DateRange,
        }
    }
}

impl FromStr for ListingField {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ListingField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LensError::UnknownField {
                field: wanted.to_string(),
            })
    }
}

impl fmt::Display for ListingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_decode_listing() {
        let listing: Listing = serde_json::from_value(json!({
            "id": 1,
            "name": "Seaside Villa",
            "city": "Lisbon",
            "price": 120.0,
            "rating": 4.6,
            "amenities": ["Pool", "WiFi"],
            "availability": {"start": "2025-06-01", "end": "2025-08-31"}
        }))
        .unwrap();

        assert_eq!(listing.name, "Seaside Villa");
        let availability = listing.availability.unwrap();
        assert_eq!(availability.start(), day(2025, 6, 1));
        assert_eq!(availability.end(), day(2025, 8, 31));
    }

    #[test]
    fn test_optional_fields_default() {
        let listing: Listing = serde_json::from_value(json!({
            "id": 2, "name": "Hut", "city": "Oslo", "price": 60, "rating": 3.9
        }))
        .unwrap();
        assert!(listing.amenities.is_empty());
        assert!(listing.availability.is_none());
    }

    #[test]
    fn test_inverted_availability_rejected() {
        let result = Listing::from_json_array(&json!([{
            "id": 3, "name": "Bad", "city": "Rome", "price": 1, "rating": 1,
            "availability": {"start": "2025-09-01", "end": "2025-08-01"}
        }]));
        match result {
            Err(LensError::InvalidData { reason }) => assert!(reason.contains("index 0")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_from_json_array_requires_array() {
        assert!(matches!(
            Listing::from_json_array(&json!({"id": 1})),
            Err(LensError::InputType { .. })
        ));
        assert!(Listing::from_json_array(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_has_amenities_is_and() {
        let listing = Listing::new(1, "Spa Hotel", "Bath", 150.0, 4.5)
            .with_amenities(["Pool", "Spa", "WiFi"]);
        assert!(listing.has_amenities(&["Pool", "Spa"]));
        assert!(listing.has_amenities::<&str>(&[]));
        assert!(!listing.has_amenities(&["Pool", "Gym"]));
    }

    #[test]
    fn test_availability_interval_covers_whole_days() {
        let availability = Availability::new(day(2025, 6, 1), day(2025, 6, 3)).unwrap();
        let interval = availability.interval().unwrap();
        assert_eq!(interval.start(), day(2025, 6, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(interval.end(), day(2025, 6, 3).and_hms_opt(23, 59, 59).unwrap());
        assert!(Availability::new(day(2025, 6, 3), day(2025, 6, 1)).is_none());
    }

    #[test]
    fn test_field_names_and_types() {
        assert_eq!("Price".parse::<ListingField>().unwrap(), ListingField::Price);
        assert!("colour".parse::<ListingField>().is_err());
        assert!(ListingField::Name.field_type().is_orderable());
        assert!(!ListingField::Amenities.field_type().is_orderable());
        assert!(!ListingField::Availability.field_type().is_orderable());
    }
}
