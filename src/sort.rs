/// Two-level listing sort.
///
/// Listings are ordered by a primary [`SortKey`] and, only when two
/// listings tie on it, by an optional secondary key. The sort is stable:
/// listings that tie on both keys keep their input order.
///
/// Sort keys are typed. Each key carries its own comparator (numeric or
/// lexicographic), and fields without a total order are rejected when the
/// key is parsed, not while sorting.
///
/// # Example
///
/// ```
/// use koru_lens::sort::{SortKey, SortOrder, SortSpec};
///
/// let spec: SortSpec = "price:asc".parse().unwrap();
/// let spec = spec.then_by(SortKey::Rating, SortOrder::Desc);
/// assert_eq!(spec.primary.key, SortKey::Price);
/// assert!("amenities".parse::<SortKey>().is_err());
/// ```
use crate::error::LensError;
use crate::listing::{Listing, ListingField};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl SortOrder {
    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(LensError::input_type(format!(
                "invalid sort order '{other}' (expected asc or desc)"
            ))),
        }
    }
}

/// A listing field that has a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Numeric identifier.
    Id,
    /// Listing name, lexicographic.
    Name,
    /// City, lexicographic.
    City,
    /// Nightly price, numeric.
    Price,
    /// Guest rating, numeric.
    Rating,
}

impl SortKey {
    /// The schema field this key orders by.
    pub fn field(self) -> ListingField {
        match self {
            SortKey::Id => ListingField::Id,
            SortKey::Name => ListingField::Name,
            SortKey::City => ListingField::City,
            SortKey::Price => ListingField::Price,
            SortKey::Rating => ListingField::Rating,
        }
    }

    /// Compare two listings on this key in ascending order.
    pub fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::City => a.city.cmp(&b.city),
            SortKey::Price => a.price.total_cmp(&b.price),
            SortKey::Rating => a.rating.total_cmp(&b.rating),
        }
    }
}

impl TryFrom<ListingField> for SortKey {
    type Error = LensError;

    fn try_from(field: ListingField) -> Result<Self, Self::Error> {
        let unorderable = || LensError::Unorderable {
            field: field.as_str().to_string(),
        };
        if !field.field_type().is_orderable() {
            return Err(unorderable());
        }
        match field {
            ListingField::Id => Ok(SortKey::Id),
            ListingField::Name => Ok(SortKey::Name),
            ListingField::City => Ok(SortKey::City),
            ListingField::Price => Ok(SortKey::Price),
            ListingField::Rating => Ok(SortKey::Rating),
            ListingField::Amenities | ListingField::Availability => Err(unorderable()),
        }
    }
}

impl FromStr for SortKey {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ListingField>()?.try_into()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field().as_str())
    }
}

/// One level of a sort: key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    /// Field to sort by.
    pub key: SortKey,
    /// Sort order.
    pub order: SortOrder,
}

impl SortBy {
    /// Create a new sort level.
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Sort ascending.
    pub fn asc(key: SortKey) -> Self {
        Self::new(key, SortOrder::Asc)
    }

    /// Sort descending.
    pub fn desc(key: SortKey) -> Self {
        Self::new(key, SortOrder::Desc)
    }

    fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        self.order.apply(self.key.compare(a, b))
    }
}

/// Parses `key` or `key:order`, e.g. `price:desc`.
impl FromStr for SortBy {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, order) = match s.split_once(':') {
            Some((key, order)) => (key, order.parse()?),
            None => (s, SortOrder::Asc),
        };
        Ok(Self::new(key.trim().parse()?, order))
    }
}

/// Primary sort with an optional tie-breaking secondary sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Primary ordering.
    pub primary: SortBy,
    /// Applied only when the primary comparison is equal.
    pub secondary: Option<SortBy>,
}

impl SortSpec {
    /// Sort by a single key.
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self {
            primary: SortBy::new(key, order),
            secondary: None,
        }
    }

    /// Add a tie-breaking secondary key.
    pub fn then_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.secondary = Some(SortBy::new(key, order));
        self
    }

    /// Compare two listings under this spec.
    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        let primary = self.primary.compare(a, b);
        match self.secondary {
            Some(secondary) if primary == Ordering::Equal => secondary.compare(a, b),
            _ => primary,
        }
    }

    /// Stable-sort `listings` in place.
    pub fn sort(&self, listings: &mut [&Listing]) {
        listings.sort_by(|a, b| self.compare(a, b));
    }

}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::Id, SortOrder::Asc)
    }
}

impl From<SortBy> for SortSpec {
    fn from(primary: SortBy) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }
}

/// Parses `primary[,secondary]`, each part as for [`SortBy`].
impl FromStr for SortSpec {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let primary: SortBy = parts.next().unwrap_or_default().parse()?;
        let secondary = parts.next().map(str::parse::<SortBy>).transpose()?;
        if parts.next().is_some() {
            return Err(LensError::input_type(format!(
                "invalid sort '{s}': at most two keys are supported"
            )));
        }
        Ok(Self { primary, secondary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Listing;

    fn listing(id: u64, name: &str, price: f64, rating: f64) -> Listing {
        Listing::new(id, name, "Lisbon", price, rating)
    }

    fn sorted_ids(spec: &SortSpec, listings: &[&Listing]) -> Vec<u64> {
        let mut out = listings.to_vec();
        spec.sort(&mut out);
        out.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_orderable_keys_follow_field_types() {
        for field in ListingField::ALL {
            assert_eq!(
                SortKey::try_from(field).is_ok(),
                field.field_type().is_orderable(),
                "{field}"
            );
        }
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert_eq!(" Rating ".parse::<SortKey>().unwrap(), SortKey::Rating);
        assert!(matches!(
            "amenities".parse::<SortKey>(),
            Err(LensError::Unorderable { .. })
        ));
        assert!(matches!(
            "availability".parse::<SortKey>(),
            Err(LensError::Unorderable { .. })
        ));
        assert!(matches!(
            "colour".parse::<SortKey>(),
            Err(LensError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_parse_spec() {
        let spec: SortSpec = "price:desc,name".parse().unwrap();
        assert_eq!(spec.primary, SortBy::desc(SortKey::Price));
        assert_eq!(spec.secondary, Some(SortBy::asc(SortKey::Name)));

        assert!("price:sideways".parse::<SortSpec>().is_err());
        assert!("price,name,city".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let a = listing(1, "A", 90.0, 4.0);
        let b = listing(2, "B", 100.0, 4.0);
        let spec = SortSpec::new(SortKey::Price, SortOrder::Asc);
        assert_eq!(sorted_ids(&spec, &[&b, &a]), vec![1, 2]);
    }

    #[test]
    fn test_secondary_breaks_ties_only() {
        let a = listing(1, "Alpha", 100.0, 4.0);
        let b = listing(2, "Bravo", 100.0, 4.8);
        let c = listing(3, "Charlie", 80.0, 3.0);
        let input = [&a, &b, &c];

        let primary_only = SortSpec::new(SortKey::Price, SortOrder::Asc);
        assert_eq!(sorted_ids(&primary_only, &input), vec![3, 1, 2]);

        let with_secondary = primary_only.then_by(SortKey::Rating, SortOrder::Desc);
        assert_eq!(sorted_ids(&with_secondary, &input), vec![3, 2, 1]);
    }

    #[test]
    fn test_stable_beyond_both_keys() {
        let a = listing(7, "Same", 100.0, 4.0);
        let b = listing(3, "Same", 100.0, 4.0);
        let c = listing(5, "Same", 100.0, 4.0);
        let spec = SortSpec::new(SortKey::Price, SortOrder::Desc)
            .then_by(SortKey::Rating, SortOrder::Asc);
        assert_eq!(sorted_ids(&spec, &[&a, &b, &c]), vec![7, 3, 5]);
    }

    #[test]
    fn test_text_descending() {
        let a = listing(1, "Alpha", 1.0, 1.0);
        let b = listing(2, "Bravo", 1.0, 1.0);
        let spec = SortSpec::new(SortKey::Name, SortOrder::Desc);
        assert_eq!(sorted_ids(&spec, &[&a, &b]), vec![2, 1]);
    }
}
