//! # koru-lens — In-memory query lenses
//!
//! koru-lens answers two kinds of question over data you already hold in
//! memory:
//! - **Group and aggregate** — partition open-schema JSON records by one or
//!   more (possibly nested) fields and compute sum/avg/min/max/count per group
//! - **Search listings** — filter fixed-schema listings by text, price,
//!   amenities, rating and partial dates, sort on up to two keys, and page
//!   through the result
//!
//! ## Quick Start
//!
//! ```
//! use koru_lens::prelude::*;
//! use serde_json::json;
//!
//! // Group bookings by category and total their prices
//! let bookings = vec![
//!     json!({"category": "Hotel", "price": 200}),
//!     json!({"category": "Flight", "price": 350}),
//!     json!({"category": "Hotel", "price": 120}),
//! ];
//! let spec = GroupSpec::by("category").aggregate("price", AggregationKind::Sum);
//! let groups = GroupEngine::execute(&spec, &bookings)?;
//! assert_eq!(groups[0].aggregates["price"], Some(320.0));
//!
//! // Find listings available in July, cheapest first
//! let listings = vec![Listing::new(1, "Villa", "Lisbon", 120.0, 4.6)];
//! let criteria = FilterCriteria::new().check_in("2025-07");
//! let sort = SortSpec::new(SortKey::Price, SortOrder::Asc);
//! let page = search(&listings, &criteria, &sort, 10, 1)?;
//! assert_eq!(page.total_count, 0); // no published availability
//! # Ok::<(), LensError>(())
//! ```
//!
//! ## Architecture
//!
//! The two pipelines are independent and share no state:
//!
//! 1. **Grouping** (`path` → `group` → `aggregate`): a generic mapping walk
//!    over records whose schema is open
//! 2. **Search** (`criteria` → `sort` → `page`, driven by `search`): typed
//!    access to the fixed `listing` schema, with `date` providing
//!    partial-date intervals and overlap tests
//!
//! Every entry point takes its records as a parameter and borrows them; no
//! component keeps state between calls, so concurrent use over the same
//! records needs no locking.
//!
//! ## Errors
//!
//! Only configuration mistakes are errors ([`LensError`]). Irregular data
//! degrades instead: a missing or non-numeric field is left out of an
//! aggregate, and a listing with unusable dates simply does not match.

pub mod aggregate;
pub mod config;
pub mod criteria;
pub mod date;
mod error;
pub mod filter;
pub mod group;
pub mod listing;
pub mod page;
pub mod path;
pub mod search;
pub mod sort;

// Public API exports
pub use aggregate::AggregationKind;
pub use config::LensConfig;
pub use criteria::{DateConstraint, FilterCriteria, ListingFilter, PriceRange};
pub use date::{DateInterval, overlaps, parse_partial_date};
pub use error::{LensError, LensResult};
pub use filter::{Filter, Pattern, RecordPredicate};
pub use group::{Group, GroupEngine, GroupKey, GroupSpec, MissingAggregate};
pub use listing::{Availability, Listing, ListingField};
pub use page::{Page, paginate};
pub use path::FieldPath;
pub use search::{ListingSearch, SearchPage, SearchRequest, search};
pub use sort::{SortBy, SortKey, SortOrder, SortSpec};

// Re-export commonly used external types for convenience
pub use serde_json::{Value as JsonValue, json};

/// Prelude module for convenient imports.
///
/// Import everything you need with:
/// ```
/// use koru_lens::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aggregate::AggregationKind;
    pub use crate::config::LensConfig;
    pub use crate::criteria::{FilterCriteria, PriceRange};
    pub use crate::date::{DateInterval, parse_partial_date};
    pub use crate::error::{LensError, LensResult};
    pub use crate::filter::Filter;
    pub use crate::group::{Group, GroupEngine, GroupSpec, MissingAggregate};
    pub use crate::listing::{Availability, Listing};
    pub use crate::page::paginate;
    pub use crate::search::{ListingSearch, SearchRequest, search};
    pub use crate::sort::{SortKey, SortOrder, SortSpec};
    pub use serde_json::{Value as JsonValue, json};
}
