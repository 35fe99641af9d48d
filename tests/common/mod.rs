//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use chrono::NaiveDate;
use koru_lens::{Availability, JsonValue, Listing, json};

/// Eight bookings across Hotel and Flight, with a few irregular records.
pub fn bookings() -> Vec<JsonValue> {
    vec![
        json!({"id": 1, "category": "Hotel", "price": 240, "nights": 2, "location": {"city": "Paris", "country": "FR"}}),
        json!({"id": 2, "category": "Flight", "price": 180, "location": {"city": "Paris", "country": "FR"}}),
        json!({"id": 3, "category": "Hotel", "price": 95, "nights": 1, "location": {"city": "Rome", "country": "IT"}}),
        json!({"id": 4, "category": "Flight", "price": 320, "location": {"city": "Rome", "country": "IT"}}),
        json!({"id": 5, "category": "Hotel", "price": 410, "nights": 4, "location": {"city": "Paris", "country": "FR"}}),
        json!({"id": 6, "category": "Hotel", "price": "on request", "nights": 3, "location": {"city": "Lisbon"}}),
        json!({"id": 7, "category": "Flight", "price": 75}),
        json!({"id": 8, "price": 60, "nights": 1}),
    ]
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn available(start: &str, end: &str) -> Availability {
    Availability::new(day(start), day(end)).unwrap()
}

/// Five listings used by the search suites.
pub fn listings() -> Vec<Listing> {
    vec![
        Listing::new(1, "Seaside Villa", "Lisbon", 150.0, 4.8)
            .with_amenities(["Pool", "Spa", "WiFi"])
            .with_availability(available("2025-06-01", "2025-08-31")),
        Listing::new(2, "City Loft", "Porto", 95.0, 4.2)
            .with_amenities(["WiFi"])
            .with_availability(available("2025-01-01", "2025-12-31")),
        Listing::new(3, "Mountain Cabin", "Braga", 120.0, 4.5)
            .with_amenities(["Pool", "Fireplace"])
            .with_availability(available("2025-10-01", "2026-03-31")),
        Listing::new(4, "Budget Room", "Lisbon", 45.0, 3.6)
            .with_amenities(["WiFi"])
            .with_availability(available("2025-02-01", "2025-02-28")),
        Listing::new(5, "Harbour Suite", "Porto", 100.0, 4.5)
            .with_amenities(["Spa"])
            .with_availability(available("2025-07-15", "2025-07-20")),
    ]
}

/// The listings fixture as JSON, the way a file on disk would hold it.
pub fn listings_json() -> JsonValue {
    serde_json::to_value(listings()).unwrap()
}

pub fn ids(listings: &[&Listing]) -> Vec<u64> {
    listings.iter().map(|l| l.id).collect()
}
